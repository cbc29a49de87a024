use std::collections::HashMap;

use crate::config::{Config, POWER_GROUP};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Search,
    Config,
    Theme,
    Run,
}

/// What a recognised keyword refers to. Indices point into
/// `Config::shortcuts` and `Config::groups`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandTarget {
    Builtin(Builtin),
    Shortcut(usize),
    Group(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// No prefix: application search.
    Apps,
    Builtin(Builtin),
    Shortcut(usize),
    Group(usize),
    /// `!cmd`, shorthand for the run command.
    ShellBang,
}

impl From<CommandTarget> for CommandKind {
    fn from(target: CommandTarget) -> Self {
        match target {
            CommandTarget::Builtin(b) => CommandKind::Builtin(b),
            CommandTarget::Shortcut(i) => CommandKind::Shortcut(i),
            CommandTarget::Group(i) => CommandKind::Group(i),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub kind: CommandKind,
    pub remainder: String,
}

impl Query {
    fn apps(input: &str) -> Self {
        Self {
            kind: CommandKind::Apps,
            remainder: input.to_string(),
        }
    }
}

/// Strips surrounding colons and whitespace, lowercases.
pub fn normalize_keyword(keyword: &str) -> String {
    keyword
        .trim_matches(|c: char| c == ':' || c.is_whitespace())
        .to_lowercase()
}

/// Keyword lookup built once per loaded config.
///
/// Precedence when keywords collide: built-ins, then the power alias, then
/// shortcut prefixes in declaration order, then group names. A shortcut
/// therefore shadows a group of the same name.
#[derive(Debug, Clone, Default)]
pub struct CommandTable {
    keywords: HashMap<String, CommandTarget>,
}

impl CommandTable {
    pub fn build(config: &Config) -> Self {
        let mut table = Self::default();
        let commands = &config.commands;
        for (keyword, builtin) in [
            (&commands.search, Builtin::Search),
            (&commands.config, Builtin::Config),
            (&commands.theme, Builtin::Theme),
            (&commands.run, Builtin::Run),
        ] {
            table.insert(keyword, CommandTarget::Builtin(builtin));
        }

        if let Some(power) = config.groups.iter().position(|g| g.name == POWER_GROUP) {
            table.insert(&config.general.power_alias, CommandTarget::Group(power));
        }

        for (i, shortcut) in config.shortcuts.iter().enumerate() {
            if let Some(prefix) = &shortcut.prefix {
                table.insert(prefix, CommandTarget::Shortcut(i));
            }
        }

        for (i, group) in config.groups.iter().enumerate() {
            table.insert(&group.name, CommandTarget::Group(i));
        }

        log::debug!("command table: {} keywords", table.keywords.len());
        table
    }

    /// First insertion wins.
    fn insert(&mut self, keyword: &str, target: CommandTarget) {
        let keyword = normalize_keyword(keyword);
        if keyword.is_empty() {
            return;
        }
        self.keywords.entry(keyword).or_insert(target);
    }

    pub fn lookup(&self, keyword: &str) -> Option<CommandTarget> {
        self.keywords.get(&normalize_keyword(keyword)).copied()
    }

    /// Classifies raw input. Unknown `:keyword`s are plain search text.
    pub fn parse(&self, input: &str) -> Query {
        if input.starts_with(':') {
            let (keyword, remainder) = match input.split_once(char::is_whitespace) {
                Some((keyword, rest)) => (keyword, rest.trim()),
                None => (input, ""),
            };
            return match self.lookup(keyword) {
                Some(target) => Query {
                    kind: target.into(),
                    remainder: remainder.to_string(),
                },
                None => Query::apps(input),
            };
        }

        if let Some(rest) = input.strip_prefix('!') {
            let rest = rest.strip_prefix(' ').unwrap_or(rest);
            return Query {
                kind: CommandKind::ShellBang,
                remainder: rest.trim().to_string(),
            };
        }

        Query::apps(input)
    }
}
