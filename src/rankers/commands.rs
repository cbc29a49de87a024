use crate::command::{CommandTable, CommandTarget};
use crate::config::Config;
use crate::matcher::highlight_spans;
use crate::model::{Action, Ranked, ResultEntry, RunMode};

/// `:r cmd` and `!cmd`: one entry running the literal command.
pub fn rank_run(remainder: &str, in_terminal: bool) -> Ranked {
    if remainder.is_empty() {
        return Ranked::or_placeholder(Vec::new(), "Type a command to run");
    }
    let run_mode = if in_terminal { RunMode::Terminal } else { RunMode::Spawn };
    let entry = ResultEntry::new(
        format!("Run: {remainder}"),
        Action::Shell {
            command: remainder.to_string(),
            run_mode,
            stay_open: false,
        },
    )
    .with_icon(Some("utilities-terminal".to_string()));
    Ranked::or_placeholder(vec![entry], "")
}

/// `:c`: the config file plus one completion per reachable keyword.
pub fn rank_config(config: &Config, table: &CommandTable, remainder: &str) -> Ranked {
    let mut entries = Vec::new();
    if let Some(path) = &config.path {
        entries.push(
            ResultEntry::new("Edit configuration", Action::File { path: path.clone() })
                .with_detail(path.display().to_string())
                .with_icon(Some("preferences-system".to_string())),
        );
    }

    for (i, shortcut) in config.shortcuts.iter().enumerate() {
        let Some(prefix) = &shortcut.prefix else { continue };
        // Shadowed keywords would complete to something else.
        if table.lookup(prefix) != Some(CommandTarget::Shortcut(i)) {
            continue;
        }
        entries.push(completion(prefix, &shortcut.label));
    }

    for (i, group) in config.groups.iter().enumerate() {
        let keyword = if table.lookup(&group.name) == Some(CommandTarget::Group(i)) {
            group.name.as_str()
        } else if table.lookup(&config.general.power_alias) == Some(CommandTarget::Group(i)) {
            config.general.power_alias.as_str()
        } else {
            continue;
        };
        let count = config.members(&group.name).count();
        entries.push(completion(keyword, &format!("{} ({} entries)", group.name, count)));
    }

    let needle = remainder.to_lowercase();
    let entries = entries
        .into_iter()
        .filter(|e| e.label.to_lowercase().contains(&needle))
        .map(|e| {
            let highlights = highlight_spans(remainder, &e.label);
            e.with_highlights(highlights)
        })
        .collect();
    Ranked::or_placeholder(entries, "No matching commands")
}

fn completion(keyword: &str, label: &str) -> ResultEntry {
    let keyword = crate::command::normalize_keyword(keyword);
    ResultEntry::new(
        label,
        Action::Complete {
            input: format!(":{keyword} "),
        },
    )
    .with_detail(format!(":{keyword}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Shortcut;
    use std::path::PathBuf;

    #[test]
    fn run_uses_literal_command() {
        let ranked = rank_run("htop", false);
        assert_eq!(
            ranked.entries[0].action,
            Action::Shell {
                command: "htop".to_string(),
                run_mode: RunMode::Spawn,
                stay_open: false,
            }
        );
        assert!(rank_run("", false).entries[0].is_placeholder());
        assert!(matches!(
            rank_run("top", true).entries[0].action,
            Action::Shell { run_mode: RunMode::Terminal, .. }
        ));
    }

    #[test]
    fn config_lists_reachable_keywords() {
        let mut config = Config::default();
        config.path = Some(PathBuf::from("/home/me/.config/keyrun/config.toml"));
        let mut man = Shortcut::shell("Manual", "man");
        man.prefix = Some("m".to_string());
        let mut shadowed = Shortcut::shell("Shadowed", "true");
        shadowed.prefix = Some("M".to_string());
        config.shortcuts.push(man);
        config.shortcuts.push(shadowed);
        let table = CommandTable::build(&config);

        let ranked = rank_config(&config, &table, "");
        let labels: Vec<_> = ranked.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Edit configuration", "Manual", "power (5 entries)"]);
        assert_eq!(ranked.entries[2].action, Action::Complete { input: ":power ".to_string() });

        let ranked = rank_config(&config, &table, "man");
        assert_eq!(ranked.entries.len(), 1);
        assert_eq!(ranked.entries[0].action, Action::Complete { input: ":m ".to_string() });
    }
}
