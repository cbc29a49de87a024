use crate::config::{Config, GroupConfig, QueryMode, Shortcut, ShortcutMode};
use crate::model::{Action, Ranked, ResultEntry};
use crate::template;

/// Renders `shortcut` with `query` substituted into its template.
pub fn render_shortcut(shortcut: &Shortcut, query: &str) -> ResultEntry {
    let action = match shortcut.mode {
        ShortcutMode::Url => Action::Url {
            url: template::url_substitute(&shortcut.template, query),
            stay_open: shortcut.stay_open,
        },
        ShortcutMode::Shell => Action::Shell {
            command: template::shell_substitute(&shortcut.template, query),
            run_mode: shortcut.run_mode,
            stay_open: shortcut.stay_open,
        },
        ShortcutMode::File => Action::OpenPath {
            path: template::substitute(&shortcut.template, query),
            stay_open: shortcut.stay_open,
        },
    };
    let detail = match &action {
        Action::Url { url, .. } => url.clone(),
        Action::Shell { command, .. } => command.clone(),
        Action::OpenPath { path, .. } => path.clone(),
        _ => String::new(),
    };
    ResultEntry::new(shortcut.label.clone(), action)
        .with_detail(detail)
        .with_icon(shortcut.icon.clone())
}

/// A named shortcut always yields exactly one entry.
pub fn rank_shortcut(shortcut: &Shortcut, remainder: &str) -> Ranked {
    Ranked::or_placeholder(vec![render_shortcut(shortcut, remainder)], "")
}

/// Pass-through groups render every member with the remainder; filter
/// groups narrow members by label and render them with an empty query.
pub fn rank_group(config: &Config, group: &GroupConfig, remainder: &str) -> Ranked {
    let members = config.members(&group.name);
    let entries: Vec<ResultEntry> = match group.query_mode {
        QueryMode::PassThrough => members.map(|s| render_shortcut(s, remainder)).collect(),
        QueryMode::Filter => {
            let needle = remainder.to_lowercase();
            members
                .filter(|s| s.label.to_lowercase().contains(&needle))
                .map(|s| {
                    let highlights = crate::matcher::highlight_spans(remainder, &s.label);
                    let entry = render_shortcut(s, "");
                    entry.with_highlights(highlights)
                })
                .collect()
        }
    };
    let empty = if remainder.is_empty() { "Group has no entries" } else { "No matches" };
    Ranked::or_placeholder(entries, empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::POWER_GROUP;
    use crate::model::RunMode;

    fn web_config(mode: QueryMode) -> Config {
        let mut config = Config::default();
        for (label, template) in [
            ("Google", "https://google.com/search?q={query}"),
            ("Wikipedia", "https://en.wikipedia.org/wiki/Special:Search?search="),
        ] {
            config.shortcuts.push(Shortcut {
                prefix: None,
                label: label.to_string(),
                template: template.to_string(),
                mode: ShortcutMode::Url,
                group: Some("web".to_string()),
                run_mode: RunMode::Spawn,
                stay_open: false,
                icon: None,
            });
        }
        config.groups.push(GroupConfig {
            name: "web".to_string(),
            query_mode: mode,
            icon: None,
        });
        config
    }

    fn urls(ranked: &Ranked) -> Vec<String> {
        ranked
            .entries
            .iter()
            .map(|e| match &e.action {
                Action::Url { url, .. } => url.clone(),
                other => panic!("unexpected {other:?}"),
            })
            .collect()
    }

    #[test]
    fn pass_through_renders_every_member() {
        let config = web_config(QueryMode::PassThrough);
        let group = config.group("web").unwrap();
        let ranked = rank_group(&config, group, "rust lang");
        assert_eq!(
            urls(&ranked),
            vec![
                "https://google.com/search?q=rust%20lang",
                "https://en.wikipedia.org/wiki/Special:Search?search=rust%20lang",
            ]
        );
    }

    #[test]
    fn filter_narrows_by_label_with_empty_query() {
        let config = web_config(QueryMode::Filter);
        let group = config.group("web").unwrap();
        let ranked = rank_group(&config, group, "WIKI");
        assert_eq!(
            urls(&ranked),
            vec!["https://en.wikipedia.org/wiki/Special:Search?search="]
        );
        assert_eq!(ranked.entries[0].highlights, vec![(0, 4)]);

        let ranked = rank_group(&config, group, "zzz");
        assert!(ranked.entries[0].is_placeholder());
    }

    #[test]
    fn power_group_lists_all_members_on_empty_filter() {
        let config = Config::default();
        let group = config.group(POWER_GROUP).unwrap();
        let ranked = rank_group(&config, group, "");
        let labels: Vec<_> = ranked.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Lock", "Log out", "Suspend", "Reboot", "Shut down"]);
        assert_eq!(
            ranked.entries[2].action,
            Action::Shell {
                command: "systemctl suspend".to_string(),
                run_mode: RunMode::Spawn,
                stay_open: false,
            }
        );
    }

    #[test]
    fn named_shortcut_substitutes_remainder() {
        let mut shortcut = Shortcut::shell("Manual", "man {query}");
        shortcut.run_mode = RunMode::Terminal;
        let ranked = rank_shortcut(&shortcut, "git log");
        assert_eq!(ranked.entries.len(), 1);
        assert_eq!(
            ranked.entries[0].action,
            Action::Shell {
                command: "man 'git log'".to_string(),
                run_mode: RunMode::Terminal,
                stay_open: false,
            }
        );
    }

    #[test]
    fn file_mode_keeps_raw_query() {
        let mut shortcut = Shortcut::shell("Notes", "~/notes/{query}.md");
        shortcut.mode = ShortcutMode::File;
        let ranked = rank_shortcut(&shortcut, "todo");
        assert_eq!(
            ranked.entries[0].action,
            Action::OpenPath {
                path: "~/notes/todo.md".to_string(),
                stay_open: false,
            }
        );
    }
}
