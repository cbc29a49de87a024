use crate::matcher::highlight_spans;
use crate::model::{Action, Ranked, ResultEntry};

/// Themes whose name contains `remainder`, case-insensitively. With an
/// empty remainder the active theme is pre-selected so that browsing
/// starts from it.
pub fn rank_themes<'a>(
    names: impl IntoIterator<Item = &'a str>,
    active: &str,
    remainder: &str,
) -> Ranked {
    let needle = remainder.to_lowercase();
    let entries: Vec<ResultEntry> = names
        .into_iter()
        .filter(|name| name.to_lowercase().contains(&needle))
        .map(|name| {
            let entry = ResultEntry::new(name, Action::Theme { name: name.to_string() })
                .with_highlights(highlight_spans(remainder, name));
            if name == active { entry.with_detail("active") } else { entry }
        })
        .collect();

    let default_selection = if remainder.is_empty() {
        entries.iter().position(|e| e.label == active).unwrap_or(0)
    } else {
        0
    };
    let mut ranked = Ranked::or_placeholder(entries, "No matching themes");
    ranked.default_selection = default_selection;
    ranked
}
