use std::collections::{HashMap, HashSet};

use crate::matcher::{self, FuzzyMatcher, REJECT};
use crate::model::{Action, AppEntry, Ranked, ResultEntry};
use crate::sources::history::RecencyList;
use crate::topk::TopK;

pub const RECENCY_BONUS: i64 = 300;
pub const RECENCY_STEP: i64 = 6;

/// Bonus for the app at `position` in the recency list, decaying to zero.
pub fn recency_boost(position: Option<usize>) -> i64 {
    match position {
        Some(position) => (RECENCY_BONUS - position as i64 * RECENCY_STEP).max(0),
        None => 0,
    }
}

fn app_entry(app: &AppEntry) -> ResultEntry {
    ResultEntry::new(
        app.name.clone(),
        Action::App {
            id: app.id.clone(),
            exec: app.exec.clone(),
            terminal: app.terminal,
        },
    )
    .with_icon(app.icon.clone())
}

/// Ranks `apps` (assumed name-sorted) for `query`.
///
/// Empty query: recently launched apps first, then everything else in
/// natural order. Otherwise the best `limit` apps by match score plus
/// recency boost, ties broken by case-insensitive name.
pub fn rank_apps(
    apps: &[AppEntry],
    recents: &RecencyList,
    query: &str,
    limit: usize,
    matcher: &FuzzyMatcher,
) -> Ranked {
    let query = query.trim();
    if apps.is_empty() {
        return Ranked::or_placeholder(Vec::new(), "No applications found");
    }

    if query.is_empty() {
        let by_id: HashMap<&str, &AppEntry> = apps.iter().map(|a| (a.id.as_str(), a)).collect();
        let mut placed = HashSet::new();
        let mut entries = Vec::with_capacity(apps.len());
        for id in recents.iter() {
            if let Some(app) = by_id.get(id) {
                if placed.insert(id) {
                    entries.push(app_entry(app));
                }
            }
        }
        entries.extend(
            apps.iter()
                .filter(|a| !placed.contains(a.id.as_str()))
                .map(app_entry),
        );
        return Ranked::or_placeholder(entries, "No applications found");
    }

    let mut top = TopK::new(limit);
    for app in apps {
        let score = matcher.score(query, &app.name, &app.id);
        if score == REJECT {
            continue;
        }
        let combined = score + recency_boost(recents.position(&app.id));
        top.push(combined, &app.name, app);
    }
    log::debug!("apps: {} scored, {} kept for {:?}", top.seen(), top.len(), query);

    let entries = top
        .into_sorted_vec()
        .into_iter()
        .map(|scored| {
            let highlights = matcher::highlight_spans(query, &scored.item.name);
            app_entry(scored.item).with_highlights(highlights)
        })
        .collect();
    Ranked::or_placeholder(entries, "No matches")
}
