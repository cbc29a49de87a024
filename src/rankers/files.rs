use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::SearchConfig;
use crate::matcher::{self, FuzzyMatcher, REJECT};
use crate::model::{Action, Ranked, ResultEntry};
use crate::sources::files::{depth_below, FileSearch};
use crate::topk::TopK;

const EXACT_NAME_BONUS: i64 = 500;
const PREFIX_NAME_BONUS: i64 = 250;
const HOME_DEPTH_BONUS: i64 = 300;
const HOME_DEPTH_STEP: i64 = 40;
const TOP_LEVEL_BONUS: i64 = 150;
const DOTFILE_BONUS: i64 = 100;
const OUTSIDE_HOME_PENALTY: i64 = 200;

/// Paths from the last backend scan and the query that produced them.
#[derive(Debug, Clone, Default)]
pub struct FileCache {
    query: String,
    paths: Vec<PathBuf>,
    /// The scan stayed under the backend limit, so it holds every match.
    complete: bool,
}

impl FileCache {
    /// Returns paths for `query`, scanning only when `query` does not
    /// extend a complete cached scan.
    pub fn paths_for(&mut self, backend: &mut dyn FileSearch, query: &str) -> &[PathBuf] {
        let query = query.to_lowercase();
        let reusable = self.complete && !self.query.is_empty() && query.starts_with(&self.query);
        if reusable {
            log::debug!("files: narrowing cached {:?} to {:?}", self.query, query);
        } else {
            self.paths = backend.scan(&query);
            self.complete = backend.limit().is_none_or(|limit| self.paths.len() < limit);
            self.query = query;
        }
        &self.paths
    }
}

pub struct FileRequest<'a> {
    pub query: &'a str,
    pub since_input: Duration,
    pub debounce: Duration,
}

/// Basename score plus path-shape bonuses. `REJECT` for non-matches.
pub fn score_path(path: &Path, query: &str, matcher: &FuzzyMatcher) -> i64 {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let full = path.to_string_lossy();
    let mut score = matcher.score(query, &name, &full);
    if score == REJECT {
        return REJECT;
    }

    let lower_name = name.to_lowercase();
    let lower_query = query.to_lowercase();
    if lower_name == lower_query {
        score += EXACT_NAME_BONUS;
    } else if lower_name.starts_with(&lower_query) {
        score += PREFIX_NAME_BONUS;
    }

    match matcher.home().and_then(|home| depth_below(path, home)) {
        Some(depth) => {
            score += (HOME_DEPTH_BONUS - depth as i64 * HOME_DEPTH_STEP).max(0);
            if depth == 0 {
                score += TOP_LEVEL_BONUS;
                if name.starts_with('.') {
                    score += DOTFILE_BONUS;
                }
            }
        }
        None => score -= OUTSIDE_HOME_PENALTY,
    }
    score
}

/// Shows `path` with the home directory abbreviated to `~`.
pub fn display_path(path: &Path, home: Option<&Path>) -> String {
    match home.and_then(|h| path.strip_prefix(h).ok()) {
        Some(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Some(rest) => format!("~/{}", rest.display()),
        None => path.display().to_string(),
    }
}

pub fn rank_files(
    request: &FileRequest,
    backend: &mut dyn FileSearch,
    cache: &mut FileCache,
    search: &SearchConfig,
    matcher: &FuzzyMatcher,
) -> Ranked {
    let query = request.query.trim();
    if query.chars().count() < search.min_query_len {
        return Ranked::pending(&format!("Type at least {} characters", search.min_query_len));
    }
    if request.since_input < request.debounce {
        return Ranked::pending("Searching…");
    }

    let paths = cache.paths_for(backend, query);
    let mut top = TopK::new(search.display_cap);
    for path in paths.iter().take(search.max_scored) {
        let score = score_path(path, query, matcher);
        if score == REJECT {
            continue;
        }
        let key = path.to_string_lossy();
        top.push(score, &key, path);
    }
    log::debug!("files: {} scored, {} kept for {:?}", top.seen(), top.len(), query);

    let entries = top
        .into_sorted_vec()
        .into_iter()
        .map(|scored| {
            let path = scored.item;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            let highlights = matcher::highlight_spans(query, &name);
            ResultEntry::new(name, Action::File { path: path.clone() })
                .with_detail(display_path(path, matcher.home()))
                .with_highlights(highlights)
        })
        .collect();
    Ranked::or_placeholder(entries, "No files found")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeSearch {
        paths: Vec<PathBuf>,
        scans: Vec<String>,
    }

    impl FakeSearch {
        fn new(paths: &[&str]) -> Self {
            Self {
                paths: paths.iter().map(PathBuf::from).collect(),
                scans: Vec::new(),
            }
        }
    }

    impl FileSearch for FakeSearch {
        fn scan(&mut self, query: &str) -> Vec<PathBuf> {
            self.scans.push(query.to_string());
            self.paths.clone()
        }
    }

    /// Returns at most `limit` paths whose basename contains the query.
    struct LimitedSearch {
        paths: Vec<PathBuf>,
        limit: usize,
        scans: Vec<String>,
    }

    impl FileSearch for LimitedSearch {
        fn scan(&mut self, query: &str) -> Vec<PathBuf> {
            self.scans.push(query.to_string());
            self.paths
                .iter()
                .filter(|p| {
                    p.file_name()
                        .is_some_and(|n| n.to_string_lossy().to_lowercase().contains(query))
                })
                .take(self.limit)
                .cloned()
                .collect()
        }

        fn limit(&self) -> Option<usize> {
            Some(self.limit)
        }
    }

    fn settled(query: &str) -> FileRequest<'_> {
        FileRequest {
            query,
            since_input: Duration::from_millis(500),
            debounce: Duration::from_millis(150),
        }
    }

    fn matcher() -> FuzzyMatcher {
        FuzzyMatcher::new(Some(PathBuf::from("/home/me")))
    }

    fn labels(ranked: &Ranked) -> Vec<String> {
        ranked.entries.iter().map(|e| e.detail.clone().unwrap_or_default()).collect()
    }

    #[test]
    fn pending_until_debounce_and_min_length() {
        let mut backend = FakeSearch::new(&["/home/me/notes.txt"]);
        let mut cache = FileCache::default();
        let search = SearchConfig::default();

        let short = rank_files(&settled("n"), &mut backend, &mut cache, &search, &matcher());
        assert!(short.pending);
        assert_eq!(short.entries.len(), 1);

        let early = FileRequest {
            query: "notes",
            since_input: Duration::from_millis(10),
            debounce: Duration::from_millis(150),
        };
        let ranked = rank_files(&early, &mut backend, &mut cache, &search, &matcher());
        assert!(ranked.pending);
        assert!(ranked.entries[0].is_placeholder());
        assert!(backend.scans.is_empty());
    }

    #[test]
    fn prefers_shallow_home_files() {
        let mut backend = FakeSearch::new(&[
            "/usr/share/doc/notes",
            "/home/me/a/b/c/notes",
            "/home/me/docs/notes",
            "/home/me/notes",
        ]);
        let mut cache = FileCache::default();
        let search = SearchConfig::default();
        let ranked = rank_files(&settled("notes"), &mut backend, &mut cache, &search, &matcher());
        assert!(!ranked.pending);
        assert_eq!(
            labels(&ranked),
            vec!["~/notes", "~/docs/notes", "~/a/b/c/notes", "/usr/share/doc/notes"]
        );
    }

    #[test]
    fn dotfiles_in_home_get_extra_bonus() {
        let m = matcher();
        let dot = score_path(Path::new("/home/me/.vimrc"), "vimrc", &m);
        let nested = score_path(Path::new("/home/me/cfg/.vimrc"), "vimrc", &m);
        assert!(dot > nested);
        assert_eq!(score_path(Path::new("/home/me/zzz"), "vimrc", &m), REJECT);
    }

    #[test]
    fn continuation_reuses_cached_scan() {
        let mut backend = FakeSearch::new(&["/home/me/report.pdf", "/home/me/readme.md"]);
        let mut cache = FileCache::default();
        let search = SearchConfig::default();

        rank_files(&settled("re"), &mut backend, &mut cache, &search, &matcher());
        let ranked = rank_files(&settled("rep"), &mut backend, &mut cache, &search, &matcher());
        assert_eq!(backend.scans, vec!["re"]);
        assert_eq!(ranked.entries[0].label, "report.pdf");

        rank_files(&settled("xy"), &mut backend, &mut cache, &search, &matcher());
        assert_eq!(backend.scans, vec!["re", "xy"]);
    }

    #[test]
    fn truncated_scan_is_not_reused() {
        let mut backend = LimitedSearch {
            paths: ["/home/me/a/re1", "/home/me/a/re2", "/home/me/report.pdf"]
                .iter()
                .map(PathBuf::from)
                .collect(),
            limit: 2,
            scans: Vec::new(),
        };
        let mut cache = FileCache::default();
        let search = SearchConfig::default();

        rank_files(&settled("re"), &mut backend, &mut cache, &search, &matcher());
        let ranked = rank_files(&settled("rep"), &mut backend, &mut cache, &search, &matcher());
        assert_eq!(backend.scans, vec!["re", "rep"]);
        assert_eq!(ranked.entries[0].label, "report.pdf");

        // Under the limit, so "repo" narrows the "rep" scan.
        rank_files(&settled("repo"), &mut backend, &mut cache, &search, &matcher());
        assert_eq!(backend.scans, vec!["re", "rep"]);
    }

    #[test]
    fn display_cap_and_scoring_cap() {
        let paths: Vec<String> = (0..50).map(|i| format!("/home/me/file{i:02}")).collect();
        let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
        let mut backend = FakeSearch::new(&refs);
        let search = SearchConfig {
            display_cap: 10,
            max_scored: 30,
            ..SearchConfig::default()
        };
        let mut cache = FileCache::default();
        let ranked = rank_files(&settled("file"), &mut backend, &mut cache, &search, &matcher());
        assert_eq!(ranked.entries.len(), 10);
        assert_eq!(ranked.entries[0].label, "file00");

        let search = SearchConfig {
            display_cap: 100,
            max_scored: 30,
            ..SearchConfig::default()
        };
        let mut cache = FileCache::default();
        let ranked = rank_files(&settled("file"), &mut backend, &mut cache, &search, &matcher());
        assert_eq!(ranked.entries.len(), 30);
    }

    #[test]
    fn empty_scan_yields_placeholder() {
        let mut backend = FakeSearch::new(&[]);
        let mut cache = FileCache::default();
        let search = SearchConfig::default();
        let ranked = rank_files(&settled("nothing"), &mut backend, &mut cache, &search, &matcher());
        assert!(!ranked.pending);
        assert!(ranked.entries[0].is_placeholder());
    }

    #[test]
    fn display_path_abbreviates_home() {
        let home = Path::new("/home/me");
        assert_eq!(display_path(Path::new("/home/me/a.txt"), Some(home)), "~/a.txt");
        assert_eq!(display_path(Path::new("/home/me"), Some(home)), "~");
        assert_eq!(display_path(Path::new("/etc/hosts"), Some(home)), "/etc/hosts");
    }
}
