use std::path::{Path, PathBuf};

use crate::model::Span;

/// Score returned for candidates that do not match at all.
pub const REJECT: i64 = i64::MIN;

const EXACT_CASE: i64 = 10_000;
const EXACT: i64 = 9_000;
const PREFIX: i64 = 8_000;
const SUBSTRING: i64 = 6_000;
const TYPO: i64 = 5_000;
const TYPO_WINDOW: i64 = 4_000;

const POSITION_MAX: i64 = 300;
const PROXIMITY_MAX: i64 = 200;
const BOUNDARY_BONUS: i64 = 300;
const WINDOW_OFFSET_CAP: i64 = 400;
const WINDOW_ANCHOR_BONUS: i64 = 300;

const HOME_BONUS: i64 = 50;
const HOME_PREFIX_BONUS: i64 = 150;

/// Shortest query that gets typo tolerance. Below it the `len - 1` window
/// is one character (or empty), so a two-letter query would match any
/// candidate containing either letter, and a one-letter query every
/// candidate.
pub const MIN_TYPO_QUERY_LEN: usize = 3;

/// Scores candidates against a query, biased towards files under `home`.
#[derive(Debug, Clone, Default)]
pub struct FuzzyMatcher {
    home: Option<PathBuf>,
}

impl FuzzyMatcher {
    pub fn new(home: Option<PathBuf>) -> Self {
        Self { home }
    }

    pub fn home(&self) -> Option<&Path> {
        self.home.as_deref()
    }

    pub fn score(&self, query: &str, text: &str, full_id: &str) -> i64 {
        score(query, text, full_id, self.home())
    }
}

/// Scores `text` against `query`, adding the home bonus when `full_id`
/// lives under `home`. Returns [`REJECT`] for non-matches.
pub fn score(query: &str, text: &str, full_id: &str, home: Option<&Path>) -> i64 {
    let base = text_score(query, text);
    if base == REJECT {
        return REJECT;
    }
    let under_home = home.is_some_and(|h| Path::new(full_id).starts_with(h));
    if !under_home {
        base
    } else if base >= PREFIX {
        base + HOME_PREFIX_BONUS
    } else {
        base + HOME_BONUS
    }
}

/// Tiered match score without environment bonuses.
pub fn text_score(query: &str, text: &str) -> i64 {
    if query == text {
        return EXACT_CASE;
    }

    let q: Vec<char> = query.to_lowercase().chars().collect();
    let t: Vec<char> = text.to_lowercase().chars().collect();
    if q == t {
        return EXACT;
    }

    let proximity = (PROXIMITY_MAX - t.len().abs_diff(q.len()) as i64 * 5).max(0);
    if t.starts_with(&q) {
        return PREFIX + proximity;
    }

    if let Some(pos) = t.windows(q.len()).position(|w| w == q.as_slice()) {
        let position = (POSITION_MAX - pos as i64 * 10).max(0);
        let boundary = if pos == 0 || is_separator(t[pos - 1]) {
            BOUNDARY_BONUS
        } else {
            0
        };
        return SUBSTRING + position + proximity + boundary;
    }

    if q.len() < MIN_TYPO_QUERY_LEN {
        return REJECT;
    }

    if within_one_edit(&q, &t) || within_one_transposition(&q, &t) {
        return TYPO;
    }

    if let Some(start) = typo_window(&q, &t) {
        let penalty = (start as i64 * 20).min(WINDOW_OFFSET_CAP);
        let anchor = if start == 0 { WINDOW_ANCHOR_BONUS } else { 0 };
        return TYPO_WINDOW - penalty + anchor;
    }

    REJECT
}

fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '-' | '_' | '.' | '/')
}

/// Earliest start of a window (query length -1, +0, +1) that is within one
/// edit or one transposition of the query.
fn typo_window(q: &[char], t: &[char]) -> Option<usize> {
    let lens = [q.len().saturating_sub(1), q.len(), q.len() + 1];
    for start in 0..t.len() {
        for len in lens {
            let end = start + len;
            if len == 0 || end > t.len() {
                continue;
            }
            let window = &t[start..end];
            if within_one_edit(q, window) || within_one_transposition(q, window) {
                return Some(start);
            }
        }
    }
    None
}

/// Levenshtein distance <= 1, in one linear scan.
pub fn within_one_edit<T: PartialEq>(a: &[T], b: &[T]) -> bool {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if long.len() - short.len() > 1 {
        return false;
    }

    let (mut i, mut j) = (0, 0);
    let mut edited = false;
    while i < short.len() && j < long.len() {
        if short[i] == long[j] {
            i += 1;
            j += 1;
            continue;
        }
        if edited {
            return false;
        }
        edited = true;
        if short.len() == long.len() {
            i += 1;
        }
        j += 1;
    }

    let remaining = (short.len() - i) + (long.len() - j);
    remaining == 0 || (!edited && remaining == 1)
}

/// Equal-length strings that differ by exactly one adjacent swap.
pub fn within_one_transposition<T: PartialEq>(a: &[T], b: &[T]) -> bool {
    if a.len() != b.len() || a.len() < 2 {
        return false;
    }
    let Some(i) = a.iter().zip(b).position(|(x, y)| x != y) else {
        return false;
    };
    i + 1 < a.len() && a[i] == b[i + 1] && a[i + 1] == b[i] && a[i + 2..] == b[i + 2..]
}

/// Greedy leftmost case-insensitive alignment of `query` inside `text`,
/// merged into runs. Empty when `query` is not a subsequence.
pub fn highlight_spans(query: &str, text: &str) -> Vec<Span> {
    let mut wanted = query.chars().peekable();
    if wanted.peek().is_none() {
        return Vec::new();
    }

    let mut spans: Vec<Span> = Vec::new();
    for (i, c) in text.chars().enumerate() {
        let Some(&next) = wanted.peek() else {
            break;
        };
        if !eq_ignore_case(c, next) {
            continue;
        }
        wanted.next();
        match spans.last_mut() {
            Some((start, len)) if *start + *len == i => *len += 1,
            _ => spans.push((i, 1)),
        }
    }

    if wanted.peek().is_some() {
        return Vec::new();
    }
    spans
}

fn eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn tiers_are_ordered() {
        let exact_case = text_score("Firefox", "Firefox");
        let exact = text_score("firefox", "Firefox");
        let prefix = text_score("fire", "Firefox");
        let substring = text_score("fox", "Firefox");
        let typo = text_score("firefxo", "Firefox");
        let window = text_score("fierfox", "Mozilla Firefox Nightly");
        assert!(exact_case > exact);
        assert!(exact > prefix);
        assert!(prefix > substring);
        assert!(substring > typo);
        assert!(typo > window);
        assert!(window > REJECT);
    }

    #[test]
    fn substring_beats_unrelated() {
        assert!(text_score("fire", "firefox") > text_score("fire", "evince"));
        assert_eq!(text_score("fire", "evince"), REJECT);
    }

    #[test]
    fn substring_always_beats_non_substring_typo() {
        let substring = score("term", "xyzzy-long-name-terminal", "/usr/share/a", None);
        let home = Path::new("/home/me");
        let typo = score("term", "tern", "/home/me/tern", Some(home));
        assert!(substring > typo);
    }

    #[test]
    fn earlier_and_boundary_substrings_score_higher() {
        assert!(text_score("code", "vs code") > text_score("code", "vscode"));
        assert!(text_score("code", "a code") > text_score("code", "long text code"));
    }

    #[test]
    fn short_queries_skip_typo_tolerance() {
        assert_eq!(text_score("xz", "ab"), REJECT);
        assert_eq!(text_score("q", "firefox"), REJECT);
        assert_eq!(text_score("fx", "fo"), REJECT);
        // The one-letter window "f" is within one edit of "fx".
        assert_eq!(text_score("fx", "a file"), REJECT);
        assert!(within_one_edit(&chars("fx"), &chars("f")));
        assert_eq!(text_score("fxr", "for"), TYPO);
    }

    #[test]
    fn window_prefers_earliest_start() {
        assert!(text_score("fiel", "fild manager") > text_score("fiel", "the fild manager"));
    }

    #[test]
    fn home_bias_applies_to_full_id() {
        let home = Path::new("/home/me");
        let inside = score("notes", "notes.txt", "/home/me/notes.txt", Some(home));
        let outside = score("notes", "notes.txt", "/etc/notes.txt", Some(home));
        assert_eq!(inside - outside, HOME_PREFIX_BONUS);

        let inside = score("otes", "notes.txt", "/home/me/notes.txt", Some(home));
        let outside = score("otes", "notes.txt", "/etc/notes.txt", Some(home));
        assert_eq!(inside - outside, HOME_BONUS);

        assert_eq!(score("zzz", "notes", "/home/me/notes", Some(home)), REJECT);
    }

    #[test]
    fn one_edit_cases() {
        assert!(within_one_edit(&chars("abc"), &chars("abc")));
        assert!(within_one_edit(&chars("abc"), &chars("abd")));
        assert!(within_one_edit(&chars("abc"), &chars("abxc")));
        assert!(within_one_edit(&chars("abc"), &chars("ab")));
        assert!(within_one_edit(&chars("abc"), &chars("bc")));
        assert!(!within_one_edit(&chars("abc"), &chars("axy")));
        assert!(!within_one_edit(&chars("abc"), &chars("a")));
        assert!(!within_one_edit(&chars("ab"), &chars("ba")));
    }

    #[test]
    fn one_edit_is_symmetric() {
        let words = ["", "a", "ab", "abc", "abd", "acb", "xabc", "abcx", "bc", "hello", "helo"];
        for a in words {
            for b in words {
                assert_eq!(
                    within_one_edit(&chars(a), &chars(b)),
                    within_one_edit(&chars(b), &chars(a)),
                    "{a} / {b}"
                );
            }
        }
    }

    #[test]
    fn transposition_cases() {
        assert!(within_one_transposition(&chars("ab"), &chars("ba")));
        assert!(within_one_transposition(&chars("abc"), &chars("bac")));
        assert!(within_one_transposition(&chars("abcd"), &chars("abdc")));
        assert!(!within_one_transposition(&chars("abc"), &chars("cba")));
        assert!(!within_one_transposition(&chars("abc"), &chars("abc")));
        assert!(!within_one_transposition(&chars("abc"), &chars("ab")));
        assert!(!within_one_transposition(&chars("a"), &chars("a")));
        assert!(!within_one_transposition(&chars("abcd"), &chars("badc")));
    }

    #[test]
    fn highlight_spans_merge_runs() {
        assert_eq!(highlight_spans("fire", "Firefox"), vec![(0, 4)]);
        assert_eq!(highlight_spans("ffx", "Firefox"), vec![(0, 1), (4, 1), (6, 1)]);
        assert_eq!(highlight_spans("VS", "visual studio"), vec![(0, 1), (2, 1)]);
    }

    #[test]
    fn highlight_spans_increase_or_are_empty() {
        let spans = highlight_spans("gim", "GNU Image Manipulation");
        assert!(!spans.is_empty());
        for pair in spans.windows(2) {
            assert!(pair[0].0 + pair[0].1 <= pair[1].0);
        }
        assert!(highlight_spans("xyz", "firefox").is_empty());
        assert!(highlight_spans("", "firefox").is_empty());
        assert!(highlight_spans("firefoxx", "firefox").is_empty());
    }
}
