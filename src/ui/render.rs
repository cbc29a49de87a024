use std::fmt::Write;

use crate::model::{ResultEntry, Span};
use crate::state::AppState;

/// Plain-text view of the launcher: prompt, visible rows, status.
pub fn draw(state: &AppState) -> String {
    let mut out = String::new();
    if state.query.is_empty() {
        out.push_str("Search apps...\n");
    } else {
        let _ = writeln!(out, "> {}", state.query);
    }

    for (relative_index, entry) in state.visible().iter().enumerate() {
        let absolute = state.view_offset + relative_index;
        let marker = if absolute == state.selected_index { '*' } else { ' ' };
        let number = if relative_index < 9 {
            format!("{}. ", relative_index + 1)
        } else {
            "   ".to_string()
        };
        let _ = write!(out, "{marker} {number}{}", row_text(entry));
        out.push('\n');
    }

    if state.results.len() > state.visible().len() {
        let _ = writeln!(out, "  ({} of {})", state.selected_index + 1, state.results.len());
    }

    if let Some(status) = &state.status {
        let _ = writeln!(out, "! {status}");
    }
    out
}

fn row_text(entry: &ResultEntry) -> String {
    let mut text = mark_spans(&entry.label, &entry.highlights);
    if let Some(detail) = &entry.detail {
        if !detail.is_empty() {
            let _ = write!(text, "  ({detail})");
        }
    }
    text
}

/// Brackets highlighted character runs: `[Fire]fox`.
pub fn mark_spans(text: &str, spans: &[Span]) -> String {
    let mut out = String::with_capacity(text.len() + spans.len() * 2);
    let mut spans = spans.iter().peekable();
    let mut open_until = None;

    for (i, c) in text.chars().enumerate() {
        if let Some(&&(start, len)) = spans.peek() {
            if start == i && len > 0 {
                out.push('[');
                open_until = Some(start + len);
                spans.next();
            }
        }
        out.push(c);
        if open_until == Some(i + 1) {
            out.push(']');
            open_until = None;
        }
    }
    if open_until.is_some() {
        out.push(']');
    }
    out
}
