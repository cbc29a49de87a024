//! Query substitution into shortcut templates.
//!
//! A template containing [`PLACEHOLDER`] has every occurrence replaced;
//! otherwise the value is appended to the end.

pub const PLACEHOLDER: &str = "{query}";

pub fn substitute(template: &str, value: &str) -> String {
    if template.contains(PLACEHOLDER) {
        template.replace(PLACEHOLDER, value)
    } else {
        format!("{template}{value}")
    }
}

/// POSIX single-quoting: `it's` becomes `'it'\''s'`.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Substitutes a shell-quoted query. An empty query leaves a template
/// without placeholder untouched; an appended argument gets a separating
/// space.
pub fn shell_substitute(template: &str, query: &str) -> String {
    if template.contains(PLACEHOLDER) {
        return substitute(template, &shell_quote(query));
    }
    if query.is_empty() {
        return template.to_string();
    }
    let separator = if template.is_empty() || template.ends_with(char::is_whitespace) {
        ""
    } else {
        " "
    };
    format!("{template}{separator}{}", shell_quote(query))
}

pub fn url_substitute(template: &str, query: &str) -> String {
    substitute(template, &urlencoding::encode(query))
}
