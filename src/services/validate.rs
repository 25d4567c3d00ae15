//! Field-level input helpers shared by member and admin services.
//!
//! Validation here stays shallow: trim, require non-empty, clamp
//! numbers. Structural integrity (uniqueness, foreign keys) stays with
//! Postgres constraints.

use std::sync::LazyLock;

use regex::Regex;

/// Trimmed value, or `None` when absent or blank.
#[must_use]
pub fn trimmed(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned)
}

/// Trimmed value, or the given message when absent or blank.
///
/// # Errors
///
/// Returns `message` when the value is missing or whitespace only.
pub fn required(raw: Option<&str>, message: &'static str) -> Result<String, &'static str> {
    trimmed(raw).ok_or(message)
}

/// Lowercase, trim, and replace whitespace runs with `-`.
#[must_use]
pub fn slugify(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Split a comma-separated list, trimming entries and dropping empties.
#[must_use]
pub fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// `local@domain.tld`: no whitespace, exactly one `@`, and a dot with at
/// least one character on each side somewhere in the domain.
#[must_use]
pub fn is_plausible_email(raw: &str) -> bool {
    EMAIL_PATTERN.is_match(raw)
}

/// Escape text for interpolation into an HTML template.
#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
