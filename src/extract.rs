// src/extract.rs
//! Best-effort extraction of a room's value from status page text.
//!
//! Status pages come in two layouts we care about: `Room 09: Available` on a
//! single line, or the label and value on consecutive lines. Anything else
//! is treated as "no value found" rather than an error.

use regex::{Regex, RegexBuilder};

/// Values longer than this are cut down before being stored or notified
pub const MAX_VALUE_CHARS: usize = 80;

/// Find the value shown next to `room_label` in `page_text`.
///
/// Returns `None` when the label never appears, when every occurrence yields
/// nothing usable, or when the label itself is blank.
pub fn extract(page_text: &str, room_label: &str) -> Option<String> {
    let label = room_label.trim();
    if label.is_empty() {
        return None;
    }

    let pattern = label_pattern(label)?;

    let lines: Vec<&str> = page_text
        .split('\n')
        .map(|line| line.trim_matches(|c: char| c == '\r' || c.is_whitespace()))
        .filter(|line| !line.is_empty())
        .collect();

    for (i, line) in lines.iter().enumerate() {
        if !pattern.is_match(line) {
            continue;
        }

        let same_line = pattern.replace_all(line, "");
        let same_line = same_line.trim_matches(is_separator);
        if !same_line.is_empty() {
            return Some(truncate(same_line));
        }

        if let Some(next) = lines.get(i + 1) {
            return Some(truncate(next));
        }
    }

    None
}

/// Case-insensitive whole-word matcher for a literal label
fn label_pattern(label: &str) -> Option<Regex> {
    RegexBuilder::new(&format!(r"\b{}\b", regex::escape(label)))
        .case_insensitive(true)
        .build()
        .ok()
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, ':' | '-' | '\u{2013}' | '\u{2014}')
}

fn truncate(value: &str) -> String {
    value.chars().take(MAX_VALUE_CHARS).collect()
}
