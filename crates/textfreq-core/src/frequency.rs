//! Token scanning and frequency counting.
//!
//! A token is a maximal run of word characters (with internal hyphens or
//! apostrophes allowed), a decimal literal, or an integer literal. Counts
//! are case-preserving and kept sorted by token, which a `BTreeMap` gives
//! for free.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AnalysisError, Result};

/// Word/number lexical pattern.
pub const TOKEN_PATTERN: &str = r"\b\w+(?:[-']\w+)*\b|\b\d*\.\d+\b|\b\d+\b";

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(TOKEN_PATTERN).expect("token pattern is a valid regex")
});

/// Count every token in `text`, sorted by token.
///
/// # Errors
///
/// Returns [`AnalysisError::EmptyContent`] when no token matches at all.
pub fn count_tokens(text: &str) -> Result<BTreeMap<String, usize>> {
    let mut counter = BTreeMap::new();
    for token in TOKEN_RE.find_iter(text) {
        *counter.entry(token.as_str().to_string()).or_insert(0) += 1;
    }
    if counter.is_empty() {
        return Err(AnalysisError::EmptyContent);
    }
    Ok(counter)
}

/// Render the frequency table as an aligned `word | count` listing with
/// the analysis timestamp as footer.
#[must_use]
pub fn render_table(counter: &BTreeMap<String, usize>, created: NaiveDateTime) -> String {
    let width_word = counter
        .keys()
        .map(|word| word.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);
    let width_count = counter
        .values()
        .map(|count| count.to_string().len())
        .max()
        .unwrap_or(0)
        .max(5);

    let mut out = String::from("Analysis Results:\n\n");
    out.push_str(&format!(
        "{:^width_word$}|{:^width_count$}\n{}\n",
        "word",
        "count",
        "-".repeat(width_word + width_count + 1)
    ));
    let rows: Vec<String> = counter
        .iter()
        .map(|(word, count)| {
            // Pad by char count so non-ASCII tokens line up.
            let pad = width_word.saturating_sub(word.chars().count());
            let left = pad / 2;
            format!(
                "{}{}{}|{:^width_count$}",
                " ".repeat(left),
                word,
                " ".repeat(pad - left),
                count
            )
        })
        .collect();
    out.push_str(&rows.join("\n"));
    out.push_str("\n\nAnalysis performed on: ");
    out.push_str(&created.format("%d %B %Y; %H:%M").to_string());
    out.push('\n');
    out
}
