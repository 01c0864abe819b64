//! Pattern builder: turns a query word and the active search mode into a
//! regex pattern, the text view to match against, and a human-readable
//! description of what was searched.

use serde::{Deserialize, Serialize};

use crate::lingua::{Expansion, LemmaExpander};

/// The mutually exclusive search mode switches.
///
/// All three off is the plain mode: lowercased whole-word matching. The
/// engine's toggle operations keep at most one switch on at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeFlags {
    /// Match the word exactly as typed against the unmodified text.
    pub case_sensitive: bool,
    /// Expand the word linguistically (stem or surface forms).
    pub smart_mode: bool,
    /// Match the word as a bare substring of any token.
    pub root_mode: bool,
}

/// A prepared search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Regex source to match with.
    pub pattern: String,
    /// Whether matching runs against the lowercased document view.
    pub lowercase_view: bool,
    /// What was actually searched, for logs and result headers.
    pub described: String,
}

/// Build the query for `word` under the given mode flags.
///
/// Smart mode consults the injected [`LemmaExpander`] with the document
/// language; every other mode is self-contained.
#[must_use]
pub fn build_query(
    word: &str,
    flags: ModeFlags,
    language: &str,
    expander: &dyn LemmaExpander,
) -> Query {
    if flags.case_sensitive {
        return Query {
            pattern: format!(r"\b{}\b", regex::escape(word)),
            lowercase_view: false,
            described: word.to_string(),
        };
    }

    let lower = word.to_lowercase();
    if flags.root_mode {
        return Query {
            pattern: format!(r"\b\w*{}\w*\b", regex::escape(&lower)),
            lowercase_view: true,
            described: format!("*{lower}*"),
        };
    }

    if flags.smart_mode {
        return match expander.expand(&lower, language) {
            Expansion::Stem(stem) => Query {
                pattern: format!(r"\b\w*{}\w*\b", regex::escape(&stem)),
                lowercase_view: true,
                described: format!("*{stem}*"),
            },
            Expansion::SurfaceForms(forms) => {
                let mut seen = Vec::new();
                for form in forms {
                    if !seen.contains(&form) {
                        seen.push(form);
                    }
                }
                let pattern = seen
                    .iter()
                    .map(|form| format!(r"\b{}\b", regex::escape(form)))
                    .collect::<Vec<_>>()
                    .join("|");
                Query {
                    pattern,
                    lowercase_view: true,
                    described: seen.join(", "),
                }
            }
        };
    }

    Query {
        pattern: format!(r"\b{}\b", regex::escape(&lower)),
        lowercase_view: true,
        described: lower,
    }
}
