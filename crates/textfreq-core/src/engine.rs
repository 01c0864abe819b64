//! The text-analysis engine.
//!
//! [`TextAnalysis`] owns one document (current text plus the immutable
//! original), its frequency table, a bounded cache of prior search
//! results, and bounded undo/redo history. All operations are synchronous
//! in-memory transformations; only session load/save (in the `session`
//! module) touches the filesystem.
//!
//! Search and replace never return errors for user-input reasons. An
//! unknown word, an empty query, or a replace without a preceding search
//! all come back as descriptive values.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use regex::{NoExpand, Regex};
use tracing::{debug, error};

use crate::cache::{SearchCache, SearchHit};
use crate::error::Result;
use crate::frequency;
use crate::history::History;
use crate::lingua::{
    is_supported, LanguageDetector, LemmaExpander, ScriptDetector, SuffixExpander,
    SUPPORTED_LANGUAGES,
};
use crate::pattern::{build_query, ModeFlags};

/// The injected linguistic backends.
pub struct Capabilities {
    /// Language identification for loaded documents.
    pub detector: Box<dyn LanguageDetector>,
    /// Query expansion for smart mode.
    pub expander: Box<dyn LemmaExpander>,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            detector: Box::new(ScriptDetector),
            expander: Box::new(SuffixExpander),
        }
    }
}

/// The most recent successful search, consumed by the next replace.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LastSearch {
    pattern: String,
    case_sensitive: bool,
}

/// Outcome of a search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// No query was entered.
    EmptyQuery,
    /// The word does not occur in the text.
    NotFound {
        /// The word as the user typed it.
        word: String,
    },
    /// Matching rows, with highlight data when a detailed search was
    /// requested.
    Found(SearchHit),
}

impl SearchOutcome {
    /// Human-readable form, as shown in the command loop.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::EmptyQuery => "Enter a word for search.".to_string(),
            Self::NotFound { word } => format!("\"{word}\" - not exist in text."),
            Self::Found(hit) => hit.rendered.clone(),
        }
    }
}

/// Frequency analysis, cached search/replace and undo/redo over one
/// document.
pub struct TextAnalysis {
    path: PathBuf,
    flags: ModeFlags,
    last_search: Option<LastSearch>,
    old_text: String,
    text: String,
    result_counter: BTreeMap<String, usize>,
    datetime_created: NaiveDateTime,
    language: String,
    cache: SearchCache,
    history: History,
    detector: Box<dyn LanguageDetector>,
    expander: Box<dyn LemmaExpander>,
}

impl std::fmt::Debug for TextAnalysis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextAnalysis")
            .field("path", &self.path)
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

impl TextAnalysis {
    /// Analyze an in-memory document.
    ///
    /// `path` is remembered as the nominal source for save-path naming.
    /// The language is detected and the frequency table computed up
    /// front.
    ///
    /// # Errors
    ///
    /// [`crate::AnalysisError::EmptyContent`] when the text holds no
    /// tokens.
    pub fn from_text(path: impl Into<PathBuf>, text: &str, caps: Capabilities) -> Result<Self> {
        let result_counter = frequency::count_tokens(text)?;
        let language = caps.detector.detect(text);
        Ok(Self {
            path: path.into(),
            flags: ModeFlags::default(),
            last_search: None,
            old_text: text.to_string(),
            text: text.to_string(),
            result_counter,
            datetime_created: chrono::Local::now().naive_local(),
            language,
            cache: SearchCache::new(),
            history: History::new(),
            detector: caps.detector,
            expander: caps.expander,
        })
    }

    /// Assemble an engine from restored session state.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_session_state(
        path: PathBuf,
        old_text: String,
        text: String,
        result_counter: BTreeMap<String, usize>,
        datetime_created: NaiveDateTime,
        language: String,
        cache: SearchCache,
        history: History,
        caps: Capabilities,
    ) -> Self {
        Self {
            path,
            flags: ModeFlags::default(),
            last_search: None,
            old_text,
            text,
            result_counter,
            datetime_created,
            language,
            cache,
            history,
            detector: caps.detector,
            expander: caps.expander,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The nominal source path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The current document text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The immutable original text.
    #[must_use]
    pub fn old_text(&self) -> &str {
        &self.old_text
    }

    /// The detected (or restored) language code.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// When the analysis was created.
    #[must_use]
    pub fn created(&self) -> NaiveDateTime {
        self.datetime_created
    }

    /// The active mode switches.
    #[must_use]
    pub fn flags(&self) -> ModeFlags {
        self.flags
    }

    /// The last computed frequency table.
    #[must_use]
    pub fn result_counter(&self) -> &BTreeMap<String, usize> {
        &self.result_counter
    }

    /// The search cache.
    #[must_use]
    pub fn cache(&self) -> &SearchCache {
        &self.cache
    }

    /// The undo/redo history.
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    // ========================================================================
    // Mode toggles
    // ========================================================================

    /// Enable root (substring) mode, turning the other modes off.
    pub fn root_mode_on(&mut self) -> String {
        let others = self.flags.smart_mode || self.flags.case_sensitive;
        self.flags = ModeFlags {
            root_mode: true,
            ..ModeFlags::default()
        };
        format!(
            "Root mode on{}",
            if others {
                ", smart mode off, case sensitive off."
            } else {
                "."
            }
        )
    }

    /// Disable root mode.
    pub fn root_mode_off(&mut self) -> String {
        self.flags.root_mode = false;
        "Root mode off.".to_string()
    }

    /// Current root-mode status line.
    #[must_use]
    pub fn show_root_mode(&self) -> String {
        format!("Root mode: {}", if self.flags.root_mode { "on." } else { "off." })
    }

    /// Enable case-sensitive mode, turning the other modes off.
    pub fn case_sens_on(&mut self) -> String {
        let others = self.flags.smart_mode || self.flags.root_mode;
        self.flags = ModeFlags {
            case_sensitive: true,
            ..ModeFlags::default()
        };
        format!(
            "Case sensitive on{}",
            if others { ", smart mode off, root mode off." } else { "." }
        )
    }

    /// Disable case-sensitive mode.
    pub fn case_sens_off(&mut self) -> String {
        self.flags.case_sensitive = false;
        "Case sensitive off.".to_string()
    }

    /// Current case-sensitivity status line.
    #[must_use]
    pub fn show_case_sens(&self) -> String {
        format!(
            "Case sensitive: {}",
            if self.flags.case_sensitive { "on." } else { "off." }
        )
    }

    /// Enable smart mode if the document language supports it.
    ///
    /// On an unsupported language the request is rejected with an
    /// explanation and the previous mode is kept.
    pub fn smart_mode_on(&mut self) -> String {
        if !is_supported(&self.language) {
            return format!(
                "At the moment the Smart mode only supports {} languages, your text is in the {} language.",
                SUPPORTED_LANGUAGES.join(", "),
                self.language
            );
        }
        let others = self.flags.case_sensitive || self.flags.root_mode;
        self.flags = ModeFlags {
            smart_mode: true,
            ..ModeFlags::default()
        };
        format!(
            "Smart mode on{}",
            if others {
                ", case sensitive off, root mode off."
            } else {
                "."
            }
        )
    }

    /// Disable smart mode.
    pub fn smart_mode_off(&mut self) -> String {
        self.flags.smart_mode = false;
        "Smart mode off.".to_string()
    }

    /// Current smart-mode status line.
    #[must_use]
    pub fn show_smart_mode(&self) -> String {
        format!("Smart mode: {}", if self.flags.smart_mode { "on." } else { "off." })
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Search for `word` under the active mode.
    ///
    /// With `detailed` set, the result also carries highlight spans and a
    /// count-by-row table. Successful results are cached unless a redo is
    /// pending (a redo would overwrite the document and stale the entry).
    pub fn search(&mut self, word: &str, detailed: bool) -> SearchOutcome {
        if word.is_empty() {
            self.last_search = None;
            return SearchOutcome::EmptyQuery;
        }

        let query = build_query(word, self.flags, &self.language, self.expander.as_ref());
        let key = format!(
            "{} {} {} {}",
            query.pattern, self.flags.case_sensitive, self.flags.smart_mode, self.flags.root_mode
        );

        if let Some(hit) = self.cache.get(&key) {
            debug!(key = %key, "search cache hit");
            self.last_search = Some(LastSearch {
                pattern: query.pattern,
                case_sensitive: self.flags.case_sensitive,
            });
            return SearchOutcome::Found(hit.clone());
        }

        let re = match Regex::new(&query.pattern) {
            Ok(re) => re,
            Err(err) => {
                // Patterns are built from escaped input; this is a bug,
                // not a user condition.
                error!(pattern = %query.pattern, %err, "search pattern failed to compile");
                self.last_search = None;
                return SearchOutcome::NotFound {
                    word: word.to_string(),
                };
            }
        };

        let view;
        let match_text: &str = if query.lowercase_view {
            view = self.text.to_lowercase();
            &view
        } else {
            &self.text
        };

        // Lowercasing never adds or removes line breaks, so after blank
        // lines are dropped the two row lists stay index-aligned.
        let rows: Vec<&str> = match_text.split('\n').filter(|row| !row.is_empty()).collect();
        let orig_rows: Vec<&str> = self.text.split('\n').filter(|row| !row.is_empty()).collect();

        let mut rendered = String::new();
        let mut match_view = String::new();
        let mut counts_by_row: Vec<(usize, usize)> = Vec::new();
        for (idx, row) in rows.iter().enumerate() {
            let count = re.find_iter(row).count();
            if count > 0 {
                let number = idx + 1;
                rendered.push_str(&format!("№{number}: {}\n\n", orig_rows[idx]));
                if detailed {
                    match_view.push_str(&format!("№{number}: {row}\n\n"));
                }
                counts_by_row.push((number, count));
            }
        }

        if counts_by_row.is_empty() {
            self.last_search = None;
            return SearchOutcome::NotFound {
                word: word.to_string(),
            };
        }

        let (spans, report) = if detailed {
            let spans: Vec<(usize, usize)> = re
                .find_iter(&match_view)
                .map(|m| (m.start(), m.end()))
                .collect();
            (
                Some(spans),
                Some(render_report(&query.described, &counts_by_row)),
            )
        } else {
            (None, None)
        };

        let hit = SearchHit {
            rendered,
            spans,
            report,
        };
        if self.history.has_redo() {
            debug!(key = %key, "redo pending; search result not cached");
        } else {
            self.cache.insert(key, hit.clone());
        }
        self.last_search = Some(LastSearch {
            pattern: query.pattern,
            case_sensitive: self.flags.case_sensitive,
        });
        SearchOutcome::Found(hit)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Replace (or with an empty `replacement`, remove) every occurrence
    /// of the last successful search.
    ///
    /// Valid only immediately after a successful search; the last search
    /// is consumed either way.
    pub fn remove_or_replace(&mut self, replacement: &str) -> String {
        let Some(last) = self.last_search.take() else {
            return "First find the word in the text.".to_string();
        };
        let re = match Regex::new(&last.pattern) {
            Ok(re) => re,
            Err(err) => {
                error!(pattern = %last.pattern, %err, "stored pattern failed to compile");
                return "First find the word in the text.".to_string();
            }
        };

        self.history.record(&self.text, &self.old_text);

        if last.case_sensitive {
            self.text = re.replace_all(&self.text, NoExpand(replacement)).into_owned();
        } else {
            // Spans are found against the lowercased text and applied to
            // the original-case text from the highest offset down, so
            // earlier offsets stay valid while later ones are rewritten.
            let lowered = self.text.to_lowercase();
            let mut spans: Vec<(usize, usize)> =
                re.find_iter(&lowered).map(|m| (m.start(), m.end())).collect();
            spans.sort_unstable();
            for &(start, end) in spans.iter().rev() {
                if end <= self.text.len()
                    && self.text.is_char_boundary(start)
                    && self.text.is_char_boundary(end)
                {
                    self.text.replace_range(start..end, replacement);
                } else {
                    // Length-changing case mapping shifted this span off a
                    // char boundary; skipping it beats corrupting the text.
                    debug!(start, end, "skipped span off char boundary");
                }
            }
        }

        self.cache.invalidate(&re, last.case_sensitive);
        if replacement.is_empty() {
            "Words removed.".to_string()
        } else {
            "Words replaced.".to_string()
        }
    }

    /// Undo the most recent mutation.
    pub fn undo(&mut self) -> String {
        match self.history.undo(&self.text) {
            Some(snapshot) => {
                self.text = snapshot;
                "Successful undo.".to_string()
            }
            None => "Nothing to undo, but you can restart the text.".to_string(),
        }
    }

    /// Redo the most recently undone mutation.
    pub fn redo(&mut self) -> String {
        match self.history.redo(&self.text) {
            Some(snapshot) => {
                self.text = snapshot;
                "Successful redo.".to_string()
            }
            None => "Not successful redo.".to_string(),
        }
    }

    /// Reset the text to the original, recording the current version.
    pub fn restart(&mut self) -> String {
        if self.text == self.old_text {
            return "The text is not restarted because it is already equal to the original text."
                .to_string();
        }
        self.history.record(&self.text, &self.old_text);
        self.text = self.old_text.clone();
        "Text restarted.".to_string()
    }

    // ========================================================================
    // Listings
    // ========================================================================

    /// Recompute the frequency table from the current text.
    ///
    /// # Errors
    ///
    /// [`crate::AnalysisError::EmptyContent`] when the text no longer
    /// holds any token; the previous table is kept in that case.
    pub fn refresh_counter(&mut self) -> Result<()> {
        self.result_counter = frequency::count_tokens(&self.text)?;
        Ok(())
    }

    /// All unique tokens, sorted.
    pub fn word_list(&mut self) -> Result<Vec<String>> {
        self.refresh_counter()?;
        Ok(self.result_counter.keys().cloned().collect())
    }

    /// The rendered frequency table with timestamp footer.
    pub fn summary(&mut self) -> Result<String> {
        self.refresh_counter()?;
        Ok(frequency::render_table(
            &self.result_counter,
            self.datetime_created,
        ))
    }
}

/// Format the detailed count-by-row table.
fn render_report(described: &str, counts_by_row: &[(usize, usize)]) -> String {
    let total: usize = counts_by_row.iter().map(|(_, count)| count).sum();
    let width_row = counts_by_row
        .iter()
        .map(|(row, _)| row.to_string().len())
        .max()
        .unwrap_or(0)
        .max(8);
    let width_count = counts_by_row
        .iter()
        .map(|(_, count)| count.to_string().len())
        .max()
        .unwrap_or(0)
        .max(11);

    let mut out = format!("Search for \"{described}\":\n\n");
    out.push_str(&format!("Found words: {total}.\n\n"));
    out.push_str(&format!(
        "{:^width_row$}|{:^width_count$}\n{}\n",
        "№ string",
        "count words",
        "-".repeat(width_row + width_count + 1)
    ));
    let lines: Vec<String> = counts_by_row
        .iter()
        .map(|(row, count)| format!("{row:^width_row$}|{count:^width_count$}"))
        .collect();
    out.push_str(&lines.join("\n"));
    out
}
