//! Injected linguistic capabilities.
//!
//! Smart search needs two things the engine cannot provide itself: a
//! language guess for the loaded document and a way to expand a query
//! word into related forms. Both are modeled as traits so integrators can
//! plug in a real language-identification or morphology backend; the
//! engine depends only on these seams.
//!
//! The built-in implementations are deliberately small reference
//! backends: a script-frequency detector and an English suffix stemmer
//! with identity surface forms for the inflected languages.

/// Languages the smart mode knows how to expand.
pub const SUPPORTED_LANGUAGES: [&str; 3] = ["uk", "ru", "en"];

/// Check whether smart mode supports the given language code.
#[must_use]
pub fn is_supported(language: &str) -> bool {
    SUPPORTED_LANGUAGES.contains(&language)
}

/// Guesses the language of a document.
pub trait LanguageDetector {
    /// Return an ISO-639-1-style code ("en", "uk", ...; "und" if unknown).
    fn detect(&self, text: &str) -> String;
}

/// How a query word expands under smart search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expansion {
    /// Stem-based family: match any token containing this stem.
    Stem(String),
    /// Inflected family: match any of these surface forms as whole words.
    SurfaceForms(Vec<String>),
}

/// Expands a query word into its smart-search form set.
pub trait LemmaExpander {
    /// Expand `word` for the given language code.
    fn expand(&self, word: &str, language: &str) -> Expansion;
}

/// Script-frequency language detector.
///
/// Counts Latin and Cyrillic letters; Ukrainian is recognized by its
/// exclusive letters, remaining Cyrillic text is reported as Russian.
/// Not a substitute for a real langid backend, but good enough to drive
/// the smart-mode gate without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptDetector;

/// Letters that occur in Ukrainian but not in Russian.
const UKRAINIAN_MARKERS: [char; 8] = ['і', 'ї', 'є', 'ґ', 'І', 'Ї', 'Є', 'Ґ'];

impl LanguageDetector for ScriptDetector {
    fn detect(&self, text: &str) -> String {
        let mut latin = 0usize;
        let mut cyrillic = 0usize;
        let mut ukrainian = false;
        for ch in text.chars() {
            if ch.is_ascii_alphabetic() {
                latin += 1;
            } else if ('\u{0400}'..='\u{04FF}').contains(&ch) {
                cyrillic += 1;
                if UKRAINIAN_MARKERS.contains(&ch) {
                    ukrainian = true;
                }
            }
        }
        if cyrillic > latin {
            if ukrainian { "uk" } else { "ru" }.to_string()
        } else if latin > 0 {
            "en".to_string()
        } else {
            "und".to_string()
        }
    }
}

/// Suffix-stripping expander.
///
/// English queries are reduced to a crude stem by peeling common
/// derivational and inflectional suffixes. For the inflected languages
/// the built-in backend has no morphology tables, so the surface-form
/// set is just the word itself; a pymorphy-style backend would return
/// the full lexeme here.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuffixExpander;

/// Checked longest-first; a suffix is only stripped when at least three
/// characters of stem remain.
const ENGLISH_SUFFIXES: [&str; 12] = [
    "ations", "ation", "ingly", "ings", "ing", "ness", "ment", "edly", "ers", "ies", "ed", "es",
];

fn english_stem(word: &str) -> &str {
    for suffix in ENGLISH_SUFFIXES {
        if let Some(stem) = word.strip_suffix(suffix) {
            if stem.chars().count() >= 3 {
                return stem;
            }
        }
    }
    // Plain plural, guarded against short words and "ss" endings.
    if let Some(stem) = word.strip_suffix('s') {
        if stem.chars().count() >= 3 && !stem.ends_with('s') {
            return stem;
        }
    }
    word
}

impl LemmaExpander for SuffixExpander {
    fn expand(&self, word: &str, language: &str) -> Expansion {
        match language {
            "en" => Expansion::Stem(english_stem(word).to_string()),
            _ => Expansion::SurfaceForms(vec![word.to_string()]),
        }
    }
}
