//! # textfreq-core
//!
//! Frequency analysis, cached search/replace and undo/redo over plain
//! text documents.
//!
//! The engine loads a text file (or a previously persisted session),
//! computes word/number frequency counts, and answers searches under
//! four mutually exclusive modes: plain (lowercased whole-word),
//! case-sensitive, root (substring) and smart (linguistic expansion via
//! injected backends). Search results are cached in a bounded FIFO
//! store; replace/remove operations consume the last search, snapshot
//! the document into bounded undo/redo history, and conservatively
//! invalidate the cache. Sessions round-trip through JSON or an opaque
//! binary snapshot.
//!
//! ```no_run
//! use std::path::Path;
//! use textfreq_core::{Capabilities, TextAnalysis};
//!
//! # fn main() -> Result<(), textfreq_core::AnalysisError> {
//! let mut analysis = TextAnalysis::load(Path::new("notes.txt"), Capabilities::default())?;
//! let outcome = analysis.search("player", true);
//! println!("{}", outcome.message());
//! analysis.remove_or_replace("participant");
//! analysis.undo();
//! analysis.save_to_json()?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod engine;
pub mod error;
pub mod frequency;
pub mod history;
pub mod lingua;
pub mod pattern;
pub mod session;

pub use cache::{SearchCache, SearchHit, CACHE_CAPACITY};
pub use engine::{Capabilities, SearchOutcome, TextAnalysis};
pub use error::{AnalysisError, Result};
pub use history::{History, HISTORY_CAPACITY};
pub use lingua::{
    Expansion, LanguageDetector, LemmaExpander, ScriptDetector, SuffixExpander,
    SUPPORTED_LANGUAGES,
};
pub use pattern::ModeFlags;
pub use session::{LoadMode, SessionRecord, TIMESTAMP_FORMAT};
