//! Session persistence.
//!
//! A session is the whole engine state: both texts, the frequency table,
//! the creation timestamp, the detected language, the search cache with
//! its insertion-order key list, and the two history stacks. Two
//! interchangeable encodings carry the same [`SessionRecord`]:
//!
//! - `.json` — human-readable, field names fixed by the format;
//! - `.bin` — an opaque bincode snapshot.
//!
//! Loading a `.txt` file instead starts a fresh analysis. Anything else
//! is rejected as an invalid format.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache::{SearchCache, SearchHit};
use crate::engine::{Capabilities, TextAnalysis};
use crate::error::{AnalysisError, Result};
use crate::history::History;

/// Fixed timestamp format used in persisted sessions.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// How much of a persisted session to restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// Restore everything, cache included.
    #[default]
    Full,
    /// Drop the cache and key list so an interactive front-end starts
    /// with a cold cache; text and history are kept.
    ColdCache,
}

/// The persisted form of an engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// The immutable original text.
    pub old_text: String,
    /// The current text.
    pub text: String,
    /// Token → occurrence count.
    pub result_counter: BTreeMap<String, usize>,
    /// Creation timestamp, formatted with [`TIMESTAMP_FORMAT`].
    pub datetime_created: String,
    /// Detected language code.
    pub language: String,
    /// Cached search results.
    pub search_cache: HashMap<String, SearchHit>,
    /// Cache keys in insertion order.
    pub search_cache_keys: Vec<String>,
    /// Undo stack, oldest first.
    pub history: Vec<String>,
    /// Redo stack, oldest first.
    pub redo_stack: Vec<String>,
}

impl TextAnalysis {
    /// Load a document or persisted session from `path`, restoring the
    /// full cache.
    ///
    /// # Errors
    ///
    /// The boundary taxonomy: [`AnalysisError::InvalidFormat`] for an
    /// unsupported extension, [`AnalysisError::NotFound`] for a missing
    /// or unreadable file, [`AnalysisError::EmptyContent`] for tokenless
    /// text, [`AnalysisError::CorruptSession`] for malformed session
    /// data, [`AnalysisError::Io`] for anything else.
    pub fn load(path: &Path, caps: Capabilities) -> Result<Self> {
        Self::load_with(path, caps, LoadMode::Full)
    }

    /// Load with an explicit [`LoadMode`].
    pub fn load_with(path: &Path, caps: Capabilities, mode: LoadMode) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("txt") => {
                let text = fs::read_to_string(path).map_err(AnalysisError::from_io)?;
                let engine = Self::from_text(path, &text, caps)?;
                info!(path = %path.display(), language = %engine.language(), "analyzed text file");
                Ok(engine)
            }
            Some("json") => {
                let raw = fs::read_to_string(path).map_err(AnalysisError::from_io)?;
                let record: SessionRecord = serde_json::from_str(&raw)
                    .map_err(|err| AnalysisError::CorruptSession(err.to_string()))?;
                Self::from_record(path.to_path_buf(), record, caps, mode)
            }
            Some("bin") => {
                let raw = fs::read(path).map_err(AnalysisError::from_io)?;
                let record: SessionRecord = bincode::deserialize(&raw)
                    .map_err(|err| AnalysisError::CorruptSession(err.to_string()))?;
                Self::from_record(path.to_path_buf(), record, caps, mode)
            }
            _ => Err(AnalysisError::InvalidFormat),
        }
    }

    fn from_record(
        path: PathBuf,
        record: SessionRecord,
        caps: Capabilities,
        mode: LoadMode,
    ) -> Result<Self> {
        let created = NaiveDateTime::parse_from_str(&record.datetime_created, TIMESTAMP_FORMAT)
            .map_err(|err| {
                AnalysisError::CorruptSession(format!(
                    "bad datetime_created {:?}: {err}",
                    record.datetime_created
                ))
            })?;
        let cache = match mode {
            LoadMode::Full => SearchCache::from_parts(record.search_cache, record.search_cache_keys),
            LoadMode::ColdCache => SearchCache::new(),
        };
        info!(path = %path.display(), ?mode, "restored session");
        Ok(Self::from_session_state(
            path,
            record.old_text,
            record.text,
            record.result_counter,
            created,
            record.language,
            cache,
            History::from_parts(record.history, record.redo_stack),
            caps,
        ))
    }

    /// Snapshot the engine into its persisted form.
    #[must_use]
    pub fn to_record(&self) -> SessionRecord {
        SessionRecord {
            old_text: self.old_text().to_string(),
            text: self.text().to_string(),
            result_counter: self.result_counter().clone(),
            datetime_created: self.created().format(TIMESTAMP_FORMAT).to_string(),
            language: self.language().to_string(),
            search_cache: self.cache().entries().clone(),
            search_cache_keys: self.cache().keys().to_vec(),
            history: self.history().undo_stack().to_vec(),
            redo_stack: self.history().redo_stack().to_vec(),
        }
    }

    /// Save the session as JSON next to the source file.
    ///
    /// Returns the status message, noting when a numeric suffix had to be
    /// appended to keep the path unique.
    pub fn save_to_json(&self) -> Result<String> {
        let (path, message) = self.save_path("json");
        let record = self.to_record();
        let raw = serde_json::to_string_pretty(&record)
            .map_err(|err| AnalysisError::CorruptSession(err.to_string()))?;
        fs::write(&path, raw).map_err(AnalysisError::from_io)?;
        info!(path = %path.display(), "saved session to json");
        Ok(message)
    }

    /// Save the session as an opaque binary snapshot next to the source
    /// file.
    pub fn save_to_binary(&self) -> Result<String> {
        let (path, message) = self.save_path("bin");
        let record = self.to_record();
        let raw = bincode::serialize(&record)
            .map_err(|err| AnalysisError::CorruptSession(err.to_string()))?;
        fs::write(&path, raw).map_err(AnalysisError::from_io)?;
        info!(path = %path.display(), "saved session to binary");
        Ok(message)
    }

    /// Pick a save path that does not collide with an existing file.
    ///
    /// Fresh analyses (a `.txt` source) are stamped with the creation
    /// date and a zero-padded counter; re-saved sessions reuse the stem
    /// with the counter replacing its last three characters.
    fn save_path(&self, extension: &str) -> (PathBuf, String) {
        let stem = self
            .path()
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("analysis");
        let directory = self.path().parent().unwrap_or_else(|| Path::new("."));
        let from_txt = self
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
        let date = self.created().date();

        let mut candidate = if from_txt {
            directory.join(format!("{date}_{stem}_000.{extension}"))
        } else {
            directory.join(format!("{stem}.{extension}"))
        };
        let mut count = 1u32;
        while candidate.exists() {
            candidate = if from_txt {
                directory.join(format!("{date}_{stem}_{count:03}.{extension}"))
            } else {
                directory.join(format!("{}{count:03}.{extension}", trim_counter(stem)))
            };
            count += 1;
        }

        let message = if count > 1 {
            "Such a file may already exist, but it was still saved with a unique authenticator."
                .to_string()
        } else {
            format!(
                "File save to {}.",
                if extension == "json" { "json" } else { "binary" }
            )
        };
        (candidate, message)
    }
}

/// Drop the trailing counter (last three characters) from a session stem.
fn trim_counter(stem: &str) -> &str {
    match stem.char_indices().rev().nth(2) {
        Some((idx, _)) => &stem[..idx],
        None => stem,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_sample(dir: &TempDir, name: &str, text: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn unsupported_extension_is_invalid_format() {
        let dir = TempDir::new().unwrap();
        let path = write_sample(&dir, "data.csv", "a,b,c");
        let err = TextAnalysis::load(&path, Capabilities::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidFormat));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err =
            TextAnalysis::load(Path::new("/nonexistent/missing.txt"), Capabilities::default())
                .unwrap_err();
        assert!(matches!(err, AnalysisError::NotFound));
    }

    #[test]
    fn tokenless_text_is_empty_content() {
        let dir = TempDir::new().unwrap();
        let path = write_sample(&dir, "blank.txt", "... --- !!!");
        let err = TextAnalysis::load(&path, Capabilities::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyContent));
    }

    #[test]
    fn corrupt_json_is_corrupt_session() {
        let dir = TempDir::new().unwrap();
        let path = write_sample(&dir, "broken.json", "{\"old_text\": 42}");
        let err = TextAnalysis::load(&path, Capabilities::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::CorruptSession(_)));
    }

    #[test]
    fn bad_timestamp_is_corrupt_session() {
        let dir = TempDir::new().unwrap();
        let record = SessionRecord {
            old_text: "cat".to_string(),
            text: "cat".to_string(),
            result_counter: BTreeMap::from([("cat".to_string(), 1)]),
            datetime_created: "yesterday-ish".to_string(),
            language: "en".to_string(),
            search_cache: HashMap::new(),
            search_cache_keys: Vec::new(),
            history: Vec::new(),
            redo_stack: Vec::new(),
        };
        let path = dir.path().join("session.json");
        fs::write(&path, serde_json::to_string(&record).unwrap()).unwrap();
        let err = TextAnalysis::load(&path, Capabilities::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::CorruptSession(_)));
    }

    #[test]
    fn fresh_save_path_carries_date_and_counter() {
        let dir = TempDir::new().unwrap();
        let path = write_sample(&dir, "novel.txt", "cat dog");
        let engine = TextAnalysis::load(&path, Capabilities::default()).unwrap();

        let message = engine.save_to_json().unwrap();
        assert_eq!(message, "File save to json.");
        let date = engine.created().date();
        assert!(dir.path().join(format!("{date}_novel_000.json")).exists());
    }

    #[test]
    fn colliding_save_paths_get_unique_suffixes() {
        let dir = TempDir::new().unwrap();
        let path = write_sample(&dir, "novel.txt", "cat dog");
        let engine = TextAnalysis::load(&path, Capabilities::default()).unwrap();

        assert_eq!(engine.save_to_json().unwrap(), "File save to json.");
        let message = engine.save_to_json().unwrap();
        assert_eq!(
            message,
            "Such a file may already exist, but it was still saved with a unique authenticator."
        );
        let date = engine.created().date();
        assert!(dir.path().join(format!("{date}_novel_000.json")).exists());
        assert!(dir.path().join(format!("{date}_novel_001.json")).exists());
    }

    #[test]
    fn resaved_session_reuses_stem_with_counter() {
        let dir = TempDir::new().unwrap();
        let path = write_sample(&dir, "novel.txt", "cat dog");
        let engine = TextAnalysis::load(&path, Capabilities::default()).unwrap();
        engine.save_to_json().unwrap();

        let date = engine.created().date();
        let session_path = dir.path().join(format!("{date}_novel_000.json"));
        let restored = TextAnalysis::load(&session_path, Capabilities::default()).unwrap();

        // The stem itself exists, so the counter replaces its trailing
        // "000" and the collision is reported.
        let message = restored.save_to_json().unwrap();
        assert_eq!(
            message,
            "Such a file may already exist, but it was still saved with a unique authenticator."
        );
        assert!(dir.path().join(format!("{date}_novel_001.json")).exists());
    }

    #[test]
    fn binary_save_writes_a_bin_file() {
        let dir = TempDir::new().unwrap();
        let path = write_sample(&dir, "novel.txt", "cat dog");
        let engine = TextAnalysis::load(&path, Capabilities::default()).unwrap();
        assert_eq!(engine.save_to_binary().unwrap(), "File save to binary.");
        let date = engine.created().date();
        assert!(dir.path().join(format!("{date}_novel_000.bin")).exists());
    }

    #[test]
    fn trim_counter_is_char_safe() {
        assert_eq!(trim_counter("novel_000"), "novel_");
        assert_eq!(trim_counter("ab"), "ab");
        assert_eq!(trim_counter("кіт000"), "кіт");
    }

    #[test]
    fn timestamp_format_round_trips() {
        let now = chrono::Local::now().naive_local();
        let formatted = now.format(TIMESTAMP_FORMAT).to_string();
        let parsed = NaiveDateTime::parse_from_str(&formatted, TIMESTAMP_FORMAT).unwrap();
        assert_eq!(parsed.format(TIMESTAMP_FORMAT).to_string(), formatted);
    }
}
