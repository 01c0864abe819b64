//! Error taxonomy for the analysis engine.
//!
//! Errors are raised only at the file boundary (load/save). Search and
//! replace operations report user-facing conditions as outcome values
//! instead of errors, so callers never need to catch anything for a
//! mistyped query.

use std::io;

use thiserror::Error;

/// Errors surfaced by load/save and the frequency counter.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The file extension is not one of the supported formats.
    #[error("Invalid file format.")]
    InvalidFormat,

    /// The text contains no word or number tokens.
    #[error("The file does not contain words or numbers.")]
    EmptyContent,

    /// The file is missing or access was denied.
    #[error("File not found or access denied.")]
    NotFound,

    /// Any other I/O failure.
    #[error("An I/O error occurred: {0}")]
    Io(#[from] io::Error),

    /// A persisted session is malformed (missing or mistyped fields).
    #[error("The session file is corrupted: {0}")]
    CorruptSession(String),
}

impl AnalysisError {
    /// Map an I/O error to the boundary taxonomy.
    ///
    /// Missing files and permission denials are reported as [`NotFound`],
    /// everything else stays a generic I/O failure.
    ///
    /// [`NotFound`]: AnalysisError::NotFound
    #[must_use]
    pub fn from_io(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => Self::NotFound,
            _ => Self::Io(err),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AnalysisError>;
