//! Error types for the docreader library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ReaderError`] — **Fatal**: the operation cannot proceed at all
//!   (invalid configuration, output file not writable, server cannot bind).
//!   Returned as `Err(ReaderError)` from setup and I/O entry points.
//!
//! * [`ConversionFailed`] — **Non-fatal**: a single uploaded file could not
//!   be converted, but every other file in the batch is unaffected. Stored in
//!   [`crate::output::FileOutcome::Failed`] so callers can present partial
//!   success instead of losing the whole batch to one bad file.
//!
//! [`ConvertError`] is what a [`crate::backend::DocumentConverter`] returns;
//! the handler wraps it into a [`ConversionFailed`] naming the file.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the docreader library.
#[derive(Debug, Error)]
pub enum ReaderError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The upload carried no usable files.
    #[error("No files were uploaded")]
    NoFiles,

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not bind or run the HTTP server.
    #[error("Server error on {addr}: {source}")]
    Server {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Why a converter could not turn a document into text.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The file extension does not map to a supported format.
    #[error("unsupported file type '{extension}' (expected one of: {expected})")]
    UnsupportedFormat { extension: String, expected: String },

    /// Zero bytes were uploaded.
    #[error("the file is empty")]
    EmptyInput,

    /// The decoding library rejected the content.
    #[error("{format} content could not be read: {detail}")]
    Corrupt { format: &'static str, detail: String },

    /// A part inside an Office archive decompresses past the configured cap.
    #[error("{format} part '{part}' expands beyond the {limit}-byte limit")]
    PartTooLarge {
        format: &'static str,
        part: String,
        limit: u64,
    },

    /// Writing the temporary copy for a path-based converter failed.
    #[error("could not stage temporary file: {0}")]
    Materialize(#[source] std::io::Error),

    /// The configured external converter failed to run or exited non-zero.
    #[error("external converter '{program}' failed: {detail}")]
    ExternalCommand { program: String, detail: String },

    /// A decoding library panicked on malformed input.
    #[error("converter crashed: {0}")]
    Panicked(String),
}

impl ConvertError {
    pub(crate) fn corrupt(format: &'static str, detail: impl std::fmt::Display) -> Self {
        ConvertError::Corrupt {
            format,
            detail: detail.to_string(),
        }
    }
}

/// A non-fatal error for a single uploaded file.
///
/// Stored in [`crate::output::FileOutcome::Failed`]. The batch continues
/// with the next file.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
#[error("Could not read {file_name}: {reason}")]
pub struct ConversionFailed {
    /// Name of the uploaded file as the user submitted it.
    pub file_name: String,
    /// Underlying error message.
    pub reason: String,
}

impl ConversionFailed {
    pub fn new(file_name: impl Into<String>, err: &ConvertError) -> Self {
        Self {
            file_name: file_name.into(),
            reason: err.to_string(),
        }
    }
}
