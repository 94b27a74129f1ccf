//! # docreader
//!
//! Convert Office documents, PDFs and HTML pages to Markdown text, from a
//! browser upload form or the command line.
//!
//! ## Why this crate?
//!
//! Feeding a `.docx` or a slide deck to a search index, a diff tool or a
//! language model usually means copy-pasting by hand. docreader turns each
//! upload into one normalised Markdown text, shows how much smaller that text
//! is than the original file, and offers it back as `.md` and `.txt`
//! downloads.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload (name + bytes)
//!  │
//!  ├─ 1. Detect    extension → DocumentFormat
//!  ├─ 2. Convert   DocumentConverter (built-in, or an external program
//!  │               run on a materialized temp file)
//!  ├─ 3. Polish    6-rule Markdown cleanup
//!  └─ 4. Present   preview, size comparison, two downloads
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docreader::{ConversionHandler, ReaderConfig, UploadedFile};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let handler = ConversionHandler::from_config(ReaderConfig::default());
//!     let file = UploadedFile::from_path("report.docx")?;
//!     match handler.process(&file) {
//!         Ok(result) => {
//!             println!("{}", result.text_content);
//!             eprintln!("{}", result.size_report().summary());
//!         }
//!         Err(failed) => eprintln!("{failed}"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docreader` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when embedding only the library or the router:
//! ```toml
//! docreader = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod config;
pub mod convert;
pub mod error;
pub mod format;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backend::{BuiltinConverter, DocumentConverter, ExternalCommandConverter, ParsedDocument};
pub use config::{ExternalCommand, ReaderConfig, ReaderConfigBuilder};
pub use convert::ConversionHandler;
pub use error::{ConversionFailed, ConvertError, ReaderError};
pub use format::DocumentFormat;
pub use output::{
    ConversionResult, Download, DownloadFormat, FileOutcome, OutcomeReport, OutcomeStatus,
    SizeReport,
};
pub use pipeline::input::UploadedFile;
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
