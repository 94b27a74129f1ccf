//! Configuration types for document conversion and the web UI.
//!
//! All behaviour is controlled through [`ReaderConfig`], built via its
//! [`ReaderConfigBuilder`]. The same config drives the HTTP server and the
//! `docreader convert` command, so both surfaces behave identically.

use crate::backend::DEFAULT_MAX_PART_BYTES;
use crate::error::ReaderError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Smallest upload limit the builder accepts.
const MIN_UPLOAD_BYTES: usize = 1024;

/// Configuration for the conversion handler and server.
///
/// Built via [`ReaderConfig::builder()`] or using
/// [`ReaderConfig::default()`].
///
/// # Example
/// ```rust
/// use docreader::ReaderConfig;
///
/// let config = ReaderConfig::builder()
///     .max_upload_bytes(50 * 1024 * 1024)
///     .clean_output(true)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ReaderConfig {
    /// Maximum accepted request body in bytes. Default: 200 MiB.
    ///
    /// Uploads are buffered whole, so this bounds the size of a request.
    pub max_upload_bytes: usize,

    /// Largest decompressed size of any one part of a DOCX/XLSX/PPTX
    /// archive. Default: 256 MiB.
    ///
    /// Zip parts compress extremely well, so without this cap a small upload
    /// could expand to gigabytes in memory.
    pub max_part_bytes: u64,

    /// Run the post-processing rules on converter output. Default: true.
    pub clean_output: bool,

    /// Directory for temporary copies made by path-based converters.
    /// If None, uses the system temp directory.
    pub scratch_dir: Option<PathBuf>,

    /// External program used instead of the built-in converter.
    pub external_command: Option<ExternalCommand>,

    /// Height of the preview text area, in rows. Default: 15.
    pub preview_rows: u16,

    /// Whether the size comparison is shown unless the user opts out. Default: true.
    pub show_comparison: bool,

    /// Per-file progress events for batch conversion.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: 200 * 1024 * 1024,
            max_part_bytes: DEFAULT_MAX_PART_BYTES,
            clean_output: true,
            scratch_dir: None,
            external_command: None,
            preview_rows: 15,
            show_comparison: true,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ReaderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderConfig")
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("max_part_bytes", &self.max_part_bytes)
            .field("clean_output", &self.clean_output)
            .field("scratch_dir", &self.scratch_dir)
            .field("external_command", &self.external_command)
            .field("preview_rows", &self.preview_rows)
            .field("show_comparison", &self.show_comparison)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ReaderConfig {
    /// Create a new builder for `ReaderConfig`.
    pub fn builder() -> ReaderConfigBuilder {
        ReaderConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ReaderConfig`].
#[derive(Debug)]
pub struct ReaderConfigBuilder {
    config: ReaderConfig,
}

impl ReaderConfigBuilder {
    pub fn max_upload_bytes(mut self, bytes: usize) -> Self {
        self.config.max_upload_bytes = bytes;
        self
    }

    pub fn max_part_bytes(mut self, bytes: u64) -> Self {
        self.config.max_part_bytes = bytes;
        self
    }

    pub fn clean_output(mut self, v: bool) -> Self {
        self.config.clean_output = v;
        self
    }

    pub fn scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.scratch_dir = Some(dir.into());
        self
    }

    pub fn external_command(mut self, command: ExternalCommand) -> Self {
        self.config.external_command = Some(command);
        self
    }

    pub fn preview_rows(mut self, rows: u16) -> Self {
        self.config.preview_rows = rows.clamp(3, 200);
        self
    }

    pub fn show_comparison(mut self, v: bool) -> Self {
        self.config.show_comparison = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ReaderConfig, ReaderError> {
        let c = &self.config;
        if c.max_upload_bytes < MIN_UPLOAD_BYTES {
            return Err(ReaderError::InvalidConfig(format!(
                "max upload size must be at least {} bytes, got {}",
                MIN_UPLOAD_BYTES, c.max_upload_bytes
            )));
        }
        if c.max_part_bytes < MIN_UPLOAD_BYTES as u64 {
            return Err(ReaderError::InvalidConfig(format!(
                "max part size must be at least {} bytes, got {}",
                MIN_UPLOAD_BYTES, c.max_part_bytes
            )));
        }
        if let Some(ref cmd) = c.external_command {
            if cmd.program.trim().is_empty() {
                return Err(ReaderError::InvalidConfig(
                    "external converter program must not be empty".into(),
                ));
            }
        }
        if let Some(ref dir) = c.scratch_dir {
            if !dir.is_dir() {
                return Err(ReaderError::InvalidConfig(format!(
                    "scratch directory '{}' does not exist",
                    dir.display()
                )));
            }
        }
        Ok(self.config)
    }
}

/// An external program that converts a file path to Markdown on stdout,
/// e.g. `markitdown`.
///
/// The materialized input path is appended after `args`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ExternalCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Parse a shell-like command line split on whitespace:
    /// `"markitdown --keep-data-uris"`.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let program = parts.next()?;
        Some(Self {
            program: program.to_string(),
            args: parts.map(str::to_string).collect(),
        })
    }
}
