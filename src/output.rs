//! Conversion results, size statistics and download artifacts.

use crate::error::{ConversionFailed, ReaderError};
use crate::format::DocumentFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// A successfully converted file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    /// Name of the uploaded file.
    pub file_name: String,
    /// Format the file was converted as.
    pub format: DocumentFormat,
    /// Normalised Markdown text.
    pub text_content: String,
    /// Byte length of the uploaded file.
    pub original_size_bytes: u64,
    /// Byte length of `text_content` encoded as UTF-8.
    pub converted_size_bytes: u64,
}

impl ConversionResult {
    /// Build a result; the converted size is always derived from the text.
    pub fn new(
        file_name: impl Into<String>,
        format: DocumentFormat,
        original_size_bytes: u64,
        text_content: String,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            format,
            converted_size_bytes: text_content.len() as u64,
            text_content,
            original_size_bytes,
        }
    }

    /// `(original − converted) / original × 100`, or `None` for an empty original.
    pub fn reduction_pct(&self) -> Option<f64> {
        reduction_pct(self.original_size_bytes, self.converted_size_bytes)
    }

    pub fn size_report(&self) -> SizeReport {
        SizeReport::new(self.original_size_bytes, self.converted_size_bytes)
    }

    /// The `.md` and `.txt` downloads, in that order. Both carry the same bytes.
    pub fn downloads(&self) -> [Download; 2] {
        [
            Download::new(&self.file_name, DownloadFormat::Markdown, &self.text_content),
            Download::new(&self.file_name, DownloadFormat::PlainText, &self.text_content),
        ]
    }

    /// Write both downloads into `dir`, returning their paths.
    pub fn write_downloads(&self, dir: &Path) -> Result<Vec<PathBuf>, ReaderError> {
        self.downloads().iter().map(|d| d.write_to(dir)).collect()
    }
}

/// Outcome of one file in a batch.
#[derive(Debug, Clone)]
pub enum FileOutcome {
    Converted(ConversionResult),
    Failed(ConversionFailed),
}

impl FileOutcome {
    pub fn file_name(&self) -> &str {
        match self {
            FileOutcome::Converted(r) => &r.file_name,
            FileOutcome::Failed(e) => &e.file_name,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FileOutcome::Converted(_))
    }

    pub fn as_result(&self) -> Option<&ConversionResult> {
        match self {
            FileOutcome::Converted(r) => Some(r),
            FileOutcome::Failed(_) => None,
        }
    }

    /// Flatten into the serialisable report used by the JSON API and CLI.
    pub fn report(&self) -> OutcomeReport {
        match self {
            FileOutcome::Converted(r) => OutcomeReport {
                file_name: r.file_name.clone(),
                status: OutcomeStatus::Converted,
                format: Some(r.format),
                text_content: Some(r.text_content.clone()),
                original_size_bytes: Some(r.original_size_bytes),
                converted_size_bytes: Some(r.converted_size_bytes),
                reduction_pct: r.reduction_pct(),
                downloads: r
                    .downloads()
                    .iter()
                    .map(|d| DownloadInfo {
                        file_name: d.file_name.clone(),
                        mime: d.format.mime().to_string(),
                    })
                    .collect(),
                error: None,
            },
            FileOutcome::Failed(e) => OutcomeReport {
                file_name: e.file_name.clone(),
                status: OutcomeStatus::Failed,
                format: None,
                text_content: None,
                original_size_bytes: None,
                converted_size_bytes: None,
                reduction_pct: None,
                downloads: Vec::new(),
                error: Some(e.to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Converted,
    Failed,
}

/// Serialisable view of a [`FileOutcome`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeReport {
    pub file_name: String,
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<DocumentFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converted_size_bytes: Option<u64>,
    pub reduction_pct: Option<f64>,
    #[serde(default)]
    pub downloads: Vec<DownloadInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadInfo {
    pub file_name: String,
    pub mime: String,
}

// ── Size comparison ──────────────────────────────────────────────────────

/// Guarded reduction percentage.
pub fn reduction_pct(original: u64, converted: u64) -> Option<f64> {
    if original == 0 {
        return None;
    }
    Some((original as f64 - converted as f64) / original as f64 * 100.0)
}

/// One row of the comparison table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeRow {
    pub label: &'static str,
    pub bytes: u64,
    /// Size in MB, formatted to the row's precision.
    pub megabytes: String,
}

/// Original vs converted sizes, as shown under each preview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeReport {
    pub rows: Vec<SizeRow>,
    pub reduction_pct: Option<f64>,
}

impl SizeReport {
    pub fn new(original: u64, converted: u64) -> Self {
        let row = |label, bytes, decimals: usize| SizeRow {
            label,
            bytes,
            megabytes: format!("{:.*}", decimals, bytes as f64 / BYTES_PER_MB),
        };
        Self {
            rows: vec![
                row("Original File", original, 2),
                row("Converted Markdown", converted, 4),
                row("Converted Plain Text", converted, 4),
            ],
            reduction_pct: reduction_pct(original, converted),
        }
    }

    /// One-line summary of the reduction.
    pub fn summary(&self) -> String {
        match self.reduction_pct {
            None => "Size reduction: N/A (original file is empty).".to_string(),
            Some(pct) if pct >= 0.0 => {
                format!("Text is {:.1}% smaller than the original file.", pct)
            }
            Some(pct) => format!("Text is {:.1}% larger than the original file.", -pct),
        }
    }
}

// ── Downloads ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DownloadFormat {
    #[serde(rename = "md")]
    Markdown,
    #[serde(rename = "txt")]
    PlainText,
}

impl DownloadFormat {
    pub fn extension(self) -> &'static str {
        match self {
            DownloadFormat::Markdown => "md",
            DownloadFormat::PlainText => "txt",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            DownloadFormat::Markdown => "text/markdown",
            DownloadFormat::PlainText => "text/plain",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "md" | "markdown" => Some(DownloadFormat::Markdown),
            "txt" | "text" => Some(DownloadFormat::PlainText),
            _ => None,
        }
    }
}

/// A downloadable copy of the converted text.
#[derive(Debug, Clone, PartialEq)]
pub struct Download {
    pub file_name: String,
    pub format: DownloadFormat,
    pub bytes: Vec<u8>,
}

impl Download {
    pub fn new(original_name: &str, format: DownloadFormat, text: &str) -> Self {
        Self {
            file_name: download_file_name(original_name, format),
            format,
            bytes: text.as_bytes().to_vec(),
        }
    }

    /// Write into `dir` under [`Download::file_name`].
    ///
    /// Uses atomic write (temp file + rename) so a reader never sees a
    /// partial file.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, ReaderError> {
        let path = dir.join(&self.file_name);
        let write_err = |source: std::io::Error| ReaderError::OutputWriteFailed {
            path: path.clone(),
            source,
        };

        std::fs::create_dir_all(dir).map_err(write_err)?;
        let tmp_path = dir.join(format!(".{}.tmp", self.file_name));
        std::fs::write(&tmp_path, &self.bytes).map_err(write_err)?;
        std::fs::rename(&tmp_path, &path).map_err(write_err)?;

        debug!("Wrote {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// The original name without its last extension: `report.v2.docx` → `report.v2`.
pub fn base_name(original_name: &str) -> &str {
    let file = Path::new(original_name)
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or(original_name);
    match file.rfind('.') {
        Some(0) | None => file,
        Some(i) => &file[..i],
    }
}

/// `<base>_converted.<ext>`.
pub fn download_file_name(original_name: &str, format: DownloadFormat) -> String {
    format!("{}_converted.{}", base_name(original_name), format.extension())
}
