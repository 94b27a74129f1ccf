//! Supported document formats and extension-based detection.
//!
//! Format is declared by the file name, never sniffed from content: a
//! `.pptx` that is really a `.docx` is converted as a presentation and fails
//! as one.

use crate::error::ConvertError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// A document format the reader accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Docx,
    Xlsx,
    Pptx,
    Pdf,
    Html,
}

impl DocumentFormat {
    /// Every accepted format, in the order shown to users.
    pub const ALL: [DocumentFormat; 5] = [
        DocumentFormat::Docx,
        DocumentFormat::Xlsx,
        DocumentFormat::Pptx,
        DocumentFormat::Pdf,
        DocumentFormat::Html,
    ];

    /// Canonical extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Docx => "docx",
            DocumentFormat::Xlsx => "xlsx",
            DocumentFormat::Pptx => "pptx",
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Html => "html",
        }
    }

    /// Short human label used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            DocumentFormat::Docx => "DOCX",
            DocumentFormat::Xlsx => "XLSX",
            DocumentFormat::Pptx => "PPTX",
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Html => "HTML",
        }
    }

    /// Map an extension (with or without dot, any case) to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "docx" => Some(DocumentFormat::Docx),
            "xlsx" => Some(DocumentFormat::Xlsx),
            "pptx" => Some(DocumentFormat::Pptx),
            "pdf" => Some(DocumentFormat::Pdf),
            "html" | "htm" => Some(DocumentFormat::Html),
            _ => None,
        }
    }

    /// Detect the format from a file name's last extension.
    pub fn from_file_name(name: &str) -> Result<Self, ConvertError> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        Self::from_extension(ext).ok_or_else(|| ConvertError::UnsupportedFormat {
            extension: ext.to_string(),
            expected: Self::accept_list(", "),
        })
    }

    /// `.docx<sep>.xlsx<sep>…`, e.g. for an `<input accept>` attribute.
    pub fn accept_list(sep: &str) -> String {
        Self::ALL
            .iter()
            .map(|f| format!(".{}", f.extension()))
            .collect::<Vec<_>>()
            .join(sep)
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
