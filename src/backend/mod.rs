//! Converter backends: bytes of a known format in, Markdown text out.
//!
//! ## Why a trait?
//!
//! The handler never cares *how* a document is decoded. It holds one
//! `Arc<dyn DocumentConverter>` built at startup and calls it for every file.
//! Tests inject stubs, and deployments that prefer an external tool swap in
//! [`ExternalCommandConverter`] without touching the handler.
//!
//! ## Built-in backends
//!
//! | Format | Crate | Output |
//! |--------|-------|--------|
//! | DOCX | zip + roxmltree | headings, paragraphs, lists, pipe tables |
//! | XLSX | calamine | `## sheet` + pipe table per worksheet |
//! | PPTX | zip + roxmltree | slide markers, titles, text, tables, notes |
//! | PDF  | pdf-extract | page text as paragraphs |
//! | HTML | html2md | Markdown |

pub mod external;

mod docx;
mod html;
mod ooxml;
mod pdf;
mod pptx;
mod xlsx;

pub use external::ExternalCommandConverter;

use crate::error::ConvertError;
use crate::format::DocumentFormat;
use serde::{Deserialize, Serialize};

/// What a converter hands back: the document as one Markdown-flavoured text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDocument {
    pub text_content: String,
}

impl ParsedDocument {
    pub fn new(text_content: impl Into<String>) -> Self {
        Self {
            text_content: text_content.into(),
        }
    }
}

/// A stateless capability that turns document bytes into text.
///
/// Implementations must be safe to share across concurrent requests and must
/// not keep per-call state.
pub trait DocumentConverter: Send + Sync {
    /// Convert `bytes`, declared to be `format`, into text.
    fn convert(&self, bytes: &[u8], format: DocumentFormat)
        -> Result<ParsedDocument, ConvertError>;

    /// Short name for logs.
    fn name(&self) -> &str;

    /// Whether this converter stages the bytes on disk before running.
    fn requires_path(&self) -> bool {
        false
    }
}

/// Default cap on the decompressed size of one part of an Office archive.
pub const DEFAULT_MAX_PART_BYTES: u64 = 256 * 1024 * 1024;

/// The default in-memory converter.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinConverter {
    max_part_bytes: u64,
}

impl Default for BuiltinConverter {
    fn default() -> Self {
        Self {
            max_part_bytes: DEFAULT_MAX_PART_BYTES,
        }
    }
}

impl BuiltinConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap how far any single DOCX/XLSX/PPTX part may decompress.
    ///
    /// A few hundred KB of deflated zeros can expand to gigabytes, so the
    /// upload limit alone does not bound memory.
    pub fn with_max_part_bytes(mut self, bytes: u64) -> Self {
        self.max_part_bytes = bytes;
        self
    }
}

impl DocumentConverter for BuiltinConverter {
    fn convert(
        &self,
        bytes: &[u8],
        format: DocumentFormat,
    ) -> Result<ParsedDocument, ConvertError> {
        if bytes.is_empty() {
            return Err(ConvertError::EmptyInput);
        }
        let text = match format {
            DocumentFormat::Docx => docx::convert(bytes, self.max_part_bytes)?,
            DocumentFormat::Xlsx => xlsx::convert(bytes, self.max_part_bytes)?,
            DocumentFormat::Pptx => pptx::convert(bytes, self.max_part_bytes)?,
            DocumentFormat::Pdf => pdf::convert(bytes)?,
            DocumentFormat::Html => html::convert(bytes)?,
        };
        Ok(ParsedDocument::new(text))
    }

    fn name(&self) -> &str {
        "builtin"
    }
}
