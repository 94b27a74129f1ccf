//! Upload intake: the in-memory file a user submitted.
//!
//! Browser uploads arrive as multipart parts; CLI input arrives as local
//! paths. Both end up as an [`UploadedFile`] so the handler sees one shape.

use crate::error::{ConvertError, ReaderError};
use crate::format::DocumentFormat;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A file as submitted: its name and raw bytes.
///
/// Owned by the handler invocation that received it and dropped after
/// processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a local file, keeping only its file name.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ReaderError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| read_error(path.to_path_buf(), e))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        debug!("Read {} ({} bytes)", path.display(), bytes.len());
        Ok(Self { name, bytes })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Format declared by the file name.
    pub fn format(&self) -> Result<DocumentFormat, ConvertError> {
        DocumentFormat::from_file_name(&self.name)
    }
}

fn read_error(path: PathBuf, e: std::io::Error) -> ReaderError {
    match e.kind() {
        std::io::ErrorKind::NotFound => ReaderError::FileNotFound { path },
        std::io::ErrorKind::PermissionDenied => ReaderError::PermissionDenied { path },
        _ => ReaderError::Internal(format!("reading {}: {}", path.display(), e)),
    }
}
