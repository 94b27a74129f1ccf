//! Materialization: stage upload bytes on disk for path-based converters.
//!
//! Tools like `markitdown` pick a parser from the file extension, so the
//! staged copy keeps the original extension as its suffix. The copy lives in
//! a [`NamedTempFile`] with a random infix, which gives every file in a batch
//! a distinct path and deletes it when dropped, including on early return or
//! panic.

use crate::error::ConvertError;
use crate::format::DocumentFormat;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Prefix shared by every staged file, so leftovers are easy to spot.
pub const SCRATCH_PREFIX: &str = "docreader-";

/// A staged copy of an upload. The file is removed when this is dropped.
#[derive(Debug)]
pub struct Materialized {
    file: NamedTempFile,
}

impl Materialized {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Remove the staged file now, logging rather than failing on error.
    ///
    /// Dropping has the same effect; this form reports what happened.
    pub fn release(self) {
        let path: PathBuf = self.file.path().to_path_buf();
        match self.file.close() {
            Ok(()) => debug!("Removed staged file {}", path.display()),
            Err(e) => warn!("Failed to remove staged file {}: {}", path.display(), e),
        }
    }
}

/// Write `bytes` to a fresh file in `dir` (system temp dir if `None`)
/// named `docreader-XXXXXX.<ext>`.
///
/// `<ext>` is the canonical extension of `format`, so an alias is staged
/// under its canonical name: `page.htm` becomes `docreader-XXXXXX.html`.
pub fn materialize(
    bytes: &[u8],
    format: DocumentFormat,
    dir: Option<&Path>,
) -> Result<Materialized, ConvertError> {
    let suffix = format!(".{}", format.extension());
    let mut builder = tempfile::Builder::new();
    builder.prefix(SCRATCH_PREFIX).suffix(&suffix);

    let mut file = match dir {
        Some(d) => builder.tempfile_in(d),
        None => builder.tempfile(),
    }
    .map_err(ConvertError::Materialize)?;

    file.write_all(bytes).map_err(ConvertError::Materialize)?;
    file.flush().map_err(ConvertError::Materialize)?;

    debug!("Staged {} bytes at {}", bytes.len(), file.path().display());
    Ok(Materialized { file })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn staged_file_keeps_extension_and_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let staged = materialize(b"%PDF-1.4", DocumentFormat::Pdf, Some(dir.path())).unwrap();

        let name = staged.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(SCRATCH_PREFIX), "got {name}");
        assert!(name.ends_with(".pdf"), "got {name}");
        assert_eq!(std::fs::read(staged.path()).unwrap(), b"%PDF-1.4");

        staged.release();
        assert_eq!(entries(dir.path()), 0);
    }

    #[test]
    fn drop_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        {
            let _staged = materialize(b"", DocumentFormat::Docx, Some(dir.path())).unwrap();
            assert_eq!(entries(dir.path()), 1);
        }
        assert_eq!(entries(dir.path()), 0);
    }

    #[test]
    fn paths_are_distinct() {
        let dir = tempfile::tempdir().unwrap();
        let a = materialize(b"a", DocumentFormat::Html, Some(dir.path())).unwrap();
        let b = materialize(b"b", DocumentFormat::Html, Some(dir.path())).unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn html_alias_is_staged_with_canonical_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let format = DocumentFormat::from_file_name("page.HTM").unwrap();
        let staged = materialize(b"<p>x</p>", format, Some(dir.path())).unwrap();
        assert_eq!(staged.path().extension().unwrap(), "html");
    }

    #[test]
    fn missing_dir_is_materialize_error() {
        let err =
            materialize(b"x", DocumentFormat::Pdf, Some(Path::new("/no/such/dir"))).unwrap_err();
        assert!(matches!(err, ConvertError::Materialize(_)));
    }
}
