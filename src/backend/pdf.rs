//! PDF backend: text extraction with pdf-extract.
//!
//! pdf-extract emits a form feed between pages; those become paragraph
//! breaks. The library can panic on some malformed files, which the
//! conversion handler catches and reports as a failure for that file.

use crate::error::ConvertError;
use tracing::debug;

const LABEL: &str = "PDF";

pub(crate) fn convert(bytes: &[u8]) -> Result<String, ConvertError> {
    if !bytes.starts_with(b"%PDF-") {
        return Err(ConvertError::corrupt(LABEL, "missing %PDF- header"));
    }

    let raw =
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| ConvertError::corrupt(LABEL, e))?;
    let pages = split_pages(&raw);
    debug!("PDF: {} pages with text", pages.len());
    Ok(pages.join("\n\n"))
}

/// Split extracted text on form feeds, dropping pages with no text.
fn split_pages(raw: &str) -> Vec<&str> {
    raw.split('\u{c}')
        .map(str::trim)
        .filter(|page| !page.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_are_split_on_form_feed() {
        assert_eq!(
            split_pages("  first page\n\u{c}\n\u{c}second page  "),
            vec!["first page", "second page"]
        );
    }

    #[test]
    fn non_pdf_bytes_are_corrupt() {
        let err = convert(b"<html>not a pdf</html>").unwrap_err();
        assert!(matches!(err, ConvertError::Corrupt { format: "PDF", .. }));
    }
}
