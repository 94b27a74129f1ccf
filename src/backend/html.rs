//! HTML backend: html2md does the conversion.
//!
//! Uploads are not guaranteed to be UTF-8; invalid sequences are replaced
//! rather than rejected.

use crate::error::ConvertError;

pub(crate) fn convert(bytes: &[u8]) -> Result<String, ConvertError> {
    let html = String::from_utf8_lossy(bytes);
    let html = html.strip_prefix('\u{feff}').unwrap_or(&html);
    Ok(html2md::parse_html(html))
}
