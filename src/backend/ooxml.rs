//! Shared helpers for Office Open XML containers and Markdown tables.
//!
//! DOCX and PPTX files are ZIP archives of XML parts. The zip crate opens
//! the container and roxmltree parses each part; the backends only walk the
//! resulting trees.

use crate::error::ConvertError;
use std::io::{Cursor, Read};
use zip::result::ZipError;
use zip::ZipArchive;

pub(crate) const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub(crate) const A_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub(crate) const P_NS: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
pub(crate) const REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// An opened OOXML container with a cap on how far any one part may expand.
///
/// The cap is checked twice: against each entry's declared size when the
/// archive is opened, and while streaming a part, since the declared size is
/// only a claim made by the uploader.
pub(crate) struct Package<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
    label: &'static str,
    max_part_bytes: u64,
}

impl<'a> Package<'a> {
    pub(crate) fn open(
        bytes: &'a [u8],
        label: &'static str,
        max_part_bytes: u64,
    ) -> Result<Self, ConvertError> {
        let mut archive =
            ZipArchive::new(Cursor::new(bytes)).map_err(|e| ConvertError::corrupt(label, e))?;

        for i in 0..archive.len() {
            let entry = archive
                .by_index_raw(i)
                .map_err(|e| ConvertError::corrupt(label, e))?;
            if entry.size() > max_part_bytes {
                return Err(ConvertError::PartTooLarge {
                    format: label,
                    part: entry.name().to_string(),
                    limit: max_part_bytes,
                });
            }
        }

        Ok(Self {
            archive,
            label,
            max_part_bytes,
        })
    }

    pub(crate) fn file_names(&self) -> Vec<&str> {
        self.archive.file_names().collect()
    }

    /// Read a part as UTF-8 text; `Ok(None)` if the archive has no such part.
    pub(crate) fn read_part(&mut self, name: &str) -> Result<Option<String>, ConvertError> {
        let label = self.label;
        let limit = self.max_part_bytes;
        let entry = match self.archive.by_name(name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(ConvertError::corrupt(label, e)),
        };

        let mut buf = Vec::new();
        entry
            .take(limit.saturating_add(1))
            .read_to_end(&mut buf)
            .map_err(|e| ConvertError::corrupt(label, format!("{name}: {e}")))?;
        if buf.len() as u64 > limit {
            return Err(ConvertError::PartTooLarge {
                format: label,
                part: name.to_string(),
                limit,
            });
        }

        String::from_utf8(buf)
            .map(Some)
            .map_err(|e| ConvertError::corrupt(label, format!("{name}: {e}")))
    }

    /// Read a part that must exist.
    pub(crate) fn require_part(&mut self, name: &str) -> Result<String, ConvertError> {
        self.read_part(name)?
            .ok_or_else(|| ConvertError::corrupt(self.label, format!("missing part {name}")))
    }
}

pub(crate) fn parse_xml<'x>(
    xml: &'x str,
    label: &'static str,
) -> Result<roxmltree::Document<'x>, ConvertError> {
    roxmltree::Document::parse(xml).map_err(|e| ConvertError::corrupt(label, e))
}

/// Concatenated text of every `<ns:t>` below `node`, in document order.
pub(crate) fn collect_text(node: roxmltree::Node<'_, '_>, ns: &str) -> String {
    node.descendants()
        .filter(|n| n.has_tag_name((ns, "t")))
        .filter_map(|n| n.text())
        .collect()
}

// ── Markdown tables ──────────────────────────────────────────────────────

/// Render rows as a GFM pipe table; the first row is the header.
///
/// Ragged rows are padded to the widest row. Returns an empty string when
/// there are no rows.
pub(crate) fn pipe_table(rows: &[Vec<String>]) -> String {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return String::new();
    }

    let render_row = |row: &[String]| -> String {
        let mut line = String::from("|");
        for i in 0..width {
            let cell = row.get(i).map(String::as_str).unwrap_or("");
            line.push(' ');
            line.push_str(&escape_cell(cell));
            line.push_str(" |");
        }
        line
    };

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(render_row(&rows[0]));
    lines.push(format!("|{}", " --- |".repeat(width)));
    for row in &rows[1..] {
        lines.push(render_row(row));
    }
    lines.join("\n")
}

/// Cells are single-line; pipes are escaped so they don't split the cell.
fn escape_cell(cell: &str) -> String {
    cell.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "\\|")
}
