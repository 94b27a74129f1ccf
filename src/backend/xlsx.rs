//! XLSX (Microsoft Excel) backend using calamine.
//!
//! Each worksheet becomes a `## <sheet name>` section followed by a pipe
//! table of its used range. The first row of the range is treated as the
//! header row, matching how most spreadsheets are laid out.
//!
//! calamine decompresses sheets itself, so the part cap is enforced on the
//! declared entry sizes before the workbook is handed over.

use super::ooxml::{pipe_table, Package};
use crate::error::ConvertError;
use calamine::{Data, Reader, Xlsx};
use std::io::Cursor;
use tracing::debug;

const LABEL: &str = "XLSX";

pub(crate) fn convert(bytes: &[u8], max_part_bytes: u64) -> Result<String, ConvertError> {
    Package::open(bytes, LABEL, max_part_bytes)?;
    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(bytes)).map_err(|e| ConvertError::corrupt(LABEL, e))?;

    let mut sections = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| ConvertError::corrupt(LABEL, format!("sheet '{name}': {e}")))?;

        let rows: Vec<Vec<String>> = range
            .rows()
            .map(|row| row.iter().map(cell_text).collect())
            .filter(|row: &Vec<String>| row.iter().any(|c| !c.is_empty()))
            .collect();
        debug!("XLSX sheet '{}': {} rows", name, rows.len());

        let mut section = format!("## {name}");
        let table = pipe_table(&rows);
        if !table.is_empty() {
            section.push_str("\n\n");
            section.push_str(&table);
        }
        sections.push(section);
    }

    Ok(sections.join("\n\n"))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_text_formats_values() {
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::String("Total".into())), "Total");
        assert_eq!(cell_text(&Data::Float(42.0)), "42");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::Bool(true)), "true");
    }

    #[test]
    fn garbage_is_corrupt() {
        let err = convert(b"definitely not a workbook", 1024).unwrap_err();
        assert!(matches!(err, ConvertError::Corrupt { format: "XLSX", .. }));
    }
}
