//! In-memory document fixtures shared by the integration tests.
//!
//! Office files are built as stored (uncompressed) zip archives holding only
//! the parts the readers look at. The one exception is [`docx_bomb`].

#![allow(dead_code)]

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const A_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const P_NS: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const S_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

pub fn zip_parts(parts: &[(&str, String)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, content) in parts {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn w_paragraph(style: Option<&str>, text: &str) -> String {
    let props = style
        .map(|s| format!(r#"<w:pPr><w:pStyle w:val="{s}"/></w:pPr>"#))
        .unwrap_or_default();
    format!(r#"<w:p>{props}<w:r><w:t xml:space="preserve">{text}</w:t></w:r></w:p>"#)
}

fn w_row(cells: &[&str]) -> String {
    let cells: String = cells
        .iter()
        .map(|c| format!("<w:tc>{}</w:tc>", w_paragraph(None, c)))
        .collect();
    format!("<w:tr>{cells}</w:tr>")
}

/// A Word document with a `Heading1` paragraph, body text and a two-row table.
pub fn docx_with_heading_and_table() -> Vec<u8> {
    let body = [
        w_paragraph(Some("Heading1"), "Quarterly Report"),
        w_paragraph(None, "Revenue grew in every region this quarter."),
        format!(
            "<w:tbl><w:tblPr><w:tblStyle w:val=\"TableGrid\"/></w:tblPr>{}{}</w:tbl>",
            w_row(&["Region", "Revenue"]),
            w_row(&["North", "1200"])
        ),
        r#"<w:sectPr><w:pgSz w:w="12240" w:h="15840"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440"/></w:sectPr>"#.to_string(),
    ]
    .concat();
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{W_NS}"><w:body>{body}</w:body></w:document>"#
    );
    zip_parts(&[("word/document.xml", document)])
}

fn inline_cell(reference: &str, text: &str) -> String {
    format!(r#"<c r="{reference}" t="inlineStr"><is><t>{text}</t></is></c>"#)
}

/// A workbook with one sheet named `Budget`: a header row and one data row.
pub fn xlsx_budget() -> Vec<u8> {
    let workbook = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="{S_NS}" xmlns:r="{R_NS}"><sheets><sheet name="Budget" sheetId="1" r:id="rId1"/></sheets></workbook>"#
    );
    let rels = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="{PKG_REL_NS}"><Relationship Id="rId1" Type="{R_NS}/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#
    );
    let sheet = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="{S_NS}"><dimension ref="A1:B2"/><sheetData><row r="1">{}{}</row><row r="2">{}<c r="B2"><v>250</v></c></row></sheetData></worksheet>"#,
        inline_cell("A1", "Item"),
        inline_cell("B1", "Cost"),
        inline_cell("A2", "Paper"),
    );
    zip_parts(&[
        ("xl/workbook.xml", workbook),
        ("xl/_rels/workbook.xml.rels", rels),
        ("xl/worksheets/sheet1.xml", sheet),
    ])
}

fn slide(shapes: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld xmlns:p="{P_NS}" xmlns:a="{A_NS}"><p:cSld><p:spTree>{shapes}</p:spTree></p:cSld></p:sld>"#
    )
}

fn text_shape(placeholder: Option<&str>, text: &str) -> String {
    let ph = placeholder
        .map(|t| format!(r#"<p:nvSpPr><p:nvPr><p:ph type="{t}"/></p:nvPr></p:nvSpPr>"#))
        .unwrap_or_default();
    format!(r#"<p:sp>{ph}<p:txBody><a:p><a:r><a:t>{text}</a:t></a:r></a:p></p:txBody></p:sp>"#)
}

/// A deck with slides 1, 2 and 10 (stored out of order) and speaker notes
/// on slide 1.
pub fn pptx_deck() -> Vec<u8> {
    let notes_rels = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="{PKG_REL_NS}"><Relationship Id="rId2" Type="{R_NS}/notesSlide" Target="../notesSlides/notesSlide1.xml"/></Relationships>"#
    );
    let notes = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:notes xmlns:p="{P_NS}" xmlns:a="{A_NS}"><p:cSld><p:spTree>{}</p:spTree></p:cSld></p:notes>"#,
        text_shape(Some("body"), "Remember to thank the team")
    );
    zip_parts(&[
        (
            "ppt/slides/slide10.xml",
            slide(&text_shape(Some("title"), "Appendix")),
        ),
        (
            "ppt/slides/slide1.xml",
            slide(&format!(
                "{}{}",
                text_shape(Some("ctrTitle"), "Launch Plan"),
                text_shape(None, "Ship in spring")
            )),
        ),
        (
            "ppt/slides/slide2.xml",
            slide(&text_shape(Some("title"), "Timeline")),
        ),
        ("ppt/slides/_rels/slide1.xml.rels", notes_rels),
        ("ppt/notesSlides/notesSlide1.xml", notes),
    ])
}

/// A DOCX whose `word/document.xml` is `expanded_bytes` of one repeated
/// character, deflated down to a tiny upload.
pub fn docx_bomb(expanded_bytes: usize) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    writer.start_file("word/document.xml", options).unwrap();
    let chunk = vec![b'a'; 64 * 1024];
    for _ in 0..expanded_bytes / chunk.len() {
        writer.write_all(&chunk).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Bytes that are not a zip archive at all.
pub fn corrupt_office_bytes() -> Vec<u8> {
    b"this is not an office document".to_vec()
}

pub fn html_page(body: &str) -> Vec<u8> {
    format!("<!DOCTYPE html><html><head><title>t</title></head><body>{body}</body></html>")
        .into_bytes()
}
