//! DOCX (Microsoft Word) backend.
//!
//! Reads `word/document.xml` and walks the body in order:
//!
//! - paragraphs with a `Title`/`Subtitle`/`HeadingN` style become `#` headings
//! - paragraphs with numbering properties become `- ` list items
//! - `w:tbl` becomes a GFM pipe table, first row as header
//! - content controls (`w:sdt`) are unwrapped
//!
//! Styles, numbering definitions and images are not consulted.

use super::ooxml::{self, pipe_table, Package, W_NS};
use crate::error::ConvertError;
use roxmltree::Node;
use tracing::debug;

const LABEL: &str = "DOCX";

#[derive(Debug, PartialEq)]
enum Block {
    Paragraph(String),
    Heading(usize, String),
    ListItem(String),
    Table(String),
}

pub(crate) fn convert(bytes: &[u8], max_part_bytes: u64) -> Result<String, ConvertError> {
    let mut package = Package::open(bytes, LABEL, max_part_bytes)?;
    let xml = package.require_part("word/document.xml")?;
    let doc = ooxml::parse_xml(&xml, LABEL)?;

    let body = doc
        .descendants()
        .find(|n| n.has_tag_name((W_NS, "body")))
        .ok_or_else(|| ConvertError::corrupt(LABEL, "document has no body"))?;

    let mut blocks = Vec::new();
    walk_blocks(body, &mut blocks);
    debug!("DOCX: {} blocks", blocks.len());
    Ok(render(&blocks))
}

fn walk_blocks(parent: Node<'_, '_>, out: &mut Vec<Block>) {
    for child in parent.children().filter(|n| is_w(*n)) {
        match child.tag_name().name() {
            "p" => {
                if let Some(block) = paragraph_block(child) {
                    out.push(block);
                }
            }
            "tbl" => {
                let table = table_markdown(child);
                if !table.is_empty() {
                    out.push(Block::Table(table));
                }
            }
            "sdt" => {
                if let Some(content) = child_w(child, "sdtContent") {
                    walk_blocks(content, out);
                }
            }
            _ => {}
        }
    }
}

fn paragraph_block(p: Node<'_, '_>) -> Option<Block> {
    let text = paragraph_text(p);
    if text.trim().is_empty() {
        return None;
    }

    let props = child_w(p, "pPr");
    let style = props
        .and_then(|pr| child_w(pr, "pStyle"))
        .and_then(|s| s.attribute((W_NS, "val")))
        .unwrap_or("");

    if let Some(level) = heading_level(style) {
        let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
        return Some(Block::Heading(level, flat));
    }

    let numbered = props.and_then(|pr| child_w(pr, "numPr")).is_some();
    if numbered || style.to_ascii_lowercase().starts_with("listbullet") {
        return Some(Block::ListItem(text.trim().to_string()));
    }

    Some(Block::Paragraph(text.trim().to_string()))
}

/// Text of one paragraph: runs, tabs and line breaks in document order.
fn paragraph_text(p: Node<'_, '_>) -> String {
    let mut text = String::new();
    for n in p.descendants().filter(|n| is_w(*n)) {
        match n.tag_name().name() {
            "t" => text.push_str(n.text().unwrap_or("")),
            "tab" if n.parent().is_some_and(|r| r.has_tag_name((W_NS, "r"))) => text.push('\t'),
            "br" | "cr" => text.push('\n'),
            _ => {}
        }
    }
    text
}

fn table_markdown(tbl: Node<'_, '_>) -> String {
    let rows: Vec<Vec<String>> = tbl
        .children()
        .filter(|n| n.has_tag_name((W_NS, "tr")))
        .map(|tr| {
            tr.children()
                .filter(|n| n.has_tag_name((W_NS, "tc")))
                .map(cell_text)
                .collect()
        })
        .collect();
    pipe_table(&rows)
}

fn cell_text(tc: Node<'_, '_>) -> String {
    let mut parts = Vec::new();
    for child in tc.children().filter(|n| is_w(*n)) {
        match child.tag_name().name() {
            "p" => parts.push(paragraph_text(child)),
            "tbl" => parts.push(ooxml::collect_text(child, W_NS)),
            _ => {}
        }
    }
    parts
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Heading level for a paragraph style id such as `Heading2` or `heading 2`.
fn heading_level(style: &str) -> Option<usize> {
    let s = style.to_ascii_lowercase().replace(' ', "");
    match s.as_str() {
        "title" => Some(1),
        "subtitle" => Some(2),
        _ => s
            .strip_prefix("heading")
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|n| *n >= 1)
            .map(|n| n.min(6)),
    }
}

fn render(blocks: &[Block]) -> String {
    let mut out = String::new();
    let mut prev_list = false;
    for block in blocks {
        let is_list = matches!(block, Block::ListItem(_));
        if !out.is_empty() {
            out.push_str(if is_list && prev_list { "\n" } else { "\n\n" });
        }
        match block {
            Block::Paragraph(t) => out.push_str(t),
            Block::Heading(level, t) => {
                out.push_str(&"#".repeat(*level));
                out.push(' ');
                out.push_str(t);
            }
            Block::ListItem(t) => {
                out.push_str("- ");
                out.push_str(t);
            }
            Block::Table(t) => out.push_str(t),
        }
        prev_list = is_list;
    }
    out
}

fn is_w(n: Node<'_, '_>) -> bool {
    n.is_element() && n.tag_name().namespace() == Some(W_NS)
}

fn child_w<'a, 'i>(n: Node<'a, 'i>, name: &str) -> Option<Node<'a, 'i>> {
    n.children().find(|c| c.has_tag_name((W_NS, name)))
}
