//! PPTX (Microsoft PowerPoint) backend.
//!
//! Slides are read from `ppt/slides/slideN.xml` in numeric order. Each slide
//! is introduced by an HTML comment carrying its number, then:
//!
//! - title placeholders (`title`, `ctrTitle`) become a `#` heading
//! - other text paragraphs become lines of text
//! - tables in graphic frames become pipe tables
//! - group shapes are flattened in place
//! - speaker notes, found through the slide's relationships, follow under
//!   `### Notes:`

use super::ooxml::{self, pipe_table, Package, A_NS, P_NS, REL_NS};
use crate::error::ConvertError;
use roxmltree::Node;
use tracing::debug;

const LABEL: &str = "PPTX";
const NOTES_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide";

pub(crate) fn convert(bytes: &[u8], max_part_bytes: u64) -> Result<String, ConvertError> {
    let mut package = Package::open(bytes, LABEL, max_part_bytes)?;

    let mut slides: Vec<(usize, String)> = package
        .file_names()
        .into_iter()
        .filter_map(|name| slide_number(name).map(|n| (n, name.to_string())))
        .collect();
    if slides.is_empty() {
        return Err(ConvertError::corrupt(LABEL, "presentation has no slides"));
    }
    slides.sort_by_key(|(n, _)| *n);

    let mut out = Vec::with_capacity(slides.len());
    for (number, part) in &slides {
        let xml = package.require_part(part)?;
        let doc = ooxml::parse_xml(&xml, LABEL)?;

        let mut section = format!("<!-- Slide number: {number} -->");
        for block in slide_blocks(doc.root_element()) {
            section.push('\n');
            section.push_str(&block);
        }

        if let Some(notes) = slide_notes(&mut package, *number)? {
            section.push_str("\n\n### Notes:\n");
            section.push_str(&notes);
        }
        out.push(section);
    }

    debug!("PPTX: {} slides", slides.len());
    Ok(out.join("\n\n"))
}

/// `ppt/slides/slide12.xml` → 12. Layouts, masters and rels don't match.
fn slide_number(part: &str) -> Option<usize> {
    part.strip_prefix("ppt/slides/slide")?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

/// Markdown blocks for every shape in the slide's shape tree, in order.
fn slide_blocks(root: Node<'_, '_>) -> Vec<String> {
    let mut blocks = Vec::new();
    if let Some(tree) = root.descendants().find(|n| n.has_tag_name((P_NS, "spTree"))) {
        walk_shapes(tree, &mut blocks);
    }
    blocks
}

fn walk_shapes(parent: Node<'_, '_>, out: &mut Vec<String>) {
    for shape in parent.children().filter(|n| n.is_element()) {
        if shape.tag_name().namespace() != Some(P_NS) {
            continue;
        }
        match shape.tag_name().name() {
            "sp" => {
                let lines = paragraphs(shape);
                if lines.is_empty() {
                    continue;
                }
                if is_title(shape) {
                    out.push(format!("# {}", lines.join(" ")));
                } else {
                    out.push(lines.join("\n"));
                }
            }
            "graphicFrame" => {
                if let Some(tbl) = shape.descendants().find(|n| n.has_tag_name((A_NS, "tbl"))) {
                    let table = table_markdown(tbl);
                    if !table.is_empty() {
                        out.push(table);
                    }
                }
            }
            "grpSp" => walk_shapes(shape, out),
            _ => {}
        }
    }
}

/// Non-empty text paragraphs of a shape's text body.
fn paragraphs(shape: Node<'_, '_>) -> Vec<String> {
    shape
        .descendants()
        .filter(|n| n.has_tag_name((A_NS, "p")))
        .map(|p| ooxml::collect_text(p, A_NS).trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn is_title(shape: Node<'_, '_>) -> bool {
    shape
        .descendants()
        .find(|n| n.has_tag_name((P_NS, "ph")))
        .and_then(|ph| ph.attribute("type"))
        .is_some_and(|t| t == "title" || t == "ctrTitle")
}

fn table_markdown(tbl: Node<'_, '_>) -> String {
    let rows: Vec<Vec<String>> = tbl
        .children()
        .filter(|n| n.has_tag_name((A_NS, "tr")))
        .map(|tr| {
            tr.children()
                .filter(|n| n.has_tag_name((A_NS, "tc")))
                .map(|tc| ooxml::collect_text(tc, A_NS))
                .collect()
        })
        .collect();
    pipe_table(&rows)
}

/// Speaker notes for slide `number`, resolved through its `.rels` part.
fn slide_notes(package: &mut Package<'_>, number: usize) -> Result<Option<String>, ConvertError> {
    let rels_part = format!("ppt/slides/_rels/slide{number}.xml.rels");
    let Some(rels_xml) = package.read_part(&rels_part)? else {
        return Ok(None);
    };
    let rels = ooxml::parse_xml(&rels_xml, LABEL)?;

    let target = rels
        .descendants()
        .filter(|n| n.has_tag_name((REL_NS, "Relationship")))
        .find(|n| n.attribute("Type") == Some(NOTES_REL_TYPE))
        .and_then(|n| n.attribute("Target"));
    let Some(target) = target else {
        return Ok(None);
    };

    let notes_part = resolve_target("ppt/slides", target);
    let Some(notes_xml) = package.read_part(&notes_part)? else {
        return Ok(None);
    };
    let notes = ooxml::parse_xml(&notes_xml, LABEL)?;

    // Only the body placeholder holds the notes; the rest is the slide image
    // and the slide number.
    let text: Vec<String> = notes
        .descendants()
        .filter(|n| n.has_tag_name((P_NS, "sp")))
        .filter(|sp| {
            sp.descendants()
                .find(|n| n.has_tag_name((P_NS, "ph")))
                .and_then(|ph| ph.attribute("type"))
                == Some("body")
        })
        .flat_map(paragraphs)
        .collect();

    Ok((!text.is_empty()).then(|| text.join("\n")))
}

/// Resolve a relationship target like `../notesSlides/notesSlide1.xml`
/// against the directory of the source part.
fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut parts: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            ".." => {
                parts.pop();
            }
            "." | "" => {}
            s => parts.push(s),
        }
    }
    parts.join("/")
}
