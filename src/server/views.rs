//! askama page templates and the plain view models they render.
//!
//! Everything a template prints is computed here, so the templates only
//! loop and branch.

use super::error::human_size;
use crate::format::DocumentFormat;
use crate::output::{FileOutcome, SizeRow};
use askama::Template;
use base64::{engine::general_purpose::URL_SAFE, Engine as _};

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub accept: String,
    pub formats: String,
    pub compare_checked: bool,
    pub max_upload: String,
}

impl IndexTemplate {
    pub fn new(show_comparison: bool, max_upload_bytes: usize) -> Self {
        Self {
            accept: DocumentFormat::accept_list(","),
            formats: DocumentFormat::ALL
                .iter()
                .map(|f| f.label())
                .collect::<Vec<_>>()
                .join(", "),
            compare_checked: show_comparison,
            max_upload: human_size(max_upload_bytes),
        }
    }
}

#[derive(Template)]
#[template(path = "results.html")]
pub struct ResultsTemplate {
    pub items: Vec<OutcomeView>,
    pub converted: usize,
    pub total: usize,
    pub compare: bool,
    pub preview_rows: u16,
}

impl ResultsTemplate {
    pub fn new(outcomes: &[FileOutcome], compare: bool, preview_rows: u16) -> Self {
        Self {
            items: outcomes.iter().map(OutcomeView::from).collect(),
            converted: outcomes.iter().filter(|o| o.is_success()).count(),
            total: outcomes.len(),
            compare,
            preview_rows,
        }
    }
}

/// One file's section of the results page.
pub struct OutcomeView {
    pub file_name: String,
    pub ok: bool,
    pub error: String,
    pub format: String,
    pub text: String,
    pub rows: Vec<SizeRow>,
    pub summary: String,
    /// `text` as URL-safe base64, posted back by the download forms.
    /// Browsers rewrite line breaks in submitted form text; base64 has none.
    pub payload: String,
    pub downloads: Vec<DownloadButton>,
}

pub struct DownloadButton {
    /// `md` or `txt`, posted back as the `format` field.
    pub format: &'static str,
    pub label: String,
}

impl From<&FileOutcome> for OutcomeView {
    fn from(outcome: &FileOutcome) -> Self {
        match outcome {
            FileOutcome::Converted(r) => {
                let report = r.size_report();
                OutcomeView {
                    file_name: r.file_name.clone(),
                    ok: true,
                    error: String::new(),
                    format: r.format.label().to_string(),
                    text: r.text_content.clone(),
                    payload: URL_SAFE.encode(r.text_content.as_bytes()),
                    summary: report.summary(),
                    rows: report.rows,
                    downloads: r
                        .downloads()
                        .iter()
                        .map(|d| DownloadButton {
                            format: d.format.extension(),
                            label: format!(
                                "Download as .{} ({})",
                                d.format.extension(),
                                d.file_name
                            ),
                        })
                        .collect(),
                }
            }
            FileOutcome::Failed(e) => OutcomeView {
                file_name: e.file_name.clone(),
                ok: false,
                error: e.to_string(),
                format: String::new(),
                text: String::new(),
                rows: Vec::new(),
                summary: String::new(),
                payload: String::new(),
                downloads: Vec::new(),
            },
        }
    }
}
