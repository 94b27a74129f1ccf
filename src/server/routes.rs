//! Request handlers.

use super::error::ApiError;
use super::views::{IndexTemplate, ResultsTemplate};
use super::AppState;
use crate::error::ReaderError;
use crate::output::{Download, DownloadFormat, FileOutcome, OutcomeReport};
use crate::pipeline::input::UploadedFile;
use askama::Template;
use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::{Form, Json};
use serde::Deserialize;
use tracing::{debug, info};

/// Name used when a multipart file part arrives without a file name.
const UNNAMED_UPLOAD: &str = "upload";

pub(super) async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let config = state.handler.config();
    render(&IndexTemplate::new(
        config.show_comparison,
        config.max_upload_bytes,
    ))
}

pub(super) async fn convert(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Html<String>, ApiError> {
    let form = read_upload(multipart, state.max_upload_bytes()).await?;
    let outcomes = run_batch(&state, form.files).await?;
    render(&ResultsTemplate::new(
        &outcomes,
        form.compare,
        state.handler.config().preview_rows,
    ))
}

pub(super) async fn api_convert(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Vec<OutcomeReport>>, ApiError> {
    let form = read_upload(multipart, state.max_upload_bytes()).await?;
    let outcomes = run_batch(&state, form.files).await?;
    Ok(Json(outcomes.iter().map(FileOutcome::report).collect()))
}

#[derive(Debug, Deserialize)]
pub(super) struct DownloadRequest {
    file_name: String,
    format: DownloadFormat,
    /// Converted text, URL-safe base64.
    content: String,
}

pub(super) async fn download(Form(req): Form<DownloadRequest>) -> Result<Response, ApiError> {
    let content = decode_content(&req.content)?;
    let download = Download::new(&req.file_name, req.format, &content);
    debug!(
        "Serving {} ({} bytes)",
        download.file_name,
        download.bytes.len()
    );

    Ok((
        [
            (
                header::CONTENT_TYPE,
                format!("{}; charset=utf-8", download.format.mime()),
            ),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(&download.file_name),
            ),
        ],
        download.bytes,
    )
        .into_response())
}

pub(super) async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ── Helpers ──────────────────────────────────────────────────────────────

struct UploadForm {
    files: Vec<UploadedFile>,
    compare: bool,
}

/// Collect the `files` parts and the `compare` flag, in upload order.
async fn read_upload(mut multipart: Multipart, limit: usize) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm {
        files: Vec::new(),
        compare: false,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::from_multipart(e, limit))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "files" | "file" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::from_multipart(e, limit))?;
                // An empty file input still submits one nameless, empty part.
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                let file_name = if file_name.is_empty() {
                    UNNAMED_UPLOAD.to_string()
                } else {
                    file_name
                };
                form.files.push(UploadedFile::new(file_name, bytes.to_vec()));
            }
            "compare" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::from_multipart(e, limit))?;
                form.compare = is_truthy(&value);
            }
            other => debug!("Ignoring form field '{}'", other),
        }
    }

    Ok(form)
}

async fn run_batch(
    state: &AppState,
    files: Vec<UploadedFile>,
) -> Result<Vec<FileOutcome>, ApiError> {
    if files.is_empty() {
        return Err(ReaderError::NoFiles.into());
    }
    info!("Received {} file(s)", files.len());
    Ok(state.handler.process_batch_async(files).await?)
}

fn render(template: &impl Template) -> Result<Html<String>, ApiError> {
    template.render().map(Html).map_err(|e| ApiError::Internal {
        operation: format!("render page: {e}"),
    })
}

/// The posted download text; it must decode to the UTF-8 the page embedded.
fn decode_content(encoded: &str) -> Result<String, ApiError> {
    let bad = |detail: String| ApiError::BadRequest {
        message: format!("Invalid download content: {detail}"),
    };
    let bytes = URL_SAFE
        .decode(encoded.trim())
        .map_err(|e| bad(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| bad(e.to_string()))
}

fn is_truthy(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "off" | "no"
    )
}

/// `attachment` header with an ASCII fallback name and the exact UTF-8 name.
fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if c == ' ' || (c.is_ascii_graphic() && c != '"' && c != '\\') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        percent_encode(file_name)
    )
}

fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        if b.is_ascii_alphanumeric() || b"-._~".contains(&b) {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;

    #[test]
    fn checkbox_values() {
        assert!(is_truthy("on"));
        assert!(is_truthy("true"));
        assert!(!is_truthy("off"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn download_content_is_decoded_verbatim() {
        let text = "\nline one\r\nline two";
        assert_eq!(decode_content(&URL_SAFE.encode(text)).unwrap(), text);
        assert!(decode_content("not base64!").is_err());
        assert!(decode_content(&URL_SAFE.encode([0xff, 0xfe])).is_err());
    }

    #[test]
    fn disposition_is_ascii_safe() {
        assert_eq!(
            content_disposition("report_converted.md"),
            "attachment; filename=\"report_converted.md\"; filename*=UTF-8''report_converted.md"
        );
        let header = content_disposition("résumé \"v2\"_converted.txt");
        assert!(header.is_ascii());
        assert!(header.contains("filename=\"r_sum_ _v2__converted.txt\""));
        assert!(header.contains("r%C3%A9sum%C3%A9%20%22v2%22_converted.txt"));
    }
}
