//! HTTP error responses for the web UI and JSON API.
//!
//! Per-file conversion failures are not errors at this level: they are
//! rendered as part of a successful response. [`ApiError`] covers requests
//! that cannot be handled at all.

use crate::error::ReaderError;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed multipart body or form.
    #[error("{message}")]
    BadRequest { message: String },

    /// Body exceeded the configured upload limit.
    #[error("Upload exceeds the {} limit", human_size(*.limit_bytes))]
    PayloadTooLarge { limit_bytes: usize },

    /// The form was submitted without any file attached.
    #[error("Please choose at least one file to convert")]
    NoFiles,

    /// Something on our side broke.
    #[error("Failed to {operation}")]
    Internal { operation: String },
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } | ApiError::NoFiles => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Map a multipart read failure, keeping the 413 that axum assigns when
    /// the body limit is hit.
    pub(crate) fn from_multipart(err: MultipartError, limit_bytes: usize) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge { limit_bytes }
        } else {
            ApiError::BadRequest {
                message: format!("Failed to parse upload: {}", err.body_text()),
            }
        }
    }
}

/// `209715200` → `200 MB`, `1536` → `1.5 KB`.
pub(crate) fn human_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    let (value, unit) = if b >= MB { (b / MB, "MB") } else { (b / KB, "KB") };
    if value.fract() == 0.0 {
        format!("{value:.0} {unit}")
    } else {
        format!("{value:.1} {unit}")
    }
}

impl From<ReaderError> for ApiError {
    fn from(err: ReaderError) -> Self {
        match err {
            ReaderError::NoFiles => ApiError::NoFiles,
            other => {
                tracing::error!("Request failed: {:#}", other);
                ApiError::Internal {
                    operation: "convert the uploaded files".to_string(),
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Internal { .. } => tracing::error!("Internal error: {}", self),
            ApiError::PayloadTooLarge { .. } => tracing::warn!("Rejected upload: {}", self),
            ApiError::BadRequest { .. } | ApiError::NoFiles => {
                tracing::debug!("Client error: {}", self)
            }
        }
        (self.status_code(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(ApiError::NoFiles.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::PayloadTooLarge { limit_bytes: 1024 }.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ApiError::Internal {
                operation: "x".into()
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn limits_are_human_readable() {
        assert_eq!(human_size(200 * 1024 * 1024), "200 MB");
        assert_eq!(human_size(1536), "1.5 KB");
        let msg = ApiError::PayloadTooLarge { limit_bytes: 1024 }.to_string();
        assert_eq!(msg, "Upload exceeds the 1 KB limit");
    }

    #[test]
    fn reader_no_files_maps_to_bad_request() {
        let err: ApiError = ReaderError::NoFiles.into();
        assert!(matches!(err, ApiError::NoFiles));
        let err: ApiError = ReaderError::Internal("join".into()).into();
        assert!(matches!(err, ApiError::Internal { .. }));
    }
}
