//! Browser UI and JSON API over the conversion handler.
//!
//! ```text
//! GET  /              upload form
//! POST /convert       multipart upload → results page
//! POST /download      posted text → .md / .txt attachment
//! POST /api/convert   multipart upload → JSON outcomes
//! GET  /health        liveness
//! ```
//!
//! The server keeps nothing between requests: the results page carries the
//! converted text, and the download buttons post it back.

pub mod error;
mod routes;
mod views;

use crate::convert::ConversionHandler;
use crate::error::ReaderError;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{info, warn, Level};

pub use error::ApiError;

/// Shared by every request. The handler holds no per-request state.
#[derive(Clone)]
pub struct AppState {
    handler: Arc<ConversionHandler>,
}

impl AppState {
    fn max_upload_bytes(&self) -> usize {
        self.handler.config().max_upload_bytes
    }
}

/// Build the application router around `handler`.
pub fn router(handler: ConversionHandler) -> Router {
    let limit = handler.config().max_upload_bytes;
    let state = AppState {
        handler: Arc::new(handler),
    };

    Router::new()
        .route("/", get(routes::index))
        .route("/convert", post(routes::convert))
        .route("/download", post(routes::download))
        .route("/api/convert", post(routes::api_convert))
        .route("/health", get(routes::health))
        .layer(DefaultBodyLimit::max(limit))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: &str, handler: ConversionHandler) -> Result<(), ReaderError> {
    let server_err = |source: std::io::Error| ReaderError::Server {
        addr: addr.to_string(),
        source,
    };

    let listener = TcpListener::bind(addr).await.map_err(server_err)?;
    let local = listener.local_addr().map_err(server_err)?;
    info!(
        "Listening on http://{} (converter: {})",
        local,
        handler.converter_name()
    );

    axum::serve(listener, router(handler))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(server_err)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
