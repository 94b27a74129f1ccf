//! Progress-callback trait for per-file batch conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ReaderConfigBuilder::progress_callback`] to receive
//! events as the handler works through an upload batch.
//!
//! # Example
//!
//! ```rust
//! use docreader::{ConversionProgressCallback, ConversionResult, ReaderConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_file_complete(&self, index: usize, total: usize, result: &ConversionResult) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{}/{} {} done", index + 1, total, result.file_name);
//!     }
//! }
//!
//! let config = ReaderConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { completed: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use crate::error::ConversionFailed;
use crate::output::ConversionResult;
use std::sync::Arc;

/// Called by the handler as it processes each file of a batch.
///
/// Files are processed one at a time in upload order, but the trait is
/// `Send + Sync` because the handler runs on a blocking worker thread.
/// All methods have default no-op implementations.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before the first file.
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called before a file is handed to the converter.
    ///
    /// # Arguments
    /// * `index` — 0-indexed position in the upload
    /// * `total` — number of files in the batch
    /// * `file_name` — name as uploaded
    fn on_file_start(&self, index: usize, total: usize, file_name: &str) {
        let _ = (index, total, file_name);
    }

    /// Called when a file converted successfully.
    fn on_file_complete(&self, index: usize, total: usize, result: &ConversionResult) {
        let _ = (index, total, result);
    }

    /// Called when a file failed; the batch continues.
    fn on_file_error(&self, index: usize, total: usize, error: &ConversionFailed) {
        let _ = (index, total, error);
    }

    /// Called once after every file has been attempted.
    ///
    /// # Arguments
    /// * `total_files`   — files in the batch
    /// * `success_count` — files that converted without error
    fn on_batch_complete(&self, total_files: usize, success_count: usize) {
        let _ = (total_files, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ReaderConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::DocumentFormat;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
        succeeded: AtomicUsize,
    }

    impl ConversionProgressCallback for TrackingCallback {
        fn on_file_start(&self, _index: usize, _total: usize, _file_name: &str) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_complete(&self, _index: usize, _total: usize, _result: &ConversionResult) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_error(&self, _index: usize, _total: usize, _error: &ConversionFailed) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_batch_complete(&self, _total_files: usize, success_count: usize) {
            self.succeeded.store(success_count, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_batch_start(2);
        cb.on_file_start(0, 2, "a.docx");
        cb.on_file_error(
            1,
            2,
            &ConversionFailed {
                file_name: "b.pdf".into(),
                reason: "boom".into(),
            },
        );
        cb.on_batch_complete(2, 1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        let result = ConversionResult::new("a.html", DocumentFormat::Html, 10, "# A\n".into());

        tracker.on_file_start(0, 2, "a.html");
        tracker.on_file_complete(0, 2, &result);
        tracker.on_file_start(1, 2, "b.pdf");
        tracker.on_file_error(
            1,
            2,
            &ConversionFailed {
                file_name: "b.pdf".into(),
                reason: "corrupt".into(),
            },
        );
        tracker.on_batch_complete(2, 1);

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.succeeded.load(Ordering::SeqCst), 1);
    }
}
