//! The conversion handler: one uploaded file in, one outcome out.
//!
//! ## Why a handler object?
//!
//! The converter is chosen once at startup (built-in or external) and shared
//! by every request. [`ConversionHandler`] pairs that converter with the
//! [`ReaderConfig`] so the web server and the CLI run the exact same steps:
//!
//! ```text
//! UploadedFile
//!  │
//!  ├─ 1. Detect    format from the file name's extension
//!  ├─ 2. Convert   converter(bytes, format); panics are caught
//!  ├─ 3. Polish    deterministic Markdown cleanup (optional)
//!  └─ 4. Measure   original vs. converted byte sizes
//! ```
//!
//! A failure at any step becomes a [`ConversionFailed`] for that file only.
//! Batches are processed sequentially in upload order.

use crate::backend::{BuiltinConverter, DocumentConverter, ExternalCommandConverter};
use crate::config::ReaderConfig;
use crate::error::{ConversionFailed, ConvertError, ReaderError};
use crate::output::{ConversionResult, FileOutcome};
use crate::pipeline::input::UploadedFile;
use crate::pipeline::postprocess;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Lifecycle of one file, logged at debug level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileState {
    Uploaded,
    Materialized,
    Converted,
    Failed,
}

/// Converts uploaded files with a shared, stateless converter.
#[derive(Clone)]
pub struct ConversionHandler {
    converter: Arc<dyn DocumentConverter>,
    config: ReaderConfig,
}

impl std::fmt::Debug for ConversionHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversionHandler")
            .field("converter", &self.converter.name())
            .field("config", &self.config)
            .finish()
    }
}

impl ConversionHandler {
    /// Handler with an explicit converter, e.g. a test stub.
    pub fn new(converter: Arc<dyn DocumentConverter>, config: ReaderConfig) -> Self {
        Self { converter, config }
    }

    /// Handler whose converter follows `config.external_command`: the
    /// external program when set, the built-in backends otherwise.
    pub fn from_config(config: ReaderConfig) -> Self {
        let converter: Arc<dyn DocumentConverter> = match config.external_command {
            Some(ref cmd) => Arc::new(ExternalCommandConverter::new(
                cmd.clone(),
                config.scratch_dir.clone(),
            )),
            None => Arc::new(
                BuiltinConverter::new().with_max_part_bytes(config.max_part_bytes),
            ),
        };
        info!("Using converter '{}'", converter.name());
        Self::new(converter, config)
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn converter_name(&self) -> &str {
        self.converter.name()
    }

    /// Convert a single file.
    ///
    /// Never panics and never returns a fatal error: every problem with the
    /// file, including a panic inside a decoding library, is reported as a
    /// [`ConversionFailed`] naming it.
    pub fn process(&self, file: &UploadedFile) -> Result<ConversionResult, ConversionFailed> {
        let start = Instant::now();
        trace_state(&file.name, FileState::Uploaded);
        info!("Converting '{}' ({} bytes)", file.name, file.size());

        match self.convert_file(file) {
            Ok(result) => {
                trace_state(&file.name, FileState::Converted);
                info!(
                    "Converted '{}': {} → {} bytes in {}ms",
                    result.file_name,
                    result.original_size_bytes,
                    result.converted_size_bytes,
                    start.elapsed().as_millis()
                );
                Ok(result)
            }
            Err(e) => {
                trace_state(&file.name, FileState::Failed);
                let failed = ConversionFailed::new(&file.name, &e);
                warn!("{}", failed);
                Err(failed)
            }
        }
    }

    fn convert_file(&self, file: &UploadedFile) -> Result<ConversionResult, ConvertError> {
        let format = file.format()?;
        if self.converter.requires_path() {
            trace_state(&file.name, FileState::Materialized);
        }

        let parsed = panic::catch_unwind(AssertUnwindSafe(|| {
            self.converter.convert(&file.bytes, format)
        }))
        .map_err(|payload| ConvertError::Panicked(panic_message(payload.as_ref())))??;

        let text = if self.config.clean_output {
            postprocess::clean_markdown(&parsed.text_content)
        } else {
            parsed.text_content
        };

        Ok(ConversionResult::new(&file.name, format, file.size(), text))
    }

    /// Convert every file in upload order, one at a time.
    ///
    /// Returns exactly one outcome per input, in the same order. Progress
    /// events go to `config.progress_callback` when set.
    pub fn process_batch(&self, files: &[UploadedFile]) -> Vec<FileOutcome> {
        let total = files.len();
        let cb = self.config.progress_callback.as_ref();
        if let Some(cb) = cb {
            cb.on_batch_start(total);
        }

        let mut outcomes = Vec::with_capacity(total);
        for (index, file) in files.iter().enumerate() {
            if let Some(cb) = cb {
                cb.on_file_start(index, total, &file.name);
            }
            let outcome = match self.process(file) {
                Ok(result) => {
                    if let Some(cb) = cb {
                        cb.on_file_complete(index, total, &result);
                    }
                    FileOutcome::Converted(result)
                }
                Err(failed) => {
                    if let Some(cb) = cb {
                        cb.on_file_error(index, total, &failed);
                    }
                    FileOutcome::Failed(failed)
                }
            };
            outcomes.push(outcome);
        }

        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        info!("Batch complete: {}/{} files converted", succeeded, total);
        if let Some(cb) = cb {
            cb.on_batch_complete(total, succeeded);
        }
        outcomes
    }

    /// [`process_batch`](Self::process_batch) on tokio's blocking pool.
    ///
    /// The decoding libraries are synchronous and CPU-bound; running them
    /// inline would stall the server's async workers.
    pub async fn process_batch_async(
        self: &Arc<Self>,
        files: Vec<UploadedFile>,
    ) -> Result<Vec<FileOutcome>, ReaderError> {
        let handler = Arc::clone(self);
        tokio::task::spawn_blocking(move || handler.process_batch(&files))
            .await
            .map_err(|e| ReaderError::Internal(format!("conversion task failed: {e}")))
    }
}

fn trace_state(file_name: &str, state: FileState) {
    debug!("'{}' → {:?}", file_name, state);
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
