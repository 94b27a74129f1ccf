//! Delegate conversion to an external program such as `markitdown`.
//!
//! The program receives a path, so the upload is materialized first. The
//! staged file is released whether the program succeeds, fails, or cannot be
//! spawned at all.

use super::{DocumentConverter, ParsedDocument};
use crate::config::ExternalCommand;
use crate::error::ConvertError;
use crate::format::DocumentFormat;
use crate::pipeline::materialize::materialize;
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// Runs `program [args..] <staged-path>` and reads Markdown from stdout.
#[derive(Debug, Clone)]
pub struct ExternalCommandConverter {
    command: ExternalCommand,
    scratch_dir: Option<PathBuf>,
    name: String,
}

impl ExternalCommandConverter {
    pub fn new(command: ExternalCommand, scratch_dir: Option<PathBuf>) -> Self {
        let name = format!("external:{}", command.program);
        Self {
            command,
            scratch_dir,
            name,
        }
    }

    pub fn command(&self) -> &ExternalCommand {
        &self.command
    }

    fn failure(&self, detail: impl Into<String>) -> ConvertError {
        ConvertError::ExternalCommand {
            program: self.command.program.clone(),
            detail: detail.into(),
        }
    }
}

impl DocumentConverter for ExternalCommandConverter {
    fn convert(
        &self,
        bytes: &[u8],
        format: DocumentFormat,
    ) -> Result<ParsedDocument, ConvertError> {
        let staged = materialize(bytes, format, self.scratch_dir.as_deref())?;
        debug!(
            "Running {} on {}",
            self.command.program,
            staged.path().display()
        );

        let output = Command::new(&self.command.program)
            .args(&self.command.args)
            .arg(staged.path())
            .output();
        staged.release();

        let output = output.map_err(|e| self.failure(format!("could not start: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            let detail = if stderr.is_empty() {
                format!("exited with {}", output.status)
            } else {
                format!("exited with {}: {}", output.status, stderr)
            };
            return Err(self.failure(detail));
        }

        Ok(ParsedDocument::new(
            String::from_utf8_lossy(&output.stdout).into_owned(),
        ))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn requires_path(&self) -> bool {
        true
    }
}
