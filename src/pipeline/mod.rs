//! Pipeline stages for document-to-Markdown conversion.
//!
//! Each submodule implements exactly one step of the per-file flow.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ [materialize] ──▶ backend ──▶ postprocess
//! (upload)   (temp path)     (decode)    (cleanup)
//! ```
//!
//! 1. [`input`]       — the uploaded name + bytes
//! 2. [`materialize`] — stage bytes at a temp path, only for converters that
//!    need one (see [`crate::backend::external`])
//! 3. [`crate::backend`] — format-specific text extraction
//! 4. [`postprocess`] — deterministic text-cleanup rules

pub mod input;
pub mod materialize;
pub mod postprocess;
