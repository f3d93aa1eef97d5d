//! Error types for operations that fail as a whole.
//!
//! Problems found in the input are not Rust errors: they are collected as
//! [`Diagnostic`](crate::Diagnostic)s so that one run reports as many as possible.
//! A compilation only turns into a [`CompileError`] when at least one of them is an error.

use crate::diagnostics::Diagnostics;
use std::io;
use std::path::PathBuf;

/// Failure to load an input tree.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed input tree in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A compilation that recorded at least one error; its output was discarded.
#[derive(Debug, thiserror::Error)]
#[error("{file}: {} error(s), {} warning(s); no output generated", .diagnostics.error_count(), .diagnostics.warning_count())]
pub struct CompileError {
    pub file: String,
    pub diagnostics: Diagnostics,
}
