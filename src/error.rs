//! Typed failures surfaced by the analyzers.
//!
//! Everything else (I/O, number parsing) travels as plain `anyhow` errors with
//! context attached at the call site.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("File does not exist: {}", .0.display())]
    FileDoesNotExist(PathBuf),

    /// No line in the GC log carried the stop-the-world marker.
    #[error("no stop-the-world lines found in {}", .0.display())]
    NoStopTheWorldLines(PathBuf),

    #[error("index out of bounds: requested top {requested} but only {available} rows exist")]
    TopNOutOfBounds { requested: usize, available: usize },

    /// The overflow repair pass could not restore the expected column count.
    #[error("malformed safepoint line ({tokens} tokens after repair): {line:?}")]
    MalformedSafepointLine { line: String, tokens: usize },

    #[error("--use_gc_timestamps needs a GC log path when analyzing a safepoint log")]
    MissingGcLogPath,
}
