//! Engine Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! Very little in the engine is allowed to fail a whole run: per-file problems
//! become [`Diagnostic`](crate::Diagnostic)s, [`Exclusion`](crate::Exclusion)s
//! or a failed [`Status`](crate::Status) on a single operation. The variants
//! here are for the few things that genuinely stop the caller.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

/// An engine error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// A destination path (or one of its components) is empty, reserved or
    /// would escape the output root.
    #[display("invalid path: {}", _0.display())]
    InvalidPath(#[error(not(source))] PathBuf),
    /// The output root is relative, not a directory, cannot be created or is
    /// not writable. Raised before any operation is attempted.
    #[display("unusable output root: {}", _0.display())]
    OutputRoot(#[error(not(source))] PathBuf),
    /// The plan already had operations applied to it and has to be rebuilt.
    #[display("plan has already been executed")]
    PlanSpent,
    /// A mode name that is not one of `content`, `date` or `type`.
    #[display("unknown organization mode: {_0}")]
    UnknownMode(#[error(not(source))] String),
    /// The analysis provider failed for a single file.
    #[display("analysis failed: {_0}")]
    Analysis(#[error(not(source))] String),
    /// A sidecar file with analysis results could not be read or parsed.
    #[display("could not load analysis sidecar: {}", _0.display())]
    Sidecar(#[error(not(source))] PathBuf),
    /// Underlying I/O error
    #[display("I/O error: {_0}")]
    Io(IoError),
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Analysis(_))
    }
}
