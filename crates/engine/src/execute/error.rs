//! Error types for applying a single planned operation.
//!
//! These never escape the executor as errors: each one is rendered into the
//! `reason` of a [`Status::Failed`](crate::Status::Failed) and the batch moves
//! on to the next operation.

use derive_more::{Display, Error};
use std::io::Error as IoError;

pub(crate) type Error = exn::Exn<ErrorKind>;
pub(crate) type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Something already occupies the destination. Never overwritten.
    #[display("destination already exists")]
    Exists,
    #[display("could not create folder: {_0}")]
    CreateDir(IoError),
    #[display("could not read source: {_0}")]
    Source(IoError),
    #[display("copy failed: {_0}")]
    Copy(IoError),
    /// The copied bytes hash differently from the source.
    #[display("copy does not match its source")]
    Verify,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_cause() {
        let kind = ErrorKind::Copy(IoError::new(std::io::ErrorKind::StorageFull, "no space left"));
        assert_eq!(kind.to_string(), "copy failed: no space left");
        assert_eq!(ErrorKind::Exists.to_string(), "destination already exists");
    }
}
