//! Error types for uzpak operations.
//!
//! One error enum covers every failure mode of the codec pipeline: stream
//! failures, malformed container fields, corrupt stage payloads, and
//! cooperative cancellation. All errors are fatal to the running operation;
//! the drivers unwind and return them without retrying.

use std::io;
use thiserror::Error;

/// The main error type for uz1 compression and decompression.
#[derive(Debug, Error)]
pub enum UzError {
    /// I/O error from the underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The container does not start with a known uz1 signature.
    #[error("invalid uz1 signature: {found}")]
    InvalidSignature {
        /// The 32-bit value found where 1234 or 5678 was expected.
        found: u32,
    },

    /// The embedded filename record is malformed.
    #[error("invalid filename record: {message}")]
    InvalidFilename {
        /// Description of the defect.
        message: String,
    },

    /// The input ended before a required field was complete.
    #[error("unexpected end of input: expected {expected} more bytes")]
    UnexpectedEof {
        /// Number of bytes that were expected but not available.
        expected: usize,
    },

    /// A compact index could not be decoded.
    #[error("invalid compact index: {message}")]
    InvalidCompactIndex {
        /// Description of the defect.
        message: String,
    },

    /// Corrupted data detected inside a pipeline stage.
    #[error("corrupt data in {stage} stage: {message}")]
    CorruptData {
        /// The pipeline stage that rejected its input.
        stage: &'static str,
        /// Description of the corruption.
        message: String,
    },

    /// The progress observer requested cancellation.
    #[error("operation cancelled")]
    Cancelled,
}

/// Result type alias for uzpak operations.
pub type Result<T> = std::result::Result<T, UzError>;

impl UzError {
    /// Create an invalid filename error.
    pub fn invalid_filename(message: impl Into<String>) -> Self {
        Self::InvalidFilename {
            message: message.into(),
        }
    }

    /// Create an unexpected EOF error.
    pub fn unexpected_eof(expected: usize) -> Self {
        Self::UnexpectedEof { expected }
    }

    /// Create an invalid compact index error.
    pub fn invalid_compact_index(message: impl Into<String>) -> Self {
        Self::InvalidCompactIndex {
            message: message.into(),
        }
    }

    /// Create a corrupt data error for the named stage.
    pub fn corrupt(stage: &'static str, message: impl Into<String>) -> Self {
        Self::CorruptData {
            stage,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = UzError::InvalidSignature { found: 42 };
        assert!(err.to_string().contains("42"));

        let err = UzError::corrupt("bwt", "rotation index out of range");
        assert!(err.to_string().contains("bwt"));
        assert!(err.to_string().contains("rotation index"));

        let err = UzError::unexpected_eof(4);
        assert!(err.to_string().contains("4 more bytes"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: UzError = io_err.into();
        assert!(matches!(err, UzError::Io(_)));
    }
}
