//! Stream error types

use crate::fourcc::FourCC;
use thiserror::Error;

/// Error type for buffer, stream and chunk operations
#[derive(Debug, Error)]
pub enum StreamError {
    /// A mandatory read or a write into fixed storage ran past the end
    #[error("end of stream at offset {position}: requested {requested} bytes, {remaining} remaining")]
    EndOfStream {
        /// Cursor position at the time of the failed access
        position: usize,
        /// Number of bytes the operation needed
        requested: usize,
        /// Number of bytes that were available
        remaining: usize,
    },

    /// Wrong tag or version on a speculative read
    #[error("format mismatch: expected {expected}, found {actual}")]
    FormatMismatch {
        /// Tag the caller was probing for
        expected: FourCC,
        /// Tag found in the stream
        actual: FourCC,
    },

    /// A declared length exceeds the bytes that are actually there
    #[error("size inconsistency: declared {declared} bytes, only {available} available")]
    SizeInconsistency {
        /// Length taken from the input
        declared: usize,
        /// Bytes left in the input
        available: usize,
    },

    /// Length-prefixed string is not valid UTF-8
    #[error("invalid string at offset {position}: {source}")]
    InvalidString {
        /// Offset of the string payload
        position: usize,
        /// Underlying decoding error
        source: std::string::FromUtf8Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StreamError {
    /// Whether this error was caused by running out of bytes
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Self::EndOfStream { .. })
    }
}

/// Result type for stream operations
pub type StreamResult<T> = Result<T, StreamError>;
