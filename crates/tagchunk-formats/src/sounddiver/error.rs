//! Error types for Sounddiver library loading

use tagchunk_stream::{FourCC, StreamError};
use thiserror::Error;

use super::entry::FieldType;

/// Sounddiver-specific error types
#[derive(Error, Debug)]
pub enum SounddiverError {
    /// Input shorter than the 8-byte container header
    #[error("Input of {0} bytes is too short for a Sounddiver library")]
    TooShort(usize),

    /// Input starts with neither `FORM` nor `MROF`
    #[error("Invalid Sounddiver magic: {0}")]
    InvalidMagic(FourCC),

    /// Container payload does not start with `SSLB`
    #[error("Expected SSLB library tag, found {0}")]
    MissingLibraryTag(FourCC),

    /// File holds other than exactly one top-level chunk
    #[error("Expected exactly one top-level chunk, found {0}")]
    UnexpectedRootChunks(usize),

    /// Chunk length runs past the end of its container
    #[error("Chunk {tag} of {length} bytes exceeds the {remaining} bytes remaining")]
    ChunkTooLarge {
        /// Chunk tag
        tag: FourCC,
        /// Declared length
        length: u32,
        /// Bytes left in the container
        remaining: usize,
    },

    /// Entry field length runs past the end of its chunk
    #[error("{field:?} field of {length} bytes exceeds the {remaining} bytes remaining")]
    FieldTooLarge {
        /// Field type
        field: FieldType,
        /// Declared length
        length: usize,
        /// Bytes left in the chunk
        remaining: usize,
    },

    /// Variable-length integer does not fit in `usize`
    #[error("Variable-length integer at offset {position} overflows")]
    VarLenOverflow {
        /// Offset of the first byte of the integer
        position: usize,
    },

    /// A container declares more chunks than the configured limit
    #[error("More than {limit} chunks in one container")]
    TooManyChunks {
        /// Configured limit
        limit: usize,
    },

    /// Parser configuration rejected
    #[error("Invalid parser configuration: {0}")]
    InvalidConfig(String),

    /// Underlying stream error
    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    /// Binary read error from binrw
    #[error("Binary format error: {0}")]
    BinRw(#[from] binrw::Error),

    /// I/O error while loading a file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SounddiverError {
    /// Whether this error means "not a Sounddiver library" rather than a
    /// damaged one
    pub fn is_format_mismatch(&self) -> bool {
        matches!(
            self,
            Self::TooShort(_)
                | Self::InvalidMagic(_)
                | Self::MissingLibraryTag(_)
                | Self::UnexpectedRootChunks(_)
        )
    }
}

/// Result type for Sounddiver operations
pub type SounddiverResult<T> = Result<T, SounddiverError>;
