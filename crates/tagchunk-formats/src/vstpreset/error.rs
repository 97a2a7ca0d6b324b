//! Error types for preset parsing and building

use tagchunk_stream::{FourCC, StreamError};
use thiserror::Error;

/// Preset-specific error types
#[derive(Error, Debug)]
pub enum PresetError {
    /// Data does not start with `CcnK` or `VST3`
    #[error("Unrecognized preset magic: {0}")]
    UnrecognizedMagic(FourCC),

    /// fxb/fxp record has an unknown data type
    #[error("Unrecognized fxb/fxp data type: {0}")]
    UnrecognizedDataType(FourCC),

    /// VST3 chunk list offset does not point at a `List` table
    #[error("Expected VST3 chunk list, found {0}")]
    MissingChunkList(FourCC),

    /// Opaque program record carries no chunk data
    #[error("Opaque program has an empty chunk")]
    EmptyProgramChunk,

    /// VST3 header version other than 1
    #[error("Unsupported VST3 preset version: {0}")]
    UnsupportedVersion(u32),

    /// A declared size or offset runs past the end of the input
    #[error("{what} of {declared} bytes exceeds the {available} bytes available")]
    SizeInconsistency {
        /// Which field was inconsistent
        what: &'static str,
        /// Declared size or end offset
        declared: u64,
        /// Bytes actually available
        available: usize,
    },

    /// Records nest deeper than the configured limit
    #[error("fxb/fxp records nested deeper than {0} levels")]
    NestingTooDeep(u32),

    /// A chunk table declares more entries than the configured limit
    #[error("Chunk table declares {count} entries, limit is {limit}")]
    TooManyChunks {
        /// Declared entry count
        count: usize,
        /// Configured limit
        limit: usize,
    },

    /// VST3 chunk payloads add up to more than the configured limit
    #[error("VST3 chunks total {total} bytes, limit is {limit}")]
    OutputTooLarge {
        /// Payload bytes up to and including the rejected entry
        total: u64,
        /// Configured limit
        limit: u64,
    },

    /// Parser configuration rejected
    #[error("Invalid parser configuration: {0}")]
    InvalidConfig(String),

    /// Underlying stream error
    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    /// Binary header error from binrw
    #[error("Binary format error: {0}")]
    BinRw(#[from] binrw::Error),

    /// I/O error while loading a file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PresetError {
    /// Whether this error means "not a preset this parser understands"
    /// rather than a corrupt file
    pub fn is_format_mismatch(&self) -> bool {
        matches!(
            self,
            Self::UnrecognizedMagic(_)
                | Self::UnrecognizedDataType(_)
                | Self::MissingChunkList(_)
                | Self::EmptyProgramChunk
                | Self::UnsupportedVersion(_)
        )
    }
}

/// Result type for preset operations
pub type PresetResult<T> = Result<T, PresetError>;
