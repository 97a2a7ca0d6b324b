//! VST preset chunk lists
//!
//! Extracts the plugin state chunks from VST2 fxb/fxp records and VST3
//! `.vstpreset` files.
//!
//! # Formats
//!
//! ```text
//! VST2 record (big-endian):
//! ├── "CcnK"
//! ├── length      u32 (bytes after this field)
//! ├── data type   "FxBk" | "FBCh" | "FxCk" | "FPCh"
//! └── bank or program header, then programs / chunk / parameters
//!
//! VST3 file (little-endian):
//! ├── "VST3", version u32 (1), class id [u8; 32], list offset
//! ├── chunk payloads
//! └── "List", count u32, count × { id [u8; 4], offset u64, size u64 }
//! ```
//!
//! Opaque records (`FBCh`, `FPCh`) yield one chunk per program. Regular
//! programs (`FxCk`) only carry float parameters and yield nothing. A VST3
//! chunk holding a VST2 record, bare or behind a `VstW` wrapper, is replaced
//! by the chunks of that record.

mod builder;
mod error;
mod header;
mod parser;

pub use builder::{Vst2PresetBuilder, Vst3PresetBuilder};
pub use error::{PresetError, PresetResult};
pub use header::{
    CCNK_MAGIC, FxBankHeader, FxDataType, FxProgramHeader, LIST_MAGIC, PROGRAM_NAME_LEN,
    VST3_HEADER_SIZE, VST3_LIST_ENTRY_SIZE, VST3_MAGIC, VSTW_MAGIC, Vst3Header, Vst3ListEntry,
    VstWrapperHeader,
};
pub use parser::{read_fxb_fxp, read_vst3};

use std::path::Path;

use tagchunk_stream::{FourCC, TypedStream};
use tracing::{debug, warn};

use crate::config::ParserConfig;

/// One state chunk extracted from a preset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetChunk {
    /// VST3 chunk id; `None` for chunks taken from a VST2 record
    pub id: Option<FourCC>,
    /// Chunk bytes
    pub data: Vec<u8>,
}

impl PresetChunk {
    /// Chunk with a VST3 id
    pub fn new(id: FourCC, data: Vec<u8>) -> Self {
        Self { id: Some(id), data }
    }

    /// Chunk from an opaque VST2 record
    pub fn opaque(data: Vec<u8>) -> Self {
        Self { id: None, data }
    }

    /// Whether this chunk came from an opaque VST2 record
    pub fn is_opaque_vst2(&self) -> bool {
        self.id.is_none()
    }
}

/// Chunks in file order
pub type ChunkList = Vec<PresetChunk>;

/// Container kind, from the first four bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresetKind {
    /// VST2 fxb/fxp record
    Vst2,
    /// VST3 preset file
    Vst3,
}

impl PresetKind {
    /// Detect the container kind from the leading magic
    pub fn detect(data: &[u8]) -> Option<Self> {
        match FourCC::from_prefix(data)? {
            CCNK_MAGIC => Some(Self::Vst2),
            VST3_MAGIC => Some(Self::Vst3),
            _ => None,
        }
    }
}

impl std::fmt::Display for PresetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vst2 => write!(f, "VST2 fxb/fxp"),
            Self::Vst3 => write!(f, "VST3 preset"),
        }
    }
}

/// A parsed preset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VstPreset {
    kind: PresetKind,
    chunks: ChunkList,
}

impl VstPreset {
    /// Parse `data`, returning `None` if it is not a usable preset
    ///
    /// Every failure, from an unknown magic to a truncated record, yields
    /// `None`; use [`read`](Self::read) to get the reason.
    pub fn parse(data: &[u8]) -> Option<ChunkList> {
        Self::parse_with_config(data, &ParserConfig::default())
    }

    /// [`parse`](Self::parse) with explicit limits
    pub fn parse_with_config(data: &[u8], config: &ParserConfig) -> Option<ChunkList> {
        match Self::read_with_config(data, config) {
            Ok(preset) => Some(preset.chunks),
            Err(e) if e.is_format_mismatch() => {
                debug!("Not a usable VST preset: {e}");
                None
            }
            Err(e) => {
                warn!("Error reading VST preset: {e}");
                None
            }
        }
    }

    /// Parse `data`, reporting why it failed
    pub fn read(data: &[u8]) -> PresetResult<Self> {
        Self::read_with_config(data, &ParserConfig::default())
    }

    /// [`read`](Self::read) with explicit limits
    pub fn read_with_config(data: &[u8], config: &ParserConfig) -> PresetResult<Self> {
        config.validate().map_err(PresetError::InvalidConfig)?;

        let mut stream = TypedStream::borrowed(data);
        let magic = stream.read_fourcc()?;
        stream.seek_read(0);

        let (kind, chunks) = match magic {
            CCNK_MAGIC => (PresetKind::Vst2, read_fxb_fxp(&mut stream, 1, config)?),
            VST3_MAGIC => (PresetKind::Vst3, read_vst3(&mut stream, config)?),
            other => return Err(PresetError::UnrecognizedMagic(other)),
        };
        debug!("Read {} with {} chunks", kind, chunks.len());

        Ok(Self { kind, chunks })
    }

    /// Load and parse a preset file
    pub fn from_file(path: impl AsRef<Path>) -> PresetResult<Self> {
        let data = std::fs::read(path)?;
        Self::read(&data)
    }

    /// Whether `data` starts with a preset magic
    pub fn is_preset_data(data: &[u8]) -> bool {
        PresetKind::detect(data).is_some()
    }

    /// Container kind
    pub fn kind(&self) -> PresetKind {
        self.kind
    }

    /// Extracted chunks in file order
    pub fn chunks(&self) -> &[PresetChunk] {
        &self.chunks
    }

    /// Consume the preset and return its chunks
    pub fn into_chunks(self) -> ChunkList {
        self.chunks
    }
}
