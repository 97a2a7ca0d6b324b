//! Fixed-layout preset headers
//!
//! VST2 fxb/fxp records are big-endian, VST3 preset files little-endian.
//! The `VstW` wrapper that embeds a VST2 record in a VST3 chunk is
//! big-endian again.

use binrw::{BinRead, BinWrite};
use tagchunk_stream::FourCC;

/// Magic of every VST2 fxb/fxp record
pub const CCNK_MAGIC: FourCC = FourCC(*b"CcnK");
/// Magic of a VST3 preset file
pub const VST3_MAGIC: FourCC = FourCC(*b"VST3");
/// Magic of the VST3 chunk table
pub const LIST_MAGIC: FourCC = FourCC(*b"List");
/// Magic of the VST2-in-VST3 wrapper
pub const VSTW_MAGIC: FourCC = FourCC(*b"VstW");

/// Size of the VST3 file header as written by the SDK (64-bit list offset)
pub const VST3_HEADER_SIZE: usize = 4 + 4 + 32 + 8;
/// Size of one VST3 chunk table entry
pub const VST3_LIST_ENTRY_SIZE: usize = 4 + 8 + 8;
/// Length of the fixed program name field
pub const PROGRAM_NAME_LEN: usize = 28;

/// fxb/fxp record kind, from the data type tag after `CcnK` and the length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FxDataType {
    /// `FxBk`: bank of regular programs
    RegularBank,
    /// `FBCh`: bank with one opaque chunk per program
    OpaqueBank,
    /// `FxCk`: program with explicit float parameters
    RegularProgram,
    /// `FPCh`: program with one opaque chunk
    OpaqueProgram,
}

impl FxDataType {
    /// Map a data type tag to its kind
    pub fn from_fourcc(tag: FourCC) -> Option<Self> {
        match tag.as_bytes() {
            b"FxBk" => Some(Self::RegularBank),
            b"FBCh" => Some(Self::OpaqueBank),
            b"FxCk" => Some(Self::RegularProgram),
            b"FPCh" => Some(Self::OpaqueProgram),
            _ => None,
        }
    }

    /// Data type tag
    pub fn fourcc(self) -> FourCC {
        FourCC(match self {
            Self::RegularBank => *b"FxBk",
            Self::OpaqueBank => *b"FBCh",
            Self::RegularProgram => *b"FxCk",
            Self::OpaqueProgram => *b"FPCh",
        })
    }

    /// Whether the record is a bank
    pub fn is_bank(self) -> bool {
        matches!(self, Self::RegularBank | Self::OpaqueBank)
    }

    /// Whether the record carries opaque chunk data
    pub fn is_opaque(self) -> bool {
        matches!(self, Self::OpaqueBank | Self::OpaqueProgram)
    }
}

/// Bank header following `CcnK | length | data type`
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(big)]
pub struct FxBankHeader {
    /// Bank format version
    pub version: u32,
    /// Plugin unique id
    pub plugin_id: FourCC,
    /// Plugin version
    pub plugin_version: u32,
    /// Number of programs that follow
    pub num_programs: u32,
    /// Current program, present from version 2 on
    #[br(if(version >= 2))]
    pub current_program: Option<u32>,
    /// Reserved, 124 bytes from version 2 on and 128 before
    #[br(count = if version >= 2 { 124 } else { 128 })]
    pub future: Vec<u8>,
}

impl FxBankHeader {
    /// Create a header with zeroed reserved space sized for `version`
    pub fn new(version: u32, plugin_id: FourCC, plugin_version: u32, num_programs: u32) -> Self {
        let (current_program, reserved) = if version >= 2 {
            (Some(0), 124)
        } else {
            (None, 128)
        };
        Self {
            version,
            plugin_id,
            plugin_version,
            num_programs,
            current_program,
            future: vec![0; reserved],
        }
    }
}

/// Program header following `CcnK | length | data type`
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(big)]
pub struct FxProgramHeader {
    /// Program format version
    pub version: u32,
    /// Plugin unique id
    pub plugin_id: FourCC,
    /// Plugin version
    pub plugin_version: u32,
    /// Number of float parameters (regular programs)
    pub num_params: u32,
    /// NUL-padded program name
    pub name: [u8; PROGRAM_NAME_LEN],
}

impl FxProgramHeader {
    /// Program name up to the first NUL
    pub fn name(&self) -> String {
        let end = self
            .name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(PROGRAM_NAME_LEN);
        String::from_utf8_lossy(&self.name[..end]).into_owned()
    }

    /// Encode `name` into the fixed field, truncating to 28 bytes
    pub fn encode_name(name: &str) -> [u8; PROGRAM_NAME_LEN] {
        let mut field = [0u8; PROGRAM_NAME_LEN];
        let len = name.len().min(PROGRAM_NAME_LEN);
        field[..len].copy_from_slice(&name.as_bytes()[..len]);
        field
    }
}

/// VST3 file header following the `VST3` magic
///
/// The SDK writes the chunk list offset as a 64-bit value; only its low
/// 32 bits are read.
#[derive(Debug, Clone, PartialEq, Eq, BinRead)]
#[br(little)]
pub struct Vst3Header {
    /// Format version, 1 for every known file
    pub version: u32,
    /// ASCII class id of the processor component
    pub class_id: [u8; 32],
    /// Absolute offset of the `List` table
    pub list_offset: u32,
}

/// One entry of the VST3 chunk table
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct Vst3ListEntry {
    /// Chunk id, for example `Comp` or `Cont`
    pub id: FourCC,
    /// Absolute file offset of the chunk payload
    pub offset: u64,
    /// Payload size in bytes
    pub size: u64,
}

/// Header of a `VstW` wrapper, following the magic
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(big)]
pub struct VstWrapperHeader {
    /// Size of the rest of the header, always 8
    pub len: u32,
    /// Wrapper version, always 1
    pub version: u32,
    /// Non-zero if the plugin was bypassed
    pub bypassed: u32,
}

impl Default for VstWrapperHeader {
    fn default() -> Self {
        Self {
            len: 8,
            version: 1,
            bypassed: 0,
        }
    }
}

impl VstWrapperHeader {
    /// Whether the header carries the only known length and version
    pub fn is_well_formed(&self) -> bool {
        self.len == 8 && self.version == 1
    }
}
