//! Preset builders
//!
//! Produce byte-exact VST2 fxb/fxp records and VST3 preset files. The
//! parsers in this module read everything these builders write.

use binrw::BinWrite;
use tagchunk_stream::{FourCC, SizeType, TypedStream};

use super::error::{PresetError, PresetResult};
use super::header::{
    CCNK_MAGIC, FxBankHeader, FxDataType, FxProgramHeader, LIST_MAGIC, VST3_HEADER_SIZE,
    VST3_MAGIC, VSTW_MAGIC, Vst3ListEntry, VstWrapperHeader,
};

/// `VstW` magic plus the wrapper header
const VSTW_PREFIX_SIZE: usize = 16;

fn size_u32(len: usize) -> PresetResult<u32> {
    SizeType::try_from(len).map_err(|_| PresetError::SizeInconsistency {
        what: "record",
        declared: len as u64,
        available: SizeType::MAX as usize,
    })
}

fn write_u32_be(stream: &mut TypedStream<'_>, value: u32) -> PresetResult<()> {
    Ok(stream.write_u32(value.to_be())?)
}

/// Builder for VST2 fxp programs and fxb banks
///
/// ```
/// use tagchunk_formats::vstpreset::{Vst2PresetBuilder, VstPreset};
/// use tagchunk_stream::FourCC;
///
/// let fxp = Vst2PresetBuilder::new(FourCC(*b"Osc1")).opaque_program("Init", b"state")?;
/// let chunks = VstPreset::parse(&fxp).expect("valid program");
/// assert_eq!(chunks[0].data, b"state");
/// # Ok::<(), tagchunk_formats::vstpreset::PresetError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Vst2PresetBuilder {
    plugin_id: FourCC,
    plugin_version: u32,
    format_version: u32,
    bank_version: u32,
    current_program: u32,
}

impl Vst2PresetBuilder {
    /// Create a builder for the plugin with unique id `plugin_id`
    pub fn new(plugin_id: FourCC) -> Self {
        Self {
            plugin_id,
            plugin_version: 1,
            format_version: 1,
            bank_version: 2,
            current_program: 0,
        }
    }

    /// Set the plugin version written into every header
    pub fn with_plugin_version(mut self, version: u32) -> Self {
        self.plugin_version = version;
        self
    }

    /// Set the bank format version (1 omits the current program field)
    pub fn with_bank_version(mut self, version: u32) -> Self {
        self.bank_version = version;
        self
    }

    /// Set the current program stored in version 2 banks
    pub fn with_current_program(mut self, program: u32) -> Self {
        self.current_program = program;
        self
    }

    /// `CcnK | length | data type | body`, length counting everything after
    /// the length field
    fn record(data_type: FxDataType, body: &TypedStream<'_>) -> PresetResult<Vec<u8>> {
        let body = body.as_slice();
        let mut stream = TypedStream::with_capacity(body.len() + 12);
        stream.write_fourcc(CCNK_MAGIC)?;
        write_u32_be(&mut stream, size_u32(body.len() + 4)?)?;
        stream.write_fourcc(data_type.fourcc())?;
        stream.write_bytes(body)?;
        Ok(stream.into_vec())
    }

    fn program_header(&self, name: &str, num_params: u32) -> FxProgramHeader {
        FxProgramHeader {
            version: self.format_version,
            plugin_id: self.plugin_id,
            plugin_version: self.plugin_version,
            num_params,
            name: FxProgramHeader::encode_name(name),
        }
    }

    fn bank_header(&self, num_programs: usize) -> PresetResult<FxBankHeader> {
        let mut header = FxBankHeader::new(
            self.bank_version,
            self.plugin_id,
            self.plugin_version,
            size_u32(num_programs)?,
        );
        if header.current_program.is_some() {
            header.current_program = Some(self.current_program);
        }
        Ok(header)
    }

    /// Program (`FPCh`) carrying one opaque chunk
    pub fn opaque_program(&self, name: &str, chunk: &[u8]) -> PresetResult<Vec<u8>> {
        let mut body = TypedStream::new();
        self.program_header(name, 0).write(&mut body.writer())?;
        write_u32_be(&mut body, size_u32(chunk.len())?)?;
        body.write_bytes(chunk)?;
        Self::record(FxDataType::OpaqueProgram, &body)
    }

    /// Program (`FxCk`) with explicit float parameters
    pub fn regular_program(&self, name: &str, params: &[f32]) -> PresetResult<Vec<u8>> {
        let mut body = TypedStream::new();
        self.program_header(name, size_u32(params.len())?)
            .write(&mut body.writer())?;
        for param in params {
            write_u32_be(&mut body, param.to_bits())?;
        }
        Self::record(FxDataType::RegularProgram, &body)
    }

    /// Bank (`FBCh`) with one opaque chunk per program
    pub fn opaque_bank<T: AsRef<[u8]>>(&self, chunks: &[T]) -> PresetResult<Vec<u8>> {
        let mut body = TypedStream::new();
        self.bank_header(chunks.len())?.write(&mut body.writer())?;
        for chunk in chunks {
            let chunk = chunk.as_ref();
            write_u32_be(&mut body, size_u32(chunk.len())?)?;
            body.write_bytes(chunk)?;
        }
        Self::record(FxDataType::OpaqueBank, &body)
    }

    /// Bank (`FxBk`) of complete program records, as produced by
    /// [`opaque_program`](Self::opaque_program) or
    /// [`regular_program`](Self::regular_program)
    pub fn regular_bank<T: AsRef<[u8]>>(&self, programs: &[T]) -> PresetResult<Vec<u8>> {
        let mut body = TypedStream::new();
        self.bank_header(programs.len())?
            .write(&mut body.writer())?;
        for program in programs {
            body.write_bytes(program.as_ref())?;
        }
        Self::record(FxDataType::RegularBank, &body)
    }
}

/// Builder for VST3 preset files
///
/// Chunk payloads are written in insertion order, followed by the `List`
/// table. [`with_reversed_payloads`](Self::with_reversed_payloads) writes the
/// payloads in reverse order instead while keeping the table order, which
/// produces files whose table offsets are not ascending.
#[derive(Debug, Clone)]
pub struct Vst3PresetBuilder {
    class_id: [u8; 32],
    chunks: Vec<Vst3Chunk>,
    reversed_payloads: bool,
}

#[derive(Debug, Clone)]
struct Vst3Chunk {
    id: FourCC,
    data: Vec<u8>,
    /// Prefix the payload with `VstW` and a wrapper header
    wrapped: bool,
}

impl Vst3Chunk {
    fn payload_len(&self) -> usize {
        if self.wrapped {
            self.data.len() + VSTW_PREFIX_SIZE
        } else {
            self.data.len()
        }
    }

    fn write_payload(&self, stream: &mut TypedStream<'_>) -> PresetResult<()> {
        if self.wrapped {
            stream.write_fourcc(VSTW_MAGIC)?;
            VstWrapperHeader::default().write(&mut stream.writer())?;
        }
        Ok(stream.write_bytes(&self.data)?)
    }
}

impl Vst3PresetBuilder {
    /// Create a builder; `class_id` is truncated or zero padded to 32 bytes
    pub fn new(class_id: &str) -> Self {
        let mut id = [0u8; 32];
        let len = class_id.len().min(id.len());
        id[..len].copy_from_slice(&class_id.as_bytes()[..len]);
        Self {
            class_id: id,
            chunks: Vec::new(),
            reversed_payloads: false,
        }
    }

    /// Add a chunk stored verbatim
    pub fn add_chunk(mut self, id: FourCC, data: Vec<u8>) -> Self {
        self.chunks.push(Vst3Chunk {
            id,
            data,
            wrapped: false,
        });
        self
    }

    /// Add a chunk holding a VST2 fxb/fxp record, optionally inside a
    /// `VstW` wrapper
    pub fn add_vst2_chunk(mut self, id: FourCC, record: Vec<u8>, wrapped: bool) -> Self {
        self.chunks.push(Vst3Chunk {
            id,
            data: record,
            wrapped,
        });
        self
    }

    /// Write payloads in reverse table order
    pub fn with_reversed_payloads(mut self, reversed: bool) -> Self {
        self.reversed_payloads = reversed;
        self
    }

    /// Build the preset file
    pub fn build(&self) -> PresetResult<Vec<u8>> {
        let payload_len: usize = self.chunks.iter().map(Vst3Chunk::payload_len).sum();
        let mut stream = TypedStream::with_capacity(VST3_HEADER_SIZE + payload_len);

        stream.write_fourcc(VST3_MAGIC)?;
        stream.write_u32(1u32.to_le())?;
        stream.write_bytes(&self.class_id)?;
        let list_offset_pos = stream.tell_write();
        stream.write_u64(0)?;

        let mut entries = vec![None; self.chunks.len()];
        let mut order: Vec<usize> = (0..self.chunks.len()).collect();
        if self.reversed_payloads {
            order.reverse();
        }
        for index in order {
            let chunk = &self.chunks[index];
            entries[index] = Some(Vst3ListEntry {
                id: chunk.id,
                offset: stream.tell_write() as u64,
                size: chunk.payload_len() as u64,
            });
            chunk.write_payload(&mut stream)?;
        }

        let list_offset = stream.tell_write() as u64;
        stream.write_fourcc(LIST_MAGIC)?;
        stream.write_u32(size_u32(entries.len())?.to_le())?;
        for entry in entries.into_iter().flatten() {
            entry.write(&mut stream.writer())?;
        }

        let end = stream.tell_write();
        stream.seek_write(list_offset_pos);
        stream.write_u64(list_offset.to_le())?;
        stream.seek_write(end);

        Ok(stream.into_vec())
    }
}
