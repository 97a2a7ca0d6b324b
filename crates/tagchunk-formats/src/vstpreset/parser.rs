//! fxb/fxp and VST3 chunk list parsing

use binrw::BinRead;
use tagchunk_stream::{FourCC, TypedStream};
use tracing::{debug, warn};

use super::error::{PresetError, PresetResult};
use super::header::{
    CCNK_MAGIC, FxBankHeader, FxDataType, FxProgramHeader, LIST_MAGIC, VST3_MAGIC, VSTW_MAGIC,
    Vst3Header, Vst3ListEntry, VstWrapperHeader,
};
use super::{ChunkList, PresetChunk};
use crate::config::ParserConfig;

fn read_u32_be(stream: &mut TypedStream<'_>) -> PresetResult<u32> {
    Ok(u32::from_be(stream.read_u32()?))
}

fn read_u32_le(stream: &mut TypedStream<'_>) -> PresetResult<u32> {
    Ok(u32::from_le(stream.read_u32()?))
}

/// Read an opaque blob of `size` bytes, rejecting sizes past the input
fn read_blob(stream: &mut TypedStream<'_>, size: u32, what: &'static str) -> PresetResult<Vec<u8>> {
    let available = stream.remaining();
    if size as usize > available {
        return Err(PresetError::SizeInconsistency {
            what,
            declared: u64::from(size),
            available,
        });
    }
    Ok(stream.read_bytes(size as usize)?)
}

/// Parse one VST2 fxb/fxp record at the read cursor
///
/// `depth` is the nesting level of this record, starting at 1. Opaque
/// records yield one chunk per program. Regular programs yield nothing:
/// their float parameters are skipped, not retained.
pub fn read_fxb_fxp(
    stream: &mut TypedStream<'_>,
    depth: u32,
    config: &ParserConfig,
) -> PresetResult<ChunkList> {
    if depth > config.max_nesting_depth {
        return Err(PresetError::NestingTooDeep(config.max_nesting_depth));
    }

    let magic = stream.read_fourcc()?;
    if magic != CCNK_MAGIC {
        return Err(PresetError::UnrecognizedMagic(magic));
    }
    let _length = read_u32_be(stream)?;
    let data_type = stream.read_fourcc()?;

    match FxDataType::from_fourcc(data_type) {
        Some(kind) if kind.is_bank() => read_bank(stream, kind, depth, config),
        Some(kind) => read_program(stream, kind),
        None => Err(PresetError::UnrecognizedDataType(data_type)),
    }
}

fn read_bank(
    stream: &mut TypedStream<'_>,
    kind: FxDataType,
    depth: u32,
    config: &ParserConfig,
) -> PresetResult<ChunkList> {
    let header = FxBankHeader::read(&mut stream.reader())?;
    let mut chunks = ChunkList::new();

    for _ in 0..header.num_programs {
        if kind.is_opaque() {
            let size = read_u32_be(stream)?;
            if size == 0 {
                continue;
            }
            chunks.push(PresetChunk::opaque(read_blob(stream, size, "bank chunk")?));
        } else {
            chunks.extend(read_fxb_fxp(stream, depth + 1, config)?);
        }
    }

    Ok(chunks)
}

fn read_program(stream: &mut TypedStream<'_>, kind: FxDataType) -> PresetResult<ChunkList> {
    let header = FxProgramHeader::read(&mut stream.reader())?;

    if kind.is_opaque() {
        let size = read_u32_be(stream)?;
        if size == 0 {
            return Err(PresetError::EmptyProgramChunk);
        }
        return Ok(vec![PresetChunk::opaque(read_blob(
            stream,
            size,
            "program chunk",
        )?)]);
    }

    let params = (header.num_params as usize)
        .checked_mul(size_of::<f32>())
        .unwrap_or(usize::MAX);
    stream.skip(params)?;
    Ok(ChunkList::new())
}

/// Parse a VST3 preset at the read cursor
///
/// Chunk payloads are located through the `List` table, so their order on
/// disk does not matter. Payloads holding a VST2 record (bare or wrapped in
/// `VstW`) are unpacked; everything else is kept verbatim with its id.
pub fn read_vst3(stream: &mut TypedStream<'_>, config: &ParserConfig) -> PresetResult<ChunkList> {
    let magic = stream.read_fourcc()?;
    if magic != VST3_MAGIC {
        return Err(PresetError::UnrecognizedMagic(magic));
    }

    let header = Vst3Header::read(&mut stream.reader())?;
    if header.version != 1 {
        return Err(PresetError::UnsupportedVersion(header.version));
    }

    let list_offset = header.list_offset as usize;
    if list_offset > stream.size() {
        return Err(PresetError::SizeInconsistency {
            what: "chunk list offset",
            declared: u64::from(header.list_offset),
            available: stream.size(),
        });
    }
    stream.seek_read(list_offset);

    let list_magic = stream.read_fourcc()?;
    if list_magic != LIST_MAGIC {
        return Err(PresetError::MissingChunkList(list_magic));
    }

    let count = read_u32_le(stream)? as usize;
    if count > config.max_chunks {
        return Err(PresetError::TooManyChunks {
            count,
            limit: config.max_chunks,
        });
    }

    let mut chunks = ChunkList::new();
    let mut total = 0u64;
    for _ in 0..count {
        let entry = Vst3ListEntry::read(&mut stream.reader())?;
        if entry.size == 0 {
            debug!("Skipping empty VST3 chunk {}", entry.id);
            continue;
        }

        let data = read_entry_payload(stream, &entry, &mut total, config)?;
        unpack_vst3_chunk(entry.id, data, &mut chunks, config)?;
    }

    Ok(chunks)
}

/// Copy one table entry's payload, adding its size to `total`
fn read_entry_payload(
    stream: &mut TypedStream<'_>,
    entry: &Vst3ListEntry,
    total: &mut u64,
    config: &ParserConfig,
) -> PresetResult<Vec<u8>> {
    let available = stream.size();
    let end = entry.offset.checked_add(entry.size);
    let in_bounds = end.is_some_and(|end| end <= available as u64);
    if !in_bounds {
        return Err(PresetError::SizeInconsistency {
            what: "VST3 chunk",
            declared: end.unwrap_or(u64::MAX),
            available,
        });
    }

    // Entries may share a payload, so the file size does not bound this
    *total = total.saturating_add(entry.size);
    if *total > config.max_output_bytes {
        return Err(PresetError::OutputTooLarge {
            total: *total,
            limit: config.max_output_bytes,
        });
    }

    let table_pos = stream.tell_read();
    stream.seek_read(entry.offset as usize);
    let data = stream.read_bytes(entry.size as usize);
    stream.seek_read(table_pos);
    Ok(data?)
}

fn unpack_vst3_chunk(
    id: FourCC,
    data: Vec<u8>,
    chunks: &mut ChunkList,
    config: &ParserConfig,
) -> PresetResult<()> {
    let embedded = {
        let mut inner = TypedStream::borrowed(&data);
        match inner.peek_fourcc() {
            Some(VSTW_MAGIC) => {
                inner.skip(4)?;
                let wrapper = VstWrapperHeader::read(&mut inner.reader())?;
                if !wrapper.is_well_formed() {
                    warn!(
                        "VstW wrapper in chunk {} has length {} and version {}, expected 8 and 1",
                        id, wrapper.len, wrapper.version
                    );
                }
                Some(read_fxb_fxp(&mut inner, 2, config))
            }
            Some(CCNK_MAGIC) => Some(read_fxb_fxp(&mut inner, 2, config)),
            _ => None,
        }
    };

    match embedded {
        Some(Ok(vst2)) => chunks.extend(vst2),
        Some(Err(e)) if e.is_format_mismatch() => {
            debug!("Dropping VST3 chunk {id}, embedded VST2 data not usable: {e}");
        }
        Some(Err(e)) => return Err(e),
        None => chunks.push(PresetChunk::new(id, data)),
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::vstpreset::VstPreset;
    use crate::vstpreset::builder::{Vst2PresetBuilder, Vst3PresetBuilder};
    use pretty_assertions::assert_eq;

    fn read_preset(data: &[u8], config: &ParserConfig) -> PresetResult<ChunkList> {
        VstPreset::read_with_config(data, config).map(VstPreset::into_chunks)
    }

    fn builder() -> Vst2PresetBuilder {
        Vst2PresetBuilder::new(FourCC(*b"TEST"))
    }

    #[test]
    fn test_opaque_program() {
        let fxp = builder().opaque_program("Lead", &[1, 2, 3]).unwrap();
        let mut stream = TypedStream::borrowed(&fxp);
        let chunks = read_fxb_fxp(&mut stream, 1, &ParserConfig::default()).unwrap();
        assert_eq!(chunks, vec![PresetChunk::opaque(vec![1, 2, 3])]);
        assert!(stream.at_end());
    }

    #[test]
    fn test_empty_opaque_program_is_mismatch() {
        let fxp = builder().opaque_program("Empty", &[]).unwrap();
        let mut stream = TypedStream::borrowed(&fxp);
        let err = read_fxb_fxp(&mut stream, 1, &ParserConfig::default()).unwrap_err();
        assert!(matches!(err, PresetError::EmptyProgramChunk));
        assert!(err.is_format_mismatch());
    }

    #[test]
    fn test_regular_program_yields_no_chunks() {
        let fxp = builder().regular_program("Pad", &[0.25, 0.5, 1.0]).unwrap();
        let mut stream = TypedStream::borrowed(&fxp);
        let chunks = read_fxb_fxp(&mut stream, 1, &ParserConfig::default()).unwrap();
        assert!(chunks.is_empty());
        assert!(stream.at_end(), "parameters are skipped, not left behind");
    }

    #[test]
    fn test_opaque_bank_skips_empty_programs() {
        let fxb = builder()
            .opaque_bank(&[vec![1u8], vec![], vec![2, 2]])
            .unwrap();
        let chunks = read_preset(&fxb, &ParserConfig::default()).unwrap();
        assert_eq!(
            chunks,
            vec![PresetChunk::opaque(vec![1]), PresetChunk::opaque(vec![2, 2])]
        );
    }

    #[test]
    fn test_regular_bank_with_failing_program_fails() {
        let good = builder().opaque_program("A", &[9]).unwrap();
        let empty = builder().opaque_program("B", &[]).unwrap();
        let fxb = builder().regular_bank(&[good, empty]).unwrap();
        let err = read_preset(&fxb, &ParserConfig::default()).unwrap_err();
        assert!(matches!(err, PresetError::EmptyProgramChunk));
    }

    #[test]
    fn test_oversized_blob_is_size_inconsistency() {
        let mut fxp = builder().opaque_program("Cut", &[1, 2, 3, 4]).unwrap();
        fxp.truncate(fxp.len() - 2);
        let err = read_preset(&fxp, &ParserConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            PresetError::SizeInconsistency {
                declared: 4,
                available: 2,
                ..
            }
        ));
        assert!(!err.is_format_mismatch());
    }

    #[test]
    fn test_unknown_data_type() {
        let mut fxp = builder().opaque_program("X", &[1]).unwrap();
        fxp[8..12].copy_from_slice(b"FxXX");
        let err = read_preset(&fxp, &ParserConfig::default()).unwrap_err();
        assert!(matches!(err, PresetError::UnrecognizedDataType(_)));
    }

    #[test]
    fn test_vst3_keeps_foreign_chunks_and_unpacks_vst2() {
        let fxp = builder().opaque_program("P", &[7, 7]).unwrap();
        let vst3 = Vst3PresetBuilder::new("0123456789ABCDEF0123456789ABCDEF")
            .add_chunk(FourCC(*b"Cont"), vec![0xC0, 0x01])
            .add_vst2_chunk(FourCC(*b"Comp"), fxp.clone(), true)
            .add_vst2_chunk(FourCC(*b"Comp"), fxp, false)
            .add_chunk(FourCC(*b"Info"), Vec::new())
            .build()
            .unwrap();

        let chunks = read_preset(&vst3, &ParserConfig::default()).unwrap();
        assert_eq!(
            chunks,
            vec![
                PresetChunk::new(FourCC(*b"Cont"), vec![0xC0, 0x01]),
                PresetChunk::opaque(vec![7, 7]),
                PresetChunk::opaque(vec![7, 7]),
            ]
        );
    }

    #[test]
    fn test_vst3_short_chunk_kept_verbatim() {
        let vst3 = Vst3PresetBuilder::new("id")
            .add_chunk(FourCC(*b"Comp"), vec![b'C', b'c'])
            .build()
            .unwrap();
        let chunks = read_preset(&vst3, &ParserConfig::default()).unwrap();
        assert_eq!(chunks, vec![PresetChunk::new(FourCC(*b"Comp"), vec![b'C', b'c'])]);
    }

    #[test]
    fn test_vst3_embedded_mismatch_drops_chunk() {
        let regular = builder().regular_program("R", &[0.0]).unwrap();
        let empty = builder().opaque_program("E", &[]).unwrap();
        let vst3 = Vst3PresetBuilder::new("id")
            .add_vst2_chunk(FourCC(*b"Comp"), empty, true)
            .add_vst2_chunk(FourCC(*b"Comp"), regular, false)
            .add_chunk(FourCC(*b"Cont"), vec![1])
            .build()
            .unwrap();
        let chunks = read_preset(&vst3, &ParserConfig::default()).unwrap();
        assert_eq!(chunks, vec![PresetChunk::new(FourCC(*b"Cont"), vec![1])]);
    }

    #[test]
    fn test_vst3_embedded_hard_error_fails_parse() {
        let mut fxp = builder().opaque_program("P", &[1, 2, 3, 4]).unwrap();
        fxp.truncate(fxp.len() - 1);
        let vst3 = Vst3PresetBuilder::new("id")
            .add_vst2_chunk(FourCC(*b"Comp"), fxp, true)
            .build()
            .unwrap();
        let err = read_preset(&vst3, &ParserConfig::default()).unwrap_err();
        assert!(matches!(err, PresetError::SizeInconsistency { .. }));
    }

    #[test]
    fn test_vst3_version_and_list_checks() {
        let vst3 = Vst3PresetBuilder::new("id")
            .add_chunk(FourCC(*b"Cont"), vec![1])
            .build()
            .unwrap();

        let mut bad_version = vst3.clone();
        bad_version[4..8].copy_from_slice(&2u32.to_le_bytes());
        assert!(matches!(
            read_preset(&bad_version, &ParserConfig::default()),
            Err(PresetError::UnsupportedVersion(2))
        ));

        let mut bad_offset = vst3.clone();
        bad_offset[40..44].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            read_preset(&bad_offset, &ParserConfig::default()),
            Err(PresetError::SizeInconsistency { .. })
        ));

        let mut no_list = vst3;
        no_list[40..44].copy_from_slice(&0u32.to_le_bytes());
        assert!(matches!(
            read_preset(&no_list, &ParserConfig::default()),
            Err(PresetError::MissingChunkList(tag)) if tag == VST3_MAGIC
        ));
    }

    #[test]
    fn test_vst3_entry_past_end() {
        let mut vst3 = Vst3PresetBuilder::new("id")
            .add_chunk(FourCC(*b"Cont"), vec![1, 2, 3])
            .build()
            .unwrap();
        // The single entry's size field is the last 8 bytes
        let len = vst3.len();
        vst3[len - 8..].copy_from_slice(&u64::MAX.to_le_bytes());
        assert!(matches!(
            read_preset(&vst3, &ParserConfig::default()),
            Err(PresetError::SizeInconsistency {
                what: "VST3 chunk",
                ..
            })
        ));
    }

    #[test]
    fn test_vst3_chunk_count_limit() {
        let vst3 = Vst3PresetBuilder::new("id")
            .add_chunk(FourCC(*b"AAAA"), vec![1])
            .add_chunk(FourCC(*b"BBBB"), vec![2])
            .add_chunk(FourCC(*b"CCCC"), vec![3])
            .build()
            .unwrap();
        let config = ParserConfig::new().with_max_chunks(2);
        assert!(matches!(
            read_preset(&vst3, &config),
            Err(PresetError::TooManyChunks { count: 3, limit: 2 })
        ));
    }

    #[test]
    fn test_vst3_shared_payload_counts_toward_output_limit() {
        let mut vst3 = Vst3PresetBuilder::new("id")
            .add_chunk(FourCC(*b"AAAA"), vec![7; 100])
            .add_chunk(FourCC(*b"BBBB"), vec![8; 100])
            .build()
            .unwrap();
        // Point the second entry at the first payload
        let len = vst3.len();
        let second_offset = len - 16;
        vst3[second_offset..second_offset + 8].copy_from_slice(&48u64.to_le_bytes());

        let shared = read_preset(&vst3, &ParserConfig::default()).unwrap();
        assert_eq!(shared[1].data, vec![7; 100]);

        let config = ParserConfig::new().with_max_output_bytes(150);
        assert!(matches!(
            read_preset(&vst3, &config),
            Err(PresetError::OutputTooLarge {
                total: 200,
                limit: 150
            })
        ));
        assert!(VstPreset::parse_with_config(&vst3, &config).is_none());
    }

    #[test]
    fn test_nesting_limit() {
        let program = builder().opaque_program("P", &[1]).unwrap();
        let inner = builder().regular_bank(&[program]).unwrap();
        let outer = builder().regular_bank(&[inner]).unwrap();

        let chunks = read_preset(&outer, &ParserConfig::default()).unwrap();
        assert_eq!(chunks, vec![PresetChunk::opaque(vec![1])]);

        let shallow = ParserConfig::new().with_max_nesting_depth(2);
        assert!(matches!(
            read_preset(&outer, &shallow),
            Err(PresetError::NestingTooDeep(2))
        ));
    }

    #[test]
    fn test_unknown_and_short_input() {
        assert!(matches!(
            read_preset(b"RIFF....", &ParserConfig::default()),
            Err(PresetError::UnrecognizedMagic(tag)) if tag == FourCC(*b"RIFF")
        ));
        assert!(matches!(
            read_preset(b"Cc", &ParserConfig::default()),
            Err(PresetError::Stream(_))
        ));
    }
}
