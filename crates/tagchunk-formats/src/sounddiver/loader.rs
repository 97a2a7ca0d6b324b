//! Sounddiver library loading

use std::ops::Range;
use std::path::Path;

use binrw::{BinRead, Endian};
use tagchunk_stream::{FourCC, TypedStream};
use tracing::{debug, warn};

use super::entry::{LENT_HEADER_SIZE, ListEntry};
use super::error::{SounddiverError, SounddiverResult};
use super::{FORM_MAGIC, LENT_TAG, MROF_MAGIC, SSLB_TAG};
use crate::config::ParserConfig;

/// Chunk located inside its container's bytes
struct ChunkSpan {
    tag: FourCC,
    range: Range<usize>,
}

/// Tags are stored reversed in little-endian files
fn read_tag(stream: &mut TypedStream<'_>, endian: Endian) -> SounddiverResult<FourCC> {
    let tag = stream.read_fourcc()?;
    Ok(match endian {
        Endian::Big => tag,
        Endian::Little => tag.reversed(),
    })
}

/// Read `tag | length | payload` records until the stream is exhausted
fn scan_chunks(
    stream: &mut TypedStream<'_>,
    endian: Endian,
    config: &ParserConfig,
) -> SounddiverResult<Vec<ChunkSpan>> {
    let mut chunks = Vec::new();
    while !stream.at_end() {
        if chunks.len() == config.max_chunks {
            return Err(SounddiverError::TooManyChunks {
                limit: config.max_chunks,
            });
        }

        let tag = read_tag(stream, endian)?;
        let length = u32::read_options(&mut stream.reader(), endian, ())?;
        let remaining = stream.remaining();
        if length as usize > remaining {
            return Err(SounddiverError::ChunkTooLarge {
                tag,
                length,
                remaining,
            });
        }

        let start = stream.tell_read();
        stream.skip(length as usize)?;
        chunks.push(ChunkSpan {
            tag,
            range: start..start + length as usize,
        });
    }
    Ok(chunks)
}

/// Detect the byte order from the container magic
fn detect_byte_order(data: &[u8]) -> SounddiverResult<Endian> {
    if data.len() < 8 {
        return Err(SounddiverError::TooShort(data.len()));
    }
    match FourCC::from_prefix(data) {
        Some(FORM_MAGIC) => Ok(Endian::Big),
        Some(MROF_MAGIC) => Ok(Endian::Little),
        other => Err(SounddiverError::InvalidMagic(other.unwrap_or_default())),
    }
}

fn parse_library(data: &[u8], config: &ParserConfig) -> SounddiverResult<SounddiverLibrary> {
    config.validate().map_err(SounddiverError::InvalidConfig)?;

    let endian = detect_byte_order(data)?;
    debug!("Sounddiver library, {endian:?} byte order");

    let mut stream = TypedStream::borrowed(data);
    let roots = scan_chunks(&mut stream, endian, config)?;
    let [root] = roots.as_slice() else {
        return Err(SounddiverError::UnexpectedRootChunks(roots.len()));
    };

    let root_data = &data[root.range.clone()];
    let mut stream = TypedStream::borrowed(root_data);
    let tag = read_tag(&mut stream, endian)?;
    if tag != SSLB_TAG {
        return Err(SounddiverError::MissingLibraryTag(tag));
    }
    let chunks = scan_chunks(&mut stream, endian, config)?;

    let mut entries = Vec::new();
    for chunk in chunks.iter().filter(|c| c.tag == LENT_TAG) {
        let payload = &root_data[chunk.range.clone()];
        if payload.len() < LENT_HEADER_SIZE {
            debug!(
                "Skipping LENT chunk of {} bytes, header needs {}",
                payload.len(),
                LENT_HEADER_SIZE
            );
            continue;
        }
        entries.push(ListEntry::parse(payload, endian)?);
    }

    debug!("Loaded {} Sounddiver entries", entries.len());
    Ok(SounddiverLibrary {
        byte_order: Some(endian),
        entries,
    })
}

/// Entries of a Sounddiver library file
///
/// A library is a `FORM` container (`MROF` with reversed tags when written
/// little-endian) holding one `SSLB` chunk, whose sub-chunks include one
/// `LENT` chunk per entry.
///
/// ```
/// use tagchunk_formats::sounddiver::{ListEntry, SounddiverLibrary, SounddiverLibraryBuilder};
///
/// let entry = ListEntry { name: "Init".to_string(), ..ListEntry::default() };
/// let data = SounddiverLibraryBuilder::new().add_entry(entry).build()?;
///
/// let library = SounddiverLibrary::load(&data);
/// assert_eq!(library.entries()[0].name, "Init");
/// # Ok::<(), tagchunk_formats::sounddiver::SounddiverError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SounddiverLibrary {
    byte_order: Option<Endian>,
    entries: Vec<ListEntry>,
}

impl SounddiverLibrary {
    /// Load every entry of `data`
    ///
    /// Damaged or foreign input yields an empty library; the reason is
    /// logged. Use [`try_load`](Self::try_load) to get it as an error.
    pub fn load(data: &[u8]) -> Self {
        Self::load_with_config(data, &ParserConfig::default())
    }

    /// [`load`](Self::load) with explicit limits
    pub fn load_with_config(data: &[u8], config: &ParserConfig) -> Self {
        match parse_library(data, config) {
            Ok(library) => library,
            Err(SounddiverError::TooShort(_)) => Self::default(),
            Err(e) if e.is_format_mismatch() => {
                debug!("Not a Sounddiver library: {e}");
                Self::default()
            }
            Err(e) => {
                warn!("Error loading Sounddiver library: {e}");
                Self::default()
            }
        }
    }

    /// Load every entry of `data`, reporting why it failed
    pub fn try_load(data: &[u8]) -> SounddiverResult<Self> {
        parse_library(data, &ParserConfig::default())
    }

    /// [`try_load`](Self::try_load) with explicit limits
    pub fn try_load_with_config(data: &[u8], config: &ParserConfig) -> SounddiverResult<Self> {
        parse_library(data, config)
    }

    /// Load a library file
    pub fn from_file(path: impl AsRef<Path>) -> SounddiverResult<Self> {
        let data = std::fs::read(path)?;
        Self::try_load(&data)
    }

    /// Whether `data` is long enough and starts with `FORM` or `MROF`
    pub fn is_valid_data(data: &[u8]) -> bool {
        detect_byte_order(data).is_ok()
    }

    /// Byte order of the loaded file, `None` if nothing was loaded
    pub fn byte_order(&self) -> Option<Endian> {
        self.byte_order
    }

    /// Entries in file order
    pub fn entries(&self) -> &[ListEntry] {
        &self.entries
    }

    /// Consume the library and return its entries
    pub fn into_entries(self) -> Vec<ListEntry> {
        self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries were loaded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::sounddiver::SounddiverLibraryBuilder;

    fn entry(name: &str) -> ListEntry {
        ListEntry {
            name: name.to_string(),
            ..ListEntry::default()
        }
    }

    #[test]
    fn test_is_valid_data() {
        assert!(SounddiverLibrary::is_valid_data(b"FORM\0\0\0\0"));
        assert!(SounddiverLibrary::is_valid_data(b"MROF\0\0\0\0"));
        assert!(!SounddiverLibrary::is_valid_data(b"FORM\0\0\0"));
        assert!(!SounddiverLibrary::is_valid_data(b"RIFF\0\0\0\0"));
    }

    #[test]
    fn test_short_and_foreign_input_are_empty() {
        assert!(SounddiverLibrary::load(b"FORM").is_empty());
        assert!(matches!(
            SounddiverLibrary::try_load(b"FORM"),
            Err(SounddiverError::TooShort(4))
        ));
        assert!(matches!(
            SounddiverLibrary::try_load(b"RIFF\0\0\0\0"),
            Err(SounddiverError::InvalidMagic(tag)) if tag == FourCC(*b"RIFF")
        ));
        assert_eq!(SounddiverLibrary::load(b"RIFF\0\0\0\0").byte_order(), None);
    }

    #[test]
    fn test_both_byte_orders() {
        for endian in [Endian::Big, Endian::Little] {
            let data = SounddiverLibraryBuilder::new()
                .with_byte_order(endian)
                .add_entry(entry("one"))
                .add_entry(entry("two"))
                .build()
                .unwrap();
            let magic = if endian == Endian::Big { b"FORM" } else { b"MROF" };
            assert_eq!(&data[..4], magic);

            let library = SounddiverLibrary::try_load(&data).unwrap();
            assert_eq!(library.byte_order(), Some(endian));
            let names: Vec<_> = library.entries().iter().map(|e| e.name.as_str()).collect();
            assert_eq!(names, ["one", "two"]);
        }
    }

    #[test]
    fn test_non_lent_and_short_lent_chunks_skipped() {
        let data = SounddiverLibraryBuilder::new()
            .add_chunk(FourCC(*b"LHDR"), vec![1, 2, 3])
            .add_entry(entry("kept"))
            .add_chunk(LENT_TAG, vec![0; LENT_HEADER_SIZE - 1])
            .build()
            .unwrap();
        let library = SounddiverLibrary::try_load(&data).unwrap();
        assert_eq!(library.len(), 1);
        assert_eq!(library.into_entries()[0].name, "kept");
    }

    #[test]
    fn test_missing_library_tag() {
        let mut data = SounddiverLibraryBuilder::new()
            .add_entry(entry("x"))
            .build()
            .unwrap();
        data[8..12].copy_from_slice(b"XXXX");
        assert!(matches!(
            SounddiverLibrary::try_load(&data),
            Err(SounddiverError::MissingLibraryTag(_))
        ));
        assert!(SounddiverLibrary::load(&data).is_empty());
    }

    #[test]
    fn test_chunk_limit() {
        let data = SounddiverLibraryBuilder::new()
            .add_entry(entry("a"))
            .add_entry(entry("b"))
            .add_entry(entry("c"))
            .build()
            .unwrap();
        let config = ParserConfig::new().with_max_chunks(2);
        assert!(matches!(
            SounddiverLibrary::try_load_with_config(&data, &config),
            Err(SounddiverError::TooManyChunks { limit: 2 })
        ));
        assert!(SounddiverLibrary::load_with_config(&data, &config).is_empty());
    }
}
