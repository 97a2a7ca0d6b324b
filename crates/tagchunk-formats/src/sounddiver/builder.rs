//! Sounddiver library builder

use binrw::{BinWrite, Endian};
use tagchunk_stream::{FourCC, SizeType, TypedStream};

use super::entry::ListEntry;
use super::error::{SounddiverError, SounddiverResult};
use super::{FORM_MAGIC, LENT_TAG, SSLB_TAG};

/// Builder for Sounddiver library files
///
/// Entries and extra chunks are written as `SSLB` sub-chunks in the order
/// they were added.
#[derive(Debug, Clone)]
pub struct SounddiverLibraryBuilder {
    byte_order: Endian,
    chunks: Vec<(FourCC, Payload)>,
}

#[derive(Debug, Clone)]
enum Payload {
    Entry(Box<ListEntry>),
    Raw(Vec<u8>),
}

impl Default for SounddiverLibraryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SounddiverLibraryBuilder {
    /// Create a big-endian (`FORM`) builder
    pub fn new() -> Self {
        Self {
            byte_order: Endian::Big,
            chunks: Vec::new(),
        }
    }

    /// Set the byte order; little-endian files start with `MROF`
    pub fn with_byte_order(mut self, byte_order: Endian) -> Self {
        self.byte_order = byte_order;
        self
    }

    /// Add an entry as a `LENT` chunk
    pub fn add_entry(mut self, entry: ListEntry) -> Self {
        self.chunks.push((LENT_TAG, Payload::Entry(Box::new(entry))));
        self
    }

    /// Add a chunk with a raw payload
    pub fn add_chunk(mut self, tag: FourCC, data: Vec<u8>) -> Self {
        self.chunks.push((tag, Payload::Raw(data)));
        self
    }

    fn write_tag(&self, stream: &mut TypedStream<'_>, tag: FourCC) -> SounddiverResult<()> {
        let tag = match self.byte_order {
            Endian::Big => tag,
            Endian::Little => tag.reversed(),
        };
        Ok(stream.write_fourcc(tag)?)
    }

    fn write_chunk(
        &self,
        stream: &mut TypedStream<'_>,
        tag: FourCC,
        payload: &[u8],
    ) -> SounddiverResult<()> {
        let length = SizeType::try_from(payload.len()).map_err(|_| SounddiverError::ChunkTooLarge {
            tag,
            length: SizeType::MAX,
            remaining: payload.len(),
        })?;
        self.write_tag(stream, tag)?;
        length.write_options(&mut stream.writer(), self.byte_order, ())?;
        Ok(stream.write_bytes(payload)?)
    }

    /// Build the library file
    pub fn build(&self) -> SounddiverResult<Vec<u8>> {
        let mut library = TypedStream::new();
        self.write_tag(&mut library, SSLB_TAG)?;
        for (tag, payload) in &self.chunks {
            match payload {
                Payload::Entry(entry) => {
                    let bytes = entry.to_bytes(self.byte_order)?;
                    self.write_chunk(&mut library, *tag, &bytes)?;
                }
                Payload::Raw(bytes) => self.write_chunk(&mut library, *tag, bytes)?,
            }
        }

        let mut file = TypedStream::with_capacity(library.size() + 8);
        self.write_chunk(&mut file, FORM_MAGIC, library.as_slice())?;
        Ok(file.into_vec())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_library_layout() {
        let big = SounddiverLibraryBuilder::new().build().unwrap();
        assert_eq!(big, b"FORM\0\0\0\x04SSLB");

        let little = SounddiverLibraryBuilder::new()
            .with_byte_order(Endian::Little)
            .build()
            .unwrap();
        assert_eq!(little, b"MROF\x04\0\0\0BLSS");
    }

    #[test]
    fn test_raw_chunk_layout() {
        let data = SounddiverLibraryBuilder::new()
            .with_byte_order(Endian::Little)
            .add_chunk(FourCC(*b"LHDR"), vec![9, 8])
            .build()
            .unwrap();
        assert_eq!(&data[12..16], b"RDHL");
        assert_eq!(&data[16..20], &2u32.to_le_bytes());
        assert_eq!(&data[20..], &[9, 8]);
    }
}
