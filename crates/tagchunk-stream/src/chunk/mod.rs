//! Tagged, versioned, length-prefixed chunks
//!
//! # Layout
//!
//! ```text
//! Chunk:
//! ├── tag      [u8; 4]
//! ├── version  u32 (native order)
//! ├── length   u32 (native order)
//! └── payload  [u8; length]
//! ```
//!
//! Chunks nest: a payload may itself be a sequence of chunks.
//! [`ChunkWriter`] emits a chunk and backpatches its length,
//! [`ChunkReader`] walks a sequence of chunks and dispatches payloads to
//! handlers registered per tag.

mod reader;
mod writer;

pub use reader::{ChunkHandler, ChunkReader};
pub use writer::ChunkWriter;

use crate::error::StreamResult;
use crate::fourcc::FourCC;
use crate::stream::{SizeType, TypedStream};

/// Size of a chunk header in bytes
pub const CHUNK_HEADER_SIZE: usize = 12;

/// One chunk whose payload is a window into the parent stream
#[derive(Debug)]
pub struct Chunk<'s> {
    /// Chunk tag
    pub tag: FourCC,
    /// Chunk version
    pub version: u32,
    /// Payload length as declared in the header
    pub length: SizeType,
    /// Payload window
    pub data: TypedStream<'s>,
}

impl Chunk<'_> {
    /// Whether the payload window covers the full declared length
    ///
    /// A chunk whose declared length runs past the parent's end gets a
    /// shorter window that is already at its end.
    pub fn is_complete(&self) -> bool {
        self.data.size() == self.length as usize
    }
}

impl<'a> TypedStream<'a> {
    fn read_chunk_header(&mut self) -> StreamResult<(FourCC, u32, SizeType)> {
        let tag = self.read_fourcc()?;
        let version = self.read_u32()?;
        let length = self.read::<SizeType>()?;
        Ok((tag, version, length))
    }

    /// Read one chunk header and carve its payload window
    ///
    /// A truncated payload is not an error here; see [`Chunk::is_complete`].
    pub fn read_chunk(&mut self) -> StreamResult<Chunk<'_>> {
        let (tag, version, length) = self.read_chunk_header()?;
        Ok(Chunk {
            tag,
            version,
            length,
            data: self.sub_stream(length as usize),
        })
    }

    /// Read a chunk only if it has tag `tag` and a version no newer than
    /// `max_version`
    ///
    /// On a tag or version mismatch, or when there are not even enough bytes
    /// for a header, the read cursor is restored and `None` is returned.
    pub fn try_read_chunk(&mut self, tag: FourCC, max_version: u32) -> Option<Chunk<'_>> {
        let start = self.tell_read();
        match self.read_chunk_header() {
            Ok((found, version, length)) if found == tag && version <= max_version => {
                Some(Chunk {
                    tag: found,
                    version,
                    length,
                    data: self.sub_stream(length as usize),
                })
            }
            _ => {
                self.seek_read(start);
                None
            }
        }
    }

    /// Write a chunk whose payload is produced by `f`
    ///
    /// The length field is backpatched after `f` returns, on the error path
    /// as well.
    pub fn write_chunk<F>(&mut self, tag: FourCC, version: u32, f: F) -> StreamResult<()>
    where
        F: FnOnce(&mut TypedStream<'a>) -> StreamResult<()>,
    {
        let mut writer = ChunkWriter::new(self, tag, version)?;
        f(&mut *writer)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MIRM: FourCC = FourCC(*b"MiRM");
    const MPIO: FourCC = FourCC(*b"mpIO");

    fn sample() -> TypedStream<'static> {
        let mut stream = TypedStream::new();
        stream
            .write_chunk(MIRM, 1, |s| s.write_bytes(&[1, 2, 3]))
            .unwrap();
        stream
            .write_chunk(MPIO, 2, |s| {
                s.write_string("in")?;
                s.write_string("out")
            })
            .unwrap();
        stream
    }

    #[test]
    fn test_read_chunk_sequence() {
        let mut stream = sample();

        {
            let mut chunk = stream.read_chunk().unwrap();
            assert_eq!(chunk.tag, MIRM);
            assert_eq!(chunk.version, 1);
            assert_eq!(chunk.length, 3);
            assert!(chunk.is_complete());
            assert_eq!(chunk.data.read_fixed_bytes::<3>().unwrap(), [1, 2, 3]);
        }
        {
            let mut chunk = stream.read_chunk().unwrap();
            assert_eq!(chunk.tag, MPIO);
            assert_eq!(chunk.version, 2);
            assert_eq!(chunk.data.read_string().unwrap(), "in");
            assert_eq!(chunk.data.read_string().unwrap(), "out");
            assert!(chunk.data.at_end());
        }
        assert!(stream.at_end());
        assert!(stream.read_chunk().is_err());
    }

    #[test]
    fn test_header_layout_is_native_order() {
        let stream = sample();
        let bytes = stream.as_slice();
        assert_eq!(&bytes[..4], b"MiRM");
        assert_eq!(&bytes[4..8], &1u32.to_ne_bytes());
        assert_eq!(&bytes[8..12], &3u32.to_ne_bytes());
        assert_eq!(&bytes[12..15], &[1, 2, 3]);
    }

    #[test]
    fn test_truncated_chunk_is_exhausted_not_an_error() {
        let mut stream = TypedStream::new();
        stream.write_fourcc(MIRM).unwrap();
        stream.write_u32(1).unwrap();
        stream.write_u32(100).unwrap();
        stream.write_bytes(&[1, 2]).unwrap();

        {
            let chunk = stream.read_chunk().unwrap();
            assert_eq!(chunk.length, 100);
            assert!(!chunk.is_complete());
            assert!(chunk.data.at_end());
        }
        assert!(stream.at_end());
    }

    #[test]
    fn test_try_read_chunk_rolls_back_on_mismatch() {
        let mut stream = sample();

        assert!(stream.try_read_chunk(MPIO, 1).is_none(), "wrong tag");
        assert_eq!(stream.tell_read(), 0);

        assert!(stream.try_read_chunk(MIRM, 0).is_none(), "version too new");
        assert_eq!(stream.tell_read(), 0);

        let chunk = stream.try_read_chunk(MIRM, 1).unwrap();
        assert_eq!(chunk.length, 3);
        drop(chunk);
        assert_eq!(stream.tell_read(), CHUNK_HEADER_SIZE + 3);

        // Older versions are accepted
        assert!(stream.try_read_chunk(MPIO, 5).is_some());
    }

    #[test]
    fn test_try_read_chunk_at_end() {
        let data = [b'M', b'i'];
        let mut stream = TypedStream::borrowed(&data);
        assert!(stream.try_read_chunk(MIRM, 1).is_none());
        assert_eq!(stream.tell_read(), 0);
    }

    #[test]
    fn test_nested_chunks() {
        let mut stream = TypedStream::new();
        stream
            .write_chunk(FourCC(*b"OUTR"), 1, |outer| {
                outer.write_chunk(FourCC(*b"INNR"), 3, |inner| inner.write_u32(42))?;
                outer.write_u8(9)
            })
            .unwrap();

        let mut outer = stream.read_chunk().unwrap();
        assert_eq!(outer.length as usize, CHUNK_HEADER_SIZE + 4 + 1);
        {
            let mut inner = outer.data.read_chunk().unwrap();
            assert_eq!(inner.tag, FourCC(*b"INNR"));
            assert_eq!(inner.version, 3);
            assert_eq!(inner.data.read_u32().unwrap(), 42);
        }
        assert_eq!(outer.data.read_u8().unwrap(), 9);
        assert!(outer.data.at_end());
    }
}
