//! Scoped chunk writer with length backpatching

use std::ops::{Deref, DerefMut};

use crate::error::StreamResult;
use crate::fourcc::FourCC;
use crate::stream::{SizeType, TypedStream};

/// Writes one chunk header on creation and its real length on drop
///
/// The header is written with a zero length placeholder. Everything written
/// through the writer (it dereferences to the stream) between creation and
/// drop becomes the payload; on drop the placeholder is overwritten with
/// `write_pos - placeholder_pos - 4` and the write cursor is restored.
///
/// ```
/// use tagchunk_stream::{ChunkWriter, FourCC, TypedStream};
///
/// let mut stream = TypedStream::new();
/// {
///     let mut cw = ChunkWriter::new(&mut stream, FourCC(*b"EDST"), 1)?;
///     cw.write_bytes(&[1, 2, 3, 4])?;
/// }
/// assert_eq!(stream.size(), 12 + 4);
/// # Ok::<(), tagchunk_stream::StreamError>(())
/// ```
#[derive(Debug)]
pub struct ChunkWriter<'s, 'a> {
    stream: &'s mut TypedStream<'a>,
    length_pos: usize,
}

impl<'s, 'a> ChunkWriter<'s, 'a> {
    /// Write the header of a new chunk
    pub fn new(stream: &'s mut TypedStream<'a>, tag: FourCC, version: u32) -> StreamResult<Self> {
        stream.write_fourcc(tag)?;
        stream.write_u32(version)?;
        let length_pos = stream.tell_write();
        stream.write::<SizeType>(0)?;
        Ok(Self { stream, length_pos })
    }

    /// Payload bytes written so far
    pub fn payload_len(&self) -> usize {
        self.stream
            .tell_write()
            .saturating_sub(self.length_pos + size_of::<SizeType>())
    }

    /// End the chunk now instead of at the end of the scope
    pub fn finish(self) {}
}

impl<'a> Deref for ChunkWriter<'_, 'a> {
    type Target = TypedStream<'a>;

    fn deref(&self) -> &Self::Target {
        self.stream
    }
}

impl DerefMut for ChunkWriter<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.stream
    }
}

impl Drop for ChunkWriter<'_, '_> {
    fn drop(&mut self) {
        let end = self.stream.tell_write();
        // payloads past u32::MAX cannot be represented in the header
        let length = SizeType::try_from(self.payload_len()).unwrap_or(SizeType::MAX);
        self.stream.seek_write(self.length_pos);
        // the placeholder was written successfully, so this cannot run out of room
        let _ = self.stream.write(length);
        self.stream.seek_write(end);
    }
}
