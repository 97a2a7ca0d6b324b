//! Typed reads and writes over a [`ByteBuffer`]
//!
//! Multi-byte values use the host's native byte order. Format code that needs
//! a fixed byte order converts explicitly (`u32::from_be`) or reads through
//! [`TypedStream::reader`] with a `binrw` type that declares its endianness.

use crate::buffer::ByteBuffer;
use crate::error::{StreamError, StreamResult};
use crate::fourcc::FourCC;
use crate::io::{StreamReader, StreamWriter};

mod sealed {
    pub trait Sealed {}
}

/// Fixed-size values that can be read and written in native byte order
///
/// Implemented for the primitive integer and float types only.
pub trait Scalar: sealed::Sealed + Copy {
    /// Byte representation
    type Bytes: AsRef<[u8]> + AsMut<[u8]> + Default;

    /// Size in bytes
    const SIZE: usize;

    /// Decode from native-order bytes
    fn from_ne_bytes(bytes: Self::Bytes) -> Self;

    /// Encode to native-order bytes
    fn to_ne_bytes(self) -> Self::Bytes;
}

macro_rules! impl_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}

            impl Scalar for $ty {
                type Bytes = [u8; std::mem::size_of::<$ty>()];

                const SIZE: usize = std::mem::size_of::<$ty>();

                fn from_ne_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_ne_bytes(bytes)
                }

                fn to_ne_bytes(self) -> Self::Bytes {
                    <$ty>::to_ne_bytes(self)
                }
            }
        )*
    };
}

impl_scalar!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

/// Length prefix used by vectors, strings and chunk headers
pub type SizeType = u32;

/// Typed stream over a single [`ByteBuffer`]
#[derive(Debug, Default)]
pub struct TypedStream<'a> {
    buffer: ByteBuffer<'a>,
}

impl<'a> TypedStream<'a> {
    /// Create an empty growable stream
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty growable stream with reserved capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_buffer(ByteBuffer::with_capacity(capacity))
    }

    /// Stream over owned bytes; reading starts at 0, writing appends
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self::from_buffer(ByteBuffer::from_vec(data))
    }

    /// Read-only stream over borrowed bytes
    pub fn borrowed(data: &'a [u8]) -> Self {
        Self::from_buffer(ByteBuffer::borrowed(data))
    }

    /// Fixed-size writable stream over borrowed bytes
    pub fn fixed(data: &'a mut [u8]) -> Self {
        Self::from_buffer(ByteBuffer::fixed(data))
    }

    /// Wrap an existing buffer
    pub fn from_buffer(buffer: ByteBuffer<'a>) -> Self {
        Self { buffer }
    }

    /// Underlying buffer
    pub fn buffer(&self) -> &ByteBuffer<'a> {
        &self.buffer
    }

    /// Consume the stream and return its bytes
    pub fn into_vec(self) -> Vec<u8> {
        self.buffer.into_vec()
    }

    /// All bytes of the stream
    pub fn as_slice(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    /// Bytes written so far (everything before the write cursor)
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.append_to(&mut out);
        out
    }

    /// Append the bytes written so far to `out`
    pub fn append_to(&self, out: &mut Vec<u8>) {
        let data = self.buffer.as_slice();
        let end = self.buffer.tell_write().min(data.len());
        out.extend_from_slice(&data[..end]);
    }

    /// Size of the stream
    pub fn size(&self) -> usize {
        self.buffer.size()
    }

    /// Unread bytes
    pub fn remaining(&self) -> usize {
        self.buffer.remaining()
    }

    /// Read cursor position
    pub fn tell_read(&self) -> usize {
        self.buffer.tell_read()
    }

    /// Move the read cursor (clamped to the end)
    pub fn seek_read(&mut self, pos: usize) {
        self.buffer.seek_read(pos);
    }

    /// Write cursor position
    pub fn tell_write(&self) -> usize {
        self.buffer.tell_write()
    }

    /// Move the write cursor
    pub fn seek_write(&mut self, pos: usize) {
        self.buffer.seek_write(pos);
    }

    /// Whether every byte has been read
    pub fn at_end(&self) -> bool {
        self.buffer.at_end()
    }

    /// Whether any access has run past the end
    pub fn failed(&self) -> bool {
        self.buffer.failed()
    }

    /// `std::io::Read + Seek` adapter driving the read cursor
    pub fn reader(&mut self) -> StreamReader<'_, 'a> {
        StreamReader::new(self)
    }

    /// `std::io::Write + Seek` adapter driving the write cursor
    pub fn writer(&mut self) -> StreamWriter<'_, 'a> {
        StreamWriter::new(self)
    }

    // ___________________________________
    // read

    fn end_of_stream(&self, requested: usize) -> StreamError {
        StreamError::EndOfStream {
            position: self.buffer.tell_read(),
            requested,
            remaining: self.buffer.remaining(),
        }
    }

    /// Consume exactly `len` bytes and borrow them
    pub fn read_slice(&mut self, len: usize) -> StreamResult<&[u8]> {
        let err = self.end_of_stream(len);
        self.buffer.read_slice(len).ok_or(err)
    }

    /// Fill `dst` completely from the read cursor
    pub fn read_into(&mut self, dst: &mut [u8]) -> StreamResult<()> {
        let src = self.read_slice(dst.len())?;
        dst.copy_from_slice(src);
        Ok(())
    }

    /// Read one native-order scalar
    pub fn read<T: Scalar>(&mut self) -> StreamResult<T> {
        let mut bytes = T::Bytes::default();
        self.read_into(bytes.as_mut())?;
        Ok(T::from_ne_bytes(bytes))
    }

    /// Read a `u8`
    pub fn read_u8(&mut self) -> StreamResult<u8> {
        self.read()
    }

    /// Read a native-order `u16`
    pub fn read_u16(&mut self) -> StreamResult<u16> {
        self.read()
    }

    /// Read a native-order `u32`
    pub fn read_u32(&mut self) -> StreamResult<u32> {
        self.read()
    }

    /// Read a native-order `u64`
    pub fn read_u64(&mut self) -> StreamResult<u64> {
        self.read()
    }

    /// Read a native-order `f32`
    pub fn read_f32(&mut self) -> StreamResult<f32> {
        self.read()
    }

    /// Read `N` raw bytes into an array
    pub fn read_fixed_bytes<const N: usize>(&mut self) -> StreamResult<[u8; N]> {
        let mut out = [0u8; N];
        self.read_into(&mut out)?;
        Ok(out)
    }

    /// Read `len` raw bytes into a new vector
    ///
    /// The length is checked against the remaining input before allocating.
    pub fn read_bytes(&mut self, len: usize) -> StreamResult<Vec<u8>> {
        self.read_slice(len).map(<[u8]>::to_vec)
    }

    /// Skip `len` bytes
    pub fn skip(&mut self, len: usize) -> StreamResult<()> {
        self.read_slice(len).map(|_| ())
    }

    /// Read a `u32` element count followed by that many scalars
    ///
    /// A count whose payload would exceed the remaining input fails before
    /// anything is allocated.
    pub fn read_vec<T: Scalar>(&mut self) -> StreamResult<Vec<T>> {
        let count = self.read::<SizeType>()? as usize;
        let total = count.checked_mul(T::SIZE).unwrap_or(usize::MAX);
        let bytes = self.read_slice(total)?;
        Ok(bytes
            .chunks_exact(T::SIZE)
            .map(|element| {
                let mut raw = T::Bytes::default();
                raw.as_mut().copy_from_slice(element);
                T::from_ne_bytes(raw)
            })
            .collect())
    }

    /// Read a `u32`-length-prefixed UTF-8 string
    pub fn read_string(&mut self) -> StreamResult<String> {
        let len = self.read::<SizeType>()? as usize;
        let position = self.tell_read();
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes).map_err(|source| StreamError::InvalidString { position, source })
    }

    /// Read a 4-byte tag
    pub fn read_fourcc(&mut self) -> StreamResult<FourCC> {
        self.read_fixed_bytes().map(FourCC)
    }

    /// Read a 4-byte tag and require it to equal `expected`
    ///
    /// On a mismatch the read cursor is restored and
    /// [`StreamError::FormatMismatch`] is returned.
    pub fn expect_fourcc(&mut self, expected: FourCC) -> StreamResult<()> {
        let start = self.tell_read();
        let actual = self.read_fourcc()?;
        if actual != expected {
            self.seek_read(start);
            return Err(StreamError::FormatMismatch { expected, actual });
        }
        Ok(())
    }

    /// Peek at the next 4 bytes without consuming them
    pub fn peek_fourcc(&self) -> Option<FourCC> {
        let data = self.buffer.as_slice();
        FourCC::from_prefix(&data[self.tell_read()..])
    }

    /// Whether the next value is a length-prefixed string equal to `expected`
    ///
    /// Never consumes anything and never fails.
    pub fn check_string(&mut self, expected: &str) -> bool {
        let start = self.tell_read();
        let matches = match self.read::<SizeType>() {
            Ok(len) if len as usize == expected.len() => self
                .read_slice(expected.len())
                .is_ok_and(|bytes| bytes == expected.as_bytes()),
            _ => false,
        };
        self.seek_read(start);
        matches
    }

    /// Carve a bounded sub-stream over the next `len` bytes
    ///
    /// This stream's read cursor moves past the window immediately. See
    /// [`ByteBuffer::window`] for the behaviour when fewer than `len` bytes
    /// remain.
    pub fn sub_stream(&mut self, len: usize) -> TypedStream<'_> {
        TypedStream::from_buffer(self.buffer.window(len))
    }

    // ___________________________________
    // write

    /// Write raw bytes at the write cursor
    pub fn write_bytes(&mut self, src: &[u8]) -> StreamResult<()> {
        if self.buffer.write(src) {
            return Ok(());
        }
        Err(StreamError::EndOfStream {
            position: self.buffer.tell_write(),
            requested: src.len(),
            remaining: self.buffer.write_capacity(),
        })
    }

    /// Write one native-order scalar
    pub fn write<T: Scalar>(&mut self, value: T) -> StreamResult<()> {
        self.write_bytes(value.to_ne_bytes().as_ref())
    }

    /// Write a `u8`
    pub fn write_u8(&mut self, value: u8) -> StreamResult<()> {
        self.write(value)
    }

    /// Write a native-order `u16`
    pub fn write_u16(&mut self, value: u16) -> StreamResult<()> {
        self.write(value)
    }

    /// Write a native-order `u32`
    pub fn write_u32(&mut self, value: u32) -> StreamResult<()> {
        self.write(value)
    }

    /// Write a native-order `u64`
    pub fn write_u64(&mut self, value: u64) -> StreamResult<()> {
        self.write(value)
    }

    /// Write a native-order `f32`
    pub fn write_f32(&mut self, value: f32) -> StreamResult<()> {
        self.write(value)
    }

    fn write_size(&mut self, len: usize) -> StreamResult<()> {
        let size = SizeType::try_from(len).map_err(|_| StreamError::SizeInconsistency {
            declared: len,
            available: SizeType::MAX as usize,
        })?;
        self.write(size)
    }

    /// Write a `u32` element count followed by the scalars
    pub fn write_vec<T: Scalar>(&mut self, values: &[T]) -> StreamResult<()> {
        self.write_size(values.len())?;
        values.iter().try_for_each(|&value| self.write(value))
    }

    /// Write a `u32` length prefix followed by the string bytes
    pub fn write_string(&mut self, value: &str) -> StreamResult<()> {
        self.write_size(value.len())?;
        self.write_bytes(value.as_bytes())
    }

    /// Write a 4-byte tag
    pub fn write_fourcc(&mut self, tag: FourCC) -> StreamResult<()> {
        self.write_bytes(tag.as_bytes())
    }
}
