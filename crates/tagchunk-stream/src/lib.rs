//! Byte buffers, typed streams and a tagged chunk protocol
//!
#![allow(clippy::cast_possible_truncation)] // Length fields are u32 on the wire
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::uninlined_format_args)] // Backwards compatibility
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::float_cmp)] // Round-trip tests compare exact values
#![allow(clippy::return_self_not_must_use)] // Builder patterns
//! This crate is the byte-level engine shared by the format parsers in
//! `tagchunk-formats`.
//!
//! # Layers
//!
//! - **[`ByteBuffer`]**: read and write cursors over borrowed, fixed or owned
//!   bytes, with a sticky failure flag and no partial reads
//! - **[`TypedStream`]**: native-order scalars, length-prefixed vectors and
//!   strings, four-character codes and bounded sub-streams; also usable as
//!   `std::io::Read`/`Write`/`Seek` (and so with `binrw`) through
//!   [`TypedStream::reader`] and [`TypedStream::writer`]
//! - **[`Chunk`]**: `[tag:4][version:u32][length:u32][payload]` blocks, written
//!   with [`ChunkWriter`] and dispatched to handlers by [`ChunkReader`]
//!
//! # Example
//!
//! ```
//! use tagchunk_stream::{FourCC, TypedStream};
//!
//! let mut stream = TypedStream::new();
//! stream.write_chunk(FourCC(*b"PRGM"), 2, |s| {
//!     s.write_string("Init")?;
//!     s.write_vec(&[0.5f32, 1.0])
//! })?;
//!
//! let mut chunk = stream.read_chunk()?;
//! assert_eq!(chunk.tag, FourCC(*b"PRGM"));
//! assert_eq!(chunk.data.read_string()?, "Init");
//! assert_eq!(chunk.data.read_vec::<f32>()?, vec![0.5, 1.0]);
//! # Ok::<(), tagchunk_stream::StreamError>(())
//! ```

#![warn(missing_docs)]

pub mod buffer;
pub mod chunk;
pub mod error;
pub mod fourcc;
pub mod io;
pub mod stream;

pub use buffer::ByteBuffer;
pub use chunk::{CHUNK_HEADER_SIZE, Chunk, ChunkHandler, ChunkReader, ChunkWriter};
pub use error::{StreamError, StreamResult};
pub use fourcc::FourCC;
pub use io::{StreamReader, StreamWriter};
pub use stream::{Scalar, SizeType, TypedStream};
