//! Handler-dispatching chunk reader

use tracing::debug;

use crate::error::{StreamError, StreamResult};
use crate::fourcc::FourCC;
use crate::stream::TypedStream;

/// Callback invoked with a chunk's payload window and version
pub type ChunkHandler<'h> = Box<dyn FnMut(&mut TypedStream<'_>, u32) -> StreamResult<()> + 'h>;

struct Registration<'h> {
    tag: FourCC,
    max_version: u32,
    handler: ChunkHandler<'h>,
}

/// Walks a sequence of chunks and dispatches each payload to the handler
/// registered for its tag
///
/// - Chunks with an unregistered tag are skipped.
/// - Only the first handler registered for a tag is considered.
/// - A chunk whose version exceeds that handler's maximum is skipped without
///   trying later handlers.
///
/// ```
/// use tagchunk_stream::{ChunkReader, FourCC, TypedStream};
///
/// let mut stream = TypedStream::new();
/// stream.write_chunk(FourCC(*b"NAME"), 1, |s| s.write_string("lead"))?;
///
/// let mut name = String::new();
/// let mut reader = ChunkReader::new(&mut stream);
/// reader.add(FourCC(*b"NAME"), 1, |data, _version| {
///     name = data.read_string()?;
///     Ok(())
/// });
/// reader.read(None)?;
/// assert_eq!(reader.num_read(), 1);
/// drop(reader);
/// assert_eq!(name, "lead");
/// # Ok::<(), tagchunk_stream::StreamError>(())
/// ```
pub struct ChunkReader<'s, 'a, 'h> {
    stream: &'s mut TypedStream<'a>,
    handlers: Vec<Registration<'h>>,
    num_chunks: u32,
    num_read: u32,
}

impl<'s, 'a, 'h> ChunkReader<'s, 'a, 'h> {
    /// Create a reader with no handlers
    pub fn new(stream: &'s mut TypedStream<'a>) -> Self {
        Self {
            stream,
            handlers: Vec::new(),
            num_chunks: 0,
            num_read: 0,
        }
    }

    /// Register a handler for chunks tagged `tag` with version at most
    /// `max_version`
    pub fn add<F>(&mut self, tag: FourCC, max_version: u32, handler: F) -> &mut Self
    where
        F: FnMut(&mut TypedStream<'_>, u32) -> StreamResult<()> + 'h,
    {
        self.handlers.push(Registration {
            tag,
            max_version,
            handler: Box::new(handler),
        });
        self
    }

    /// Read chunks until the stream is exhausted or `limit` chunks have been
    /// read by this call
    ///
    /// A chunk whose declared length runs past the end of the stream is a
    /// [`StreamError::SizeInconsistency`]. Handler errors propagate.
    pub fn read(&mut self, limit: Option<u32>) -> StreamResult<()> {
        let mut count = 0u32;
        while !self.stream.at_end() && limit.is_none_or(|limit| count < limit) {
            count += 1;

            let mut chunk = self.stream.read_chunk()?;
            self.num_chunks += 1;
            if !chunk.is_complete() {
                return Err(StreamError::SizeInconsistency {
                    declared: chunk.length as usize,
                    available: chunk.data.size(),
                });
            }

            let Some(registration) = self.handlers.iter_mut().find(|r| r.tag == chunk.tag) else {
                continue;
            };

            if chunk.version > registration.max_version {
                debug!(
                    "Skipping chunk {} version {} (handler supports up to {})",
                    chunk.tag, chunk.version, registration.max_version
                );
                continue;
            }

            (registration.handler)(&mut chunk.data, chunk.version)?;
            self.num_read += 1;
        }
        Ok(())
    }

    /// Like [`read`](Self::read), but on any error the read cursor is
    /// restored and `false` is returned
    pub fn try_read(&mut self, limit: Option<u32>) -> bool {
        let start = self.stream.tell_read();
        match self.read(limit) {
            Ok(()) => true,
            Err(e) => {
                debug!("Chunk read rolled back to offset {start}: {e}");
                self.stream.seek_read(start);
                false
            }
        }
    }

    /// Chunks read so far, handled or not, including a truncated chunk
    /// that ended a read
    pub fn num_chunks(&self) -> u32 {
        self.num_chunks
    }

    /// Chunks passed to a handler so far
    pub fn num_read(&self) -> u32 {
        self.num_read
    }
}

impl std::fmt::Debug for ChunkReader<'_, '_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkReader")
            .field("position", &self.stream.tell_read())
            .field(
                "handlers",
                &self.handlers.iter().map(|r| r.tag).collect::<Vec<_>>(),
            )
            .field("num_chunks", &self.num_chunks)
            .field("num_read", &self.num_read)
            .finish()
    }
}
