//! Cursor-based byte buffer
//!
//! [`ByteBuffer`] keeps independent read and write cursors over either
//! borrowed bytes (fixed size) or an owned, growable `Vec<u8>`. Reads never
//! copy partially: when fewer bytes remain than requested the buffer sets a
//! sticky failure flag and leaves its cursor where it was.
//!
//! A window ([`ByteBuffer::window`]) is a fixed-size view over the next
//! `len` unread bytes of a parent buffer. The parent's read cursor moves past
//! the window when the window is created, so the window borrows the parent
//! for as long as it lives.

/// Backing storage
#[derive(Debug)]
enum Storage<'a> {
    /// Read-only borrowed bytes; writes always fail
    Borrowed(&'a [u8]),
    /// Writable borrowed bytes of fixed size
    Fixed(&'a mut [u8]),
    /// Owned bytes, extended by writes past the end
    Owned(Vec<u8>),
}

impl Default for Storage<'_> {
    fn default() -> Self {
        Self::Owned(Vec::new())
    }
}

/// Byte sequence with independent read and write cursors
///
/// Invariants: the read cursor never exceeds [`size`](Self::size); for
/// fixed storage the write cursor doesn't either. Once
/// [`failed`](Self::failed) is set only [`reset`](Self::reset) or replacing
/// the value clears it.
#[derive(Debug, Default)]
pub struct ByteBuffer<'a> {
    storage: Storage<'a>,
    read_pos: usize,
    write_pos: usize,
    failed: bool,
}

impl<'a> ByteBuffer<'a> {
    /// Create an empty growable buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty growable buffer with reserved capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: Storage::Owned(Vec::with_capacity(capacity)),
            ..Self::default()
        }
    }

    /// Take ownership of `data`
    ///
    /// The read cursor starts at 0, the write cursor after the last byte so
    /// further writes append.
    pub fn from_vec(data: Vec<u8>) -> Self {
        let write_pos = data.len();
        Self {
            storage: Storage::Owned(data),
            write_pos,
            ..Self::default()
        }
    }

    /// Read-only view over borrowed bytes
    pub fn borrowed(data: &'a [u8]) -> Self {
        Self {
            storage: Storage::Borrowed(data),
            ..Self::default()
        }
    }

    /// Fixed-size writable view over borrowed bytes
    pub fn fixed(data: &'a mut [u8]) -> Self {
        Self {
            storage: Storage::Fixed(data),
            ..Self::default()
        }
    }

    /// Current size of the storage
    pub fn size(&self) -> usize {
        self.as_slice().len()
    }

    /// Whether writes past the end fail instead of growing the storage
    pub fn is_fixed(&self) -> bool {
        !matches!(self.storage, Storage::Owned(_))
    }

    /// All stored bytes, regardless of cursor positions
    pub fn as_slice(&self) -> &[u8] {
        match &self.storage {
            Storage::Borrowed(data) => data,
            Storage::Fixed(data) => data,
            Storage::Owned(data) => data,
        }
    }

    /// Consume the buffer and return its bytes
    pub fn into_vec(self) -> Vec<u8> {
        match self.storage {
            Storage::Owned(data) => data,
            Storage::Borrowed(data) => data.to_vec(),
            Storage::Fixed(data) => data.to_vec(),
        }
    }

    /// Read cursor position
    pub fn tell_read(&self) -> usize {
        self.read_pos
    }

    /// Write cursor position
    pub fn tell_write(&self) -> usize {
        self.write_pos
    }

    /// Move the read cursor, clamped to the end of the storage
    pub fn seek_read(&mut self, pos: usize) {
        self.read_pos = pos.min(self.size());
    }

    /// Move the write cursor
    ///
    /// Fixed storage clamps to its size. Owned storage accepts any position;
    /// the gap is zero-filled by the next write.
    pub fn seek_write(&mut self, pos: usize) {
        self.write_pos = if self.is_fixed() {
            pos.min(self.size())
        } else {
            pos
        };
    }

    /// Bytes between the read cursor and the end of the storage
    pub fn remaining(&self) -> usize {
        self.size() - self.read_pos
    }

    /// Whether the read cursor has reached the end
    pub fn at_end(&self) -> bool {
        self.read_pos >= self.size()
    }

    /// Whether any read or write has run past the end
    pub fn failed(&self) -> bool {
        self.failed
    }

    /// Rewind both cursors and clear the failure flag, keeping the bytes
    pub fn reset(&mut self) {
        self.read_pos = 0;
        self.write_pos = 0;
        self.failed = false;
    }

    /// Advance the read cursor by `len` bytes and return them
    ///
    /// Returns `None` and sets the failure flag if fewer than `len` bytes
    /// remain; nothing is consumed in that case.
    pub fn read_slice(&mut self, len: usize) -> Option<&[u8]> {
        if self.remaining() < len {
            self.failed = true;
            return None;
        }
        let start = self.read_pos;
        self.read_pos += len;
        Some(&self.as_slice()[start..start + len])
    }

    /// Copy `dst.len()` bytes from the read cursor into `dst`
    pub fn read(&mut self, dst: &mut [u8]) -> bool {
        match self.read_slice(dst.len()) {
            Some(src) => {
                dst.copy_from_slice(src);
                true
            }
            None => false,
        }
    }

    /// Bytes that can still be written at the write cursor without growing
    pub fn write_capacity(&self) -> usize {
        match &self.storage {
            Storage::Borrowed(_) => 0,
            Storage::Fixed(data) => data.len().saturating_sub(self.write_pos),
            Storage::Owned(_) => usize::MAX,
        }
    }

    /// Copy `src` to the write cursor and advance it
    ///
    /// Owned storage grows as needed and fails only when the end position
    /// is not addressable or cannot be allocated. Fixed storage fails like
    /// [`read`](Self::read) when `src` does not fit; read-only storage fails
    /// for any non-empty `src`.
    pub fn write(&mut self, src: &[u8]) -> bool {
        if src.is_empty() {
            return true;
        }
        let start = self.write_pos;
        let Some(end) = start.checked_add(src.len()) else {
            self.failed = true;
            return false;
        };
        match &mut self.storage {
            Storage::Borrowed(_) => {
                self.failed = true;
                return false;
            }
            Storage::Fixed(data) => {
                if end > data.len() {
                    self.failed = true;
                    return false;
                }
                data[start..end].copy_from_slice(src);
            }
            Storage::Owned(data) => {
                if end > data.len() {
                    if data.try_reserve(end - data.len()).is_err() {
                        self.failed = true;
                        return false;
                    }
                    data.resize(end, 0);
                }
                data[start..end].copy_from_slice(src);
            }
        }
        self.write_pos = end;
        true
    }

    /// Carve a fixed-size window over the next `len` unread bytes
    ///
    /// The read cursor of `self` moves past the window immediately. If fewer
    /// than `len` bytes remain the window spans what is left, its read cursor
    /// starts at its own end so it reports [`at_end`](Self::at_end) right
    /// away, and `self` is left at its end. This is not an error; callers
    /// detect truncation by comparing the window size with `len`.
    pub fn window(&mut self, len: usize) -> ByteBuffer<'_> {
        let start = self.read_pos;
        let available = self.remaining();
        let truncated = len > available;
        let span = len.min(available);
        self.read_pos = start + span;

        let storage = match &mut self.storage {
            Storage::Borrowed(data) => Storage::Borrowed(&data[start..start + span]),
            Storage::Fixed(data) => Storage::Fixed(&mut data[start..start + span]),
            Storage::Owned(data) => Storage::Fixed(&mut data[start..start + span]),
        };

        ByteBuffer {
            storage,
            read_pos: if truncated { span } else { 0 },
            write_pos: 0,
            failed: false,
        }
    }
}
