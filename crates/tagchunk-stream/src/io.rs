//! `std::io` adapters for [`TypedStream`]
//!
//! A stream has separate read and write cursors, so it is exposed to
//! `std::io` (and therefore `binrw`) through two adapters: [`StreamReader`]
//! seeks the read cursor, [`StreamWriter`] seeks the write cursor.
//! `read_exact` goes through the stream's no-partial-copy path, so a short
//! read sets the sticky failure flag just like a typed read.

use std::io::{self, Read, Seek, SeekFrom, Write};

use crate::stream::TypedStream;

fn seek_target(base: usize, end: usize, pos: SeekFrom) -> io::Result<usize> {
    let target = match pos {
        SeekFrom::Start(offset) => i128::from(offset),
        SeekFrom::End(offset) => end as i128 + i128::from(offset),
        SeekFrom::Current(offset) => base as i128 + i128::from(offset),
    };
    usize::try_from(target).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid seek to offset {target}"),
        )
    })
}

/// Reading half of a [`TypedStream`]
#[derive(Debug)]
pub struct StreamReader<'s, 'a> {
    stream: &'s mut TypedStream<'a>,
}

impl<'s, 'a> StreamReader<'s, 'a> {
    pub(crate) fn new(stream: &'s mut TypedStream<'a>) -> Self {
        Self { stream }
    }
}

impl Read for StreamReader<'_, '_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = buf.len().min(self.stream.remaining());
        self.stream
            .read_into(&mut buf[..len])
            .map_err(io::Error::other)?;
        Ok(len)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.stream
            .read_into(buf)
            .map_err(|e| io::Error::new(io::ErrorKind::UnexpectedEof, e))
    }
}

impl Seek for StreamReader<'_, '_> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = seek_target(self.stream.tell_read(), self.stream.size(), pos)?;
        self.stream.seek_read(target);
        Ok(self.stream.tell_read() as u64)
    }
}

/// Writing half of a [`TypedStream`]
#[derive(Debug)]
pub struct StreamWriter<'s, 'a> {
    stream: &'s mut TypedStream<'a>,
}

impl<'s, 'a> StreamWriter<'s, 'a> {
    pub(crate) fn new(stream: &'s mut TypedStream<'a>) -> Self {
        Self { stream }
    }
}

impl Write for StreamWriter<'_, '_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream
            .write_bytes(buf)
            .map_err(|e| io::Error::new(io::ErrorKind::WriteZero, e))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for StreamWriter<'_, '_> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = seek_target(self.stream.tell_write(), self.stream.size(), pos)?;
        self.stream.seek_write(target);
        Ok(self.stream.tell_write() as u64)
    }
}
