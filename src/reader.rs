use std::io::{self, Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};
use tracing::trace;

use crate::error::{Error, Result};
use crate::util::{close_quietly, Close};
use crate::window::{Origin, Window};

/// Exposes the byte range `[start, start + size)` of a stream as a stream of its own.
///
/// Reads never cross the end of the window, and seeks are translated into
/// absolute seeks on the wrapped stream. The reader keeps its own cursor and
/// assumes nothing else moves the wrapped stream while it is in use.
#[derive(Debug)]
pub struct BoundedReader<R> {
    inner: R,
    window: Window
}

impl <R: Read + Seek> BoundedReader<R> {
    /// Wraps `inner`, seeking it to `start` first unless `start` is 0.
    pub fn new(mut inner: R, start: u64, size: u64) -> Result<BoundedReader<R>> {
        if start != 0 {
            inner.seek(SeekFrom::Start(start))?;
        }
        Ok(BoundedReader::synced(inner, start, size))
    }

    /// Opens the window behind a little-endian `u32` length at `start`.
    ///
    /// The returned reader starts right after the length field and spans as
    /// many bytes as the field announces.
    pub fn length_prefixed(inner: R, start: u64) -> Result<BoundedReader<R>> {
        let payload = start.checked_add(4).ok_or(Error::InvalidPosition { offset: 4, origin: Origin::Start })?;

        let mut reader = BoundedReader::new(inner, start, 4)?;
        let len = reader.read_u32::<LittleEndian>()?;
        trace!(start, len, "read length prefix");

        reader.set_start_pos(payload);
        reader.set_size(u64::from(len));
        reader.seek_window(0, Origin::Start)?;
        Ok(reader)
    }

    /// Reads from the window, failing with [`Error::EndOfStream`] once it is used up.
    ///
    /// At most the remaining bytes of the window are requested from the
    /// wrapped stream. The position only moves when the read succeeds.
    pub fn read_window(&mut self, buf: &mut [u8]) -> Result<usize> {
        let available = self.window.remaining();
        if available == 0 {
            return Err(Error::EndOfStream);
        }
        let limit = usize::try_from(available).map_or(buf.len(), |available| available.min(buf.len()));

        let bytes = self.inner.read(&mut buf[..limit])?;
        self.window.advance(bytes);
        Ok(bytes)
    }

    /// Seeks relative to the window and returns the new window position.
    pub fn seek_window(&mut self, offset: i64, origin: Origin) -> Result<u64> {
        let target = self.window.resolve(offset, origin)?;
        let absolute = self.inner.seek(SeekFrom::Start(target))?;
        Ok(self.window.commit(absolute))
    }

    /// Like [`seek_window`](Self::seek_window), with a raw whence value
    pub fn seek_whence(&mut self, offset: i64, whence: i32) -> Result<u64> {
        self.seek_window(offset, Origin::from_whence(whence)?)
    }
}

impl <R> BoundedReader<R> {
    /// Builds a reader for a stream that already sits at `start`
    fn synced(inner: R, start: u64, size: u64) -> BoundedReader<R> {
        trace!(start, size, "bounded reader created");
        BoundedReader {
            inner,
            window: Window::new(start, size)
        }
    }

    pub fn start_pos(&self) -> u64 {
        self.window.start_pos()
    }

    /// Moves the window start without seeking. Follow up with a seek to resync.
    pub fn set_start_pos(&mut self, start: u64) {
        self.window.set_start_pos(start)
    }

    pub fn size(&self) -> u64 {
        self.window.size()
    }

    pub fn set_size(&mut self, size: u64) {
        self.window.set_size(size)
    }

    pub fn position(&self) -> u64 {
        self.window.position()
    }

    pub fn remaining(&self) -> u64 {
        self.window.remaining()
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Moving the wrapped stream through this reference desyncs the window.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl <R: Read + Seek> Read for BoundedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.read_window(buf) {
            Err(Error::EndOfStream) => Ok(0),
            other => Ok(other?)
        }
    }
}

impl <R: Read + Seek> Seek for BoundedReader<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let (offset, origin) = Origin::split(pos);
        Ok(self.seek_window(offset, origin)?)
    }
}

/// A [`BoundedReader`] that owns the wrapped stream's close.
///
/// The wrapped stream is closed exactly once: by the first call to
/// [`Close::close`], or on drop if it was never called.
#[derive(Debug)]
pub struct BoundedReadCloser<R: Close> {
    reader: BoundedReader<R>,
    closed: bool
}

impl <R: Read + Seek + Close> BoundedReadCloser<R> {
    /// Like [`BoundedReader::new`]. If the initial seek fails `inner` is closed.
    pub fn new(mut inner: R, start: u64, size: u64) -> Result<BoundedReadCloser<R>> {
        if start != 0 {
            if let Err(e) = inner.seek(SeekFrom::Start(start)) {
                close_quietly(&mut inner);
                return Err(e.into());
            }
        }
        Ok(BoundedReadCloser::from_reader(BoundedReader::synced(inner, start, size)))
    }

    pub fn from_reader(reader: BoundedReader<R>) -> BoundedReadCloser<R> {
        BoundedReadCloser {
            reader,
            closed: false
        }
    }

    pub fn read_window(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.reader.read_window(buf)
    }

    pub fn seek_window(&mut self, offset: i64, origin: Origin) -> Result<u64> {
        self.reader.seek_window(offset, origin)
    }

    pub fn seek_whence(&mut self, offset: i64, whence: i32) -> Result<u64> {
        self.reader.seek_whence(offset, whence)
    }

    pub fn set_start_pos(&mut self, start: u64) {
        self.reader.set_start_pos(start)
    }

    pub fn set_size(&mut self, size: u64) {
        self.reader.set_size(size)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn get_ref(&self) -> &BoundedReader<R> {
        &self.reader
    }
}

impl <R: Read + Seek + Close> Read for BoundedReadCloser<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl <R: Read + Seek + Close> Seek for BoundedReadCloser<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.reader.seek(pos)
    }
}

impl <R: Close> Close for BoundedReadCloser<R> {
    fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        trace!(start = self.reader.start_pos(), pos = self.reader.position(), "closing bounded reader");
        self.reader.inner.close()
    }
}

impl <R: Close> Drop for BoundedReadCloser<R> {
    fn drop(&mut self) {
        if !self.closed {
            self.closed = true;
            close_quietly(&mut self.reader.inner);
        }
    }
}
