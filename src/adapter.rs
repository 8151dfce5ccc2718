//! Small streams to plug into bounded windows

use std::io::{self, Cursor, Read, Seek, SeekFrom};

use crate::error::Error;
use crate::util::Close;

/// Makes a plain reader usable where `Read + Seek` is required.
///
/// Every seek fails with [`Error::NotSeekable`] and leaves the reader alone.
#[derive(Debug)]
pub struct NoSeek<R> {
    inner: R
}

impl <R: Read> NoSeek<R> {
    pub fn new(inner: R) -> NoSeek<R> {
        NoSeek { inner }
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl <R: Read> Read for NoSeek<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl <R: Read> Seek for NoSeek<R> {
    fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
        Err(Error::NotSeekable.into())
    }
}

impl <R: Read + Close> Close for NoSeek<R> {
    fn close(&mut self) -> io::Result<()> {
        self.inner.close()
    }
}

/// In-memory stream over a byte vector. Closing it drops the contents.
#[derive(Debug, Default, Clone)]
pub struct ByteStream {
    cursor: Cursor<Vec<u8>>
}

impl ByteStream {
    pub fn new(data: Vec<u8>) -> ByteStream {
        ByteStream { cursor: Cursor::new(data) }
    }

    pub fn len(&self) -> usize {
        self.cursor.get_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursor.get_ref().is_empty()
    }

    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.cursor.into_inner()
    }
}

impl From<Vec<u8>> for ByteStream {
    fn from(data: Vec<u8>) -> ByteStream {
        ByteStream::new(data)
    }
}

impl <'a> From<&'a [u8]> for ByteStream {
    fn from(data: &'a [u8]) -> ByteStream {
        ByteStream::new(data.to_vec())
    }
}

impl Read for ByteStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl Seek for ByteStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.cursor.seek(pos)
    }
}

impl Close for ByteStream {
    fn close(&mut self) -> io::Result<()> {
        self.cursor = Cursor::new(Vec::new());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn no_seek_refuses_every_seek() {
        let mut stream = NoSeek::new(&b"0123456789"[..]);
        let mut buf = [0u8; 3];
        stream.read_exact(&mut buf).unwrap();

        for pos in [SeekFrom::Start(0), SeekFrom::Current(-1), SeekFrom::End(0), SeekFrom::Current(0)] {
            let err = stream.seek(pos).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::Unsupported);
            assert!(matches!(Error::from(err), Error::NotSeekable));
        }

        stream.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"345");
    }

    #[test]
    fn no_seek_forwards_close() {
        let mut stream = NoSeek::new(ByteStream::from(&b"abc"[..]));
        stream.close().unwrap();
        assert!(stream.get_ref().is_empty());
    }

    #[test]
    fn byte_stream_reads_and_seeks() {
        let mut stream = ByteStream::from(&b"0123456789"[..]);
        assert_eq!(stream.seek(SeekFrom::End(-3)).unwrap(), 7);
        let mut out = String::new();
        stream.read_to_string(&mut out).unwrap();
        assert_eq!(out, "789");
    }

    #[test]
    fn byte_stream_close_empties() {
        let mut stream = ByteStream::from(&b"0123456789"[..]);
        stream.close().unwrap();
        stream.close().unwrap();
        assert_eq!(stream.len(), 0);
        let mut buf = [0u8; 4];
        assert_eq!(stream.read(&mut buf).unwrap(), 0);
    }
}
