//! Errors returned by bounded windows

use std::io;

use crate::window::Origin;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The seek target lies outside of the window
    #[error("invalid position: offset {offset} from {origin:?} leaves the window")]
    InvalidPosition {
        offset: i64,
        origin: Origin,
    },

    /// The numeric origin is not one of start (0), current (1) or end (2)
    #[error("invalid origin: {0}")]
    InvalidOrigin(i32),

    /// No bytes are left in the window
    #[error("end of window reached")]
    EndOfStream,

    /// The stream cannot seek at all
    #[error("stream is not seekable")]
    NotSeekable,

    /// Error of the underlying stream, passed through untouched
    #[error(transparent)]
    Io(io::Error),
}

impl Error {
    fn kind(&self) -> io::ErrorKind {
        match self {
            Error::InvalidPosition { .. } | Error::InvalidOrigin(_) => io::ErrorKind::InvalidInput,
            Error::EndOfStream => io::ErrorKind::UnexpectedEof,
            Error::NotSeekable => io::ErrorKind::Unsupported,
            Error::Io(e) => e.kind(),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        // Our own errors travel through std::io traits boxed inside an io::Error.
        if !err.get_ref().map_or(false, |inner| inner.is::<Error>()) {
            return Error::Io(err);
        }
        let kind = err.kind();
        match err.into_inner().map(|inner| inner.downcast::<Error>()) {
            Some(Ok(own)) => *own,
            Some(Err(inner)) => Error::Io(io::Error::new(kind, inner)),
            None => Error::Io(kind.into()),
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        match err {
            Error::Io(e) => e,
            other => io::Error::new(other.kind(), other),
        }
    }
}
