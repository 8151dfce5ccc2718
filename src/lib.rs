//! Bounded windows over seekable byte streams.
//!
//! A [`BoundedReader`] exposes the range `[start, start + size)` of another
//! stream as if nothing else existed: reads stop at the end of the window and
//! seeks are translated into absolute seeks on the wrapped stream.
//!
//! ```rust
//! use std::io::{Read, Seek, SeekFrom};
//! use boundedio::{BoundedReader, ByteStream, Origin};
//!
//! let stream = ByteStream::from(&b"0123456789"[..]);
//! let mut window = BoundedReader::new(stream, 2, 6).unwrap();
//!
//! let mut text = String::new();
//! window.read_to_string(&mut text).unwrap();
//! assert_eq!(text, "234567");
//!
//! // window offsets from the end count backwards
//! assert_eq!(window.seek_window(4, Origin::End).unwrap(), 2);
//! // std's SeekFrom::End counts forwards, as usual
//! assert_eq!(window.seek(SeekFrom::End(-1)).unwrap(), 5);
//! assert!(window.seek(SeekFrom::Start(7)).is_err());
//! ```
//!
//! [`BoundedSeeker`] does the same offset translation for anything that can
//! seek to an absolute position, without owning a stream.
pub mod adapter;
pub mod error;
pub mod reader;
pub mod util;
pub mod window;

pub use adapter::{ByteStream, NoSeek};
pub use error::{Error, Result};
pub use reader::{BoundedReadCloser, BoundedReader};
pub use util::{close_quietly, Close, CloseGuard};
pub use window::{BoundedSeeker, Origin, SeekDelegate, SeekerOf, Window};
