use std::io;

use tracing::trace;

use crate::error::{Error, Result};

/// Where a window seek is measured from.
///
/// Offsets from `End` count *backwards*: `(2, Origin::End)` lands two bytes
/// before the end of the window.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Origin {
    Start,
    Current,
    End
}

impl Origin {
    /// Decodes a raw `whence` value (0 = start, 1 = current, 2 = end)
    pub fn from_whence(whence: i32) -> Result<Origin> {
        match whence {
            0 => Ok(Origin::Start),
            1 => Ok(Origin::Current),
            2 => Ok(Origin::End),
            other => Err(Error::InvalidOrigin(other))
        }
    }

    /// Splits a std seek request into a window offset and origin.
    ///
    /// `SeekFrom::End` counts forward, so its offset is negated.
    pub fn split(pos: io::SeekFrom) -> (i64, Origin) {
        match pos {
            io::SeekFrom::Start(offset) => (i64::try_from(offset).unwrap_or(i64::MAX), Origin::Start),
            io::SeekFrom::Current(offset) => (offset, Origin::Current),
            io::SeekFrom::End(offset) => (offset.checked_neg().unwrap_or(i64::MAX), Origin::End)
        }
    }
}

/// Cursor over the byte range `[start, start + len)` of some stream.
///
/// `current_offset` is relative to `start` and always stays within `0..=len`
/// as long as the window is the only thing moving the underlying stream.
#[derive(Debug, Clone)]
pub struct Window {
    start: u64,
    len: u64,
    current_offset: u64
}

impl Window {
    pub fn new(start: u64, len: u64) -> Window {
        Window {
            start,
            len,
            current_offset: 0
        }
    }

    pub fn start_pos(&self) -> u64 {
        self.start
    }

    /// Re-points the window. Does not seek and leaves the position alone.
    pub fn set_start_pos(&mut self, start: u64) {
        self.start = start;
    }

    pub fn size(&self) -> u64 {
        self.len
    }

    /// Resizes the window. Does not seek and leaves the position alone.
    pub fn set_size(&mut self, len: u64) {
        self.len = len;
    }

    /// Position relative to the window start
    pub fn position(&self) -> u64 {
        self.current_offset
    }

    /// Absolute offset of the current position in the underlying stream
    pub fn absolute(&self) -> u64 {
        self.start + self.current_offset
    }

    pub fn remaining(&self) -> u64 {
        self.len.saturating_sub(self.current_offset)
    }

    pub(crate) fn advance(&mut self, bytes: usize) {
        self.current_offset += bytes as u64;
    }

    fn target(&self, offset: i64, origin: Origin) -> Option<u64> {
        let len = i128::from(self.len);
        let target = match origin {
            Origin::Start => i128::from(offset),
            Origin::Current => i128::from(self.current_offset) + i128::from(offset),
            Origin::End => len - i128::from(offset)
        };
        if target < 0 || target > len {
            return None;
        }
        u64::try_from(target).ok()?.checked_add(self.start)
    }

    /// Computes the absolute offset a seek would move the underlying stream to.
    ///
    /// Nothing is moved and the position is untouched. Any target outside of
    /// `0..=size` fails, in either direction.
    pub fn resolve(&self, offset: i64, origin: Origin) -> Result<u64> {
        let target = self.target(offset, origin).ok_or(Error::InvalidPosition { offset, origin })?;
        trace!(start = self.start, size = self.len, pos = self.current_offset, offset, ?origin, target, "window seek resolved");
        Ok(target)
    }

    /// Takes over the absolute offset the underlying stream reported after a
    /// seek and returns the new position.
    pub fn commit(&mut self, absolute: u64) -> u64 {
        debug_assert!(absolute >= self.start, "stream reported {} before window start {}", absolute, self.start);
        self.current_offset = absolute.saturating_sub(self.start);
        self.current_offset
    }
}

/// Something that can move a stream to an absolute offset.
///
/// Implemented for closures taking a [`io::SeekFrom`]; they are always called
/// with `SeekFrom::Start`. Wrap an [`io::Seek`] in [`SeekerOf`] to use it
/// directly.
pub trait SeekDelegate {
    fn seek_absolute(&mut self, offset: u64) -> io::Result<u64>;
}

impl <F> SeekDelegate for F where F: FnMut(io::SeekFrom) -> io::Result<u64> {
    fn seek_absolute(&mut self, offset: u64) -> io::Result<u64> {
        self(io::SeekFrom::Start(offset))
    }
}

/// Adapts any [`io::Seek`] into a [`SeekDelegate`]
#[derive(Debug)]
pub struct SeekerOf<S>(pub S);

impl <S: io::Seek> SeekDelegate for SeekerOf<S> {
    fn seek_absolute(&mut self, offset: u64) -> io::Result<u64> {
        self.0.seek(io::SeekFrom::Start(offset))
    }
}

/// Translates window-relative seeks into absolute seeks on a delegate.
pub struct BoundedSeeker<F> {
    window: Window,
    delegate: F
}

impl <F: SeekDelegate> BoundedSeeker<F> {
    /// Creates the seeker and moves the delegate to `start` unless it is 0.
    pub fn new(start: u64, size: u64, mut delegate: F) -> Result<BoundedSeeker<F>> {
        if start != 0 {
            delegate.seek_absolute(start)?;
        }
        trace!(start, size, "bounded seeker created");
        Ok(BoundedSeeker {
            window: Window::new(start, size),
            delegate
        })
    }

    /// Seeks within the window and returns the new window-relative position.
    ///
    /// On failure of the delegate the position is left where it was.
    pub fn seek(&mut self, offset: i64, origin: Origin) -> Result<u64> {
        let target = self.window.resolve(offset, origin)?;
        let absolute = self.delegate.seek_absolute(target)?;
        Ok(self.window.commit(absolute))
    }

    /// Like [`seek`](Self::seek), with the origin given as a raw whence value
    pub fn seek_whence(&mut self, offset: i64, whence: i32) -> Result<u64> {
        self.seek(offset, Origin::from_whence(whence)?)
    }

    pub fn start_pos(&self) -> u64 {
        self.window.start_pos()
    }

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

    pub fn delegate_mut(&mut self) -> &mut F {
        &mut self.delegate
    }

    pub fn into_delegate(self) -> F {
        self.delegate
    }
}

impl <F: SeekDelegate> io::Seek for BoundedSeeker<F> {
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        let (offset, origin) = Origin::split(pos);
        Ok(BoundedSeeker::seek(self, offset, origin)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Delegate that records every absolute offset it was asked for
    fn recording(log: Rc<RefCell<Vec<u64>>>) -> impl FnMut(io::SeekFrom) -> io::Result<u64> {
        move |pos| match pos {
            io::SeekFrom::Start(offset) => {
                log.borrow_mut().push(offset);
                Ok(offset)
            },
            other => panic!("delegate called with {:?}", other)
        }
    }

    #[test]
    fn whence_values() {
        assert_eq!(Origin::from_whence(0).unwrap(), Origin::Start);
        assert_eq!(Origin::from_whence(1).unwrap(), Origin::Current);
        assert_eq!(Origin::from_whence(2).unwrap(), Origin::End);
        assert!(matches!(Origin::from_whence(3), Err(Error::InvalidOrigin(3))));
        assert!(matches!(Origin::from_whence(-1), Err(Error::InvalidOrigin(-1))));
    }

    #[test]
    fn split_negates_end() {
        assert_eq!(Origin::split(io::SeekFrom::End(-4)), (4, Origin::End));
        assert_eq!(Origin::split(io::SeekFrom::Current(-4)), (-4, Origin::Current));
        assert_eq!(Origin::split(io::SeekFrom::Start(4)), (4, Origin::Start));
    }

    #[test]
    fn initial_seek_only_when_start_is_nonzero() {
        let log = Rc::new(RefCell::new(Vec::new()));
        BoundedSeeker::new(0, 6, recording(log.clone())).unwrap();
        assert!(log.borrow().is_empty());

        BoundedSeeker::new(2, 6, recording(log.clone())).unwrap();
        assert_eq!(*log.borrow(), vec![2]);
    }

    #[test]
    fn translates_all_origins() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut seeker = BoundedSeeker::new(2, 6, recording(log.clone())).unwrap();

        assert_eq!(seeker.seek(3, Origin::Start).unwrap(), 3);
        assert_eq!(seeker.seek(1, Origin::Current).unwrap(), 4);
        assert_eq!(seeker.seek(4, Origin::End).unwrap(), 2);
        assert_eq!(seeker.seek(0, Origin::End).unwrap(), 6);
        assert_eq!(*log.borrow(), vec![2, 5, 6, 4, 8]);
    }

    #[test]
    fn rejects_forward_overshoot() {
        let mut seeker = BoundedSeeker::new(0, 6, |pos: io::SeekFrom| -> io::Result<u64> { match pos {
            io::SeekFrom::Start(offset) => Ok(offset),
            _ => unreachable!()
        }}).unwrap();

        assert!(matches!(seeker.seek(7, Origin::Start), Err(Error::InvalidPosition { offset: 7, origin: Origin::Start })));
        assert_eq!(seeker.seek(4, Origin::Start).unwrap(), 4);
        assert!(matches!(seeker.seek(3, Origin::Current), Err(Error::InvalidPosition { .. })));
        assert!(matches!(seeker.seek(7, Origin::End), Err(Error::InvalidPosition { .. })));
        assert_eq!(seeker.position(), 4);
    }

    #[test]
    fn backward_moves_past_the_window_start_are_rejected() {
        let mut seeker = BoundedSeeker::new(10, 6, SeekerOf(io::Cursor::new(vec![0u8; 32]))).unwrap();
        seeker.seek(3, Origin::Start).unwrap();

        assert_eq!(seeker.seek(-3, Origin::Current).unwrap(), 0);
        assert!(matches!(seeker.seek(-1, Origin::Current), Err(Error::InvalidPosition { offset: -1, .. })));
        assert!(matches!(seeker.seek(-1, Origin::Start), Err(Error::InvalidPosition { .. })));
        // a negative End offset would move past the end of the window
        assert!(matches!(seeker.seek(-1, Origin::End), Err(Error::InvalidPosition { .. })));
        assert_eq!(seeker.position(), 0);
        assert_eq!(seeker.delegate_mut().0.position(), 10);
    }

    #[test]
    fn failed_delegate_keeps_position() {
        let mut fail = false;
        let mut seeker = BoundedSeeker::new(0, 6, move |pos: io::SeekFrom| -> io::Result<u64> {
            let result = match pos {
                io::SeekFrom::Start(offset) if !fail => Ok(offset),
                _ => Err(io::Error::new(io::ErrorKind::Other, "device gone"))
            };
            fail = true;
            result
        }).unwrap();

        assert_eq!(seeker.seek(2, Origin::Start).unwrap(), 2);
        match seeker.seek(5, Origin::Start) {
            Err(Error::Io(e)) => assert_eq!(e.to_string(), "device gone"),
            other => panic!("unexpected {:?}", other)
        }
        assert_eq!(seeker.position(), 2);
    }

    #[test]
    fn position_follows_the_reported_offset() {
        // a delegate that lands one byte short of the requested offset
        let mut seeker = BoundedSeeker::new(0, 10, |pos: io::SeekFrom| -> io::Result<u64> { match pos {
            io::SeekFrom::Start(offset) => Ok(offset.saturating_sub(1)),
            _ => unreachable!()
        }}).unwrap();
        assert_eq!(seeker.seek(5, Origin::Start).unwrap(), 4);
        assert_eq!(seeker.position(), 4);
    }

    #[test]
    fn invalid_whence() {
        let mut seeker = BoundedSeeker::new(0, 6, SeekerOf(io::Cursor::new(vec![0u8; 6]))).unwrap();
        assert!(matches!(seeker.seek_whence(1, 7), Err(Error::InvalidOrigin(7))));
        assert_eq!(seeker.seek_whence(1, 2).unwrap(), 5);
    }

    #[test]
    fn setters_do_not_seek() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut seeker = BoundedSeeker::new(0, 6, recording(log.clone())).unwrap();
        seeker.seek(5, Origin::Start).unwrap();

        seeker.set_size(2);
        seeker.set_start_pos(8);
        assert_eq!(seeker.size(), 2);
        assert_eq!(seeker.start_pos(), 8);
        assert_eq!(seeker.position(), 5);
        assert_eq!(*log.borrow(), vec![5]);
    }

    #[test]
    fn std_seek_end_counts_forward() {
        use std::io::Seek;

        let mut seeker = BoundedSeeker::new(2, 6, SeekerOf(io::Cursor::new(b"0123456789".to_vec()))).unwrap();
        assert_eq!(Seek::seek(&mut seeker, io::SeekFrom::End(-2)).unwrap(), 4);
        assert_eq!(seeker.delegate_mut().0.position(), 6);

        let err = Seek::seek(&mut seeker, io::SeekFrom::End(1)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert_eq!(seeker.position(), 4);
    }
}
