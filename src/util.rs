use std::io;
use std::ops::{Deref, DerefMut};

use tracing::trace;

/// A stream whose resources have to be released explicitly.
pub trait Close {
    fn close(&mut self) -> io::Result<()>;
}

impl <'a, C: Close + ?Sized> Close for &'a mut C {
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

impl <C: Close + ?Sized> Close for Box<C> {
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

/// Closes `closer` and throws the error away
pub fn close_quietly<C: Close + ?Sized>(closer: &mut C) {
    if let Err(e) = closer.close() {
        trace!(error = %e, "close failed, ignoring");
    }
}

/// Closes the wrapped value when dropped, ignoring errors.
///
/// Use [`CloseGuard::into_inner`] to take the value back without closing it.
pub struct CloseGuard<C: Close> {
    inner: Option<C>
}

impl <C: Close> CloseGuard<C> {
    pub fn new(inner: C) -> CloseGuard<C> {
        CloseGuard { inner: Some(inner) }
    }

    pub fn into_inner(mut self) -> C {
        match self.inner.take() {
            Some(inner) => inner,
            None => unreachable!("guard is only emptied on drop")
        }
    }
}

impl <C: Close> Deref for CloseGuard<C> {
    type Target = C;

    fn deref(&self) -> &C {
        match self.inner {
            Some(ref inner) => inner,
            None => unreachable!("guard is only emptied on drop")
        }
    }
}

impl <C: Close> DerefMut for CloseGuard<C> {
    fn deref_mut(&mut self) -> &mut C {
        match self.inner {
            Some(ref mut inner) => inner,
            None => unreachable!("guard is only emptied on drop")
        }
    }
}

impl <C: Close> Drop for CloseGuard<C> {
    fn drop(&mut self) {
        if let Some(ref mut inner) = self.inner {
            close_quietly(inner);
        }
    }
}
