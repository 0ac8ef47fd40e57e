//! The frame-source capability and its shared ownership.
//!
//! [`FrameSource`] is the small capture interface every handle delegates to:
//! grab, retrieve, read, release, and numeric property access. The crate
//! ships an FFmpeg implementation ([`FfmpegCapture`](crate::FfmpegCapture)),
//! but any type implementing the trait can be wrapped in a
//! [`VideoHandle`](crate::VideoHandle).
//!
//! Handles never copy a source. They hold a [`SharedSource`], a
//! reference-counted cell, so every handle, iterator, and scene built from
//! one source moves the same cursor. The source is released when the last
//! reference goes away.

use std::{
    cell::{Ref, RefCell, RefMut},
    fmt::{Debug, Formatter, Result as FmtResult},
    rc::Rc,
};

/// A capture that decodes frames sequentially and exposes its position
/// through numeric properties.
///
/// Property ids are the capture library's codes (see [`crate::property`]).
/// Failures are reported through return values: `false` from
/// [`grab`](FrameSource::grab) and [`set`](FrameSource::set), `None` from
/// [`retrieve`](FrameSource::retrieve) and [`read`](FrameSource::read).
pub trait FrameSource {
    /// The decoded frame type.
    type Frame;

    /// Advance to the next frame without decoding its pixels.
    fn grab(&mut self) -> bool;

    /// Decode the most recently grabbed frame.
    fn retrieve(&mut self) -> Option<Self::Frame>;

    /// Grab and decode the next frame.
    fn read(&mut self) -> Option<Self::Frame> {
        if self.grab() { self.retrieve() } else { None }
    }

    /// Close the capture. Further calls report failure.
    fn release(&mut self);

    /// Returns `true` while the capture is usable.
    fn is_opened(&self) -> bool;

    /// Read a property. Unknown ids return `0.0`.
    fn get(&self, property_id: i32) -> f64;

    /// Write a property. Returns `false` if the capture rejected it.
    fn set(&mut self, property_id: i32, value: f64) -> bool;
}

/// Owns the source and releases it when dropped, unless it was already
/// released explicitly.
struct ReleaseOnDrop<S: FrameSource>(S);

impl<S: FrameSource> Drop for ReleaseOnDrop<S> {
    fn drop(&mut self) {
        if self.0.is_opened() {
            log::debug!("Releasing frame source on last handle drop");
            self.0.release();
        }
    }
}

/// A frame source shared between handles.
///
/// Cloning a `SharedSource` aliases the same capture; it never opens or
/// copies anything. The capture is released once, when the final clone is
/// dropped.
pub struct SharedSource<S: FrameSource> {
    inner: Rc<RefCell<ReleaseOnDrop<S>>>,
}

impl<S: FrameSource> SharedSource<S> {
    /// Take ownership of `source`.
    pub fn new(source: S) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ReleaseOnDrop(source))),
        }
    }

    /// Borrow the source immutably.
    ///
    /// # Panics
    ///
    /// Panics if the source is currently borrowed mutably. Handle methods
    /// only hold borrows for the duration of a single call.
    pub fn borrow(&self) -> Ref<'_, S> {
        Ref::map(self.inner.borrow(), |cell| &cell.0)
    }

    /// Borrow the source mutably.
    ///
    /// # Panics
    ///
    /// Panics if the source is already borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, S> {
        RefMut::map(self.inner.borrow_mut(), |cell| &mut cell.0)
    }

    /// Returns `true` if both values alias the same capture.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Number of live references to the capture.
    pub fn reference_count(&self) -> usize {
        Rc::strong_count(&self.inner)
    }
}

impl<S: FrameSource> Clone for SharedSource<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: FrameSource> From<S> for SharedSource<S> {
    fn from(source: S) -> Self {
        Self::new(source)
    }
}

impl<S: FrameSource> Debug for SharedSource<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SharedSource")
            .field("references", &self.reference_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use super::*;

    struct CountingSource {
        opened: bool,
        releases: Rc<Cell<u32>>,
    }

    impl FrameSource for CountingSource {
        type Frame = ();

        fn grab(&mut self) -> bool {
            false
        }

        fn retrieve(&mut self) -> Option<()> {
            None
        }

        fn release(&mut self) {
            self.opened = false;
            self.releases.set(self.releases.get() + 1);
        }

        fn is_opened(&self) -> bool {
            self.opened
        }

        fn get(&self, _property_id: i32) -> f64 {
            0.0
        }

        fn set(&mut self, _property_id: i32, _value: f64) -> bool {
            false
        }
    }

    fn counting() -> (CountingSource, Rc<Cell<u32>>) {
        let releases = Rc::new(Cell::new(0));
        let source = CountingSource {
            opened: true,
            releases: Rc::clone(&releases),
        };
        (source, releases)
    }

    #[test]
    fn releases_once_when_last_clone_drops() {
        let (source, releases) = counting();
        let first = SharedSource::new(source);
        let second = first.clone();
        assert!(first.ptr_eq(&second));
        assert_eq!(first.reference_count(), 2);

        drop(first);
        assert_eq!(releases.get(), 0);
        drop(second);
        assert_eq!(releases.get(), 1);
    }

    #[test]
    fn explicit_release_is_not_repeated_on_drop() {
        let (source, releases) = counting();
        let shared = SharedSource::new(source);
        shared.borrow_mut().release();
        assert!(!shared.borrow().is_opened());
        drop(shared);
        assert_eq!(releases.get(), 1);
    }

    #[test]
    fn default_read_requires_a_grab() {
        let (mut source, _) = counting();
        assert!(source.read().is_none());
    }
}
