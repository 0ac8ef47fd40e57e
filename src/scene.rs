//! Range-bounded iteration.
//!
//! A [`Scene`] pairs a shared handle with a frame range `[start, end)`.
//! Iterating a scene pulls frames from the **current** cursor up to `end`;
//! it does not rewind to `start` on its own. Call [`Scene::reset`] first to
//! cover the whole declared range.
//!
//! # Example
//!
//! ```no_run
//! use videohandler::VideoHandle;
//!
//! let video = VideoHandle::open("input.mp4");
//! let scene = video.scene(120, Some(180));
//!
//! scene.reset();
//! for (offset, frame) in scene.iter().enumerate() {
//!     frame.save(format!("scene_{offset:03}.png")).unwrap();
//! }
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};

use crate::{handle::VideoHandle, iterator::Frames, source::FrameSource};

/// A `[start, end)` view over a shared handle.
///
/// Bounds are not validated. `start > end`, or a cursor already at or past
/// `end`, produce an empty pass; an `end` beyond the stream produces a short
/// one.
pub struct Scene<S: FrameSource> {
    handle: VideoHandle<S>,
    start: u64,
    end: u64,
}

impl<S: FrameSource> Scene<S> {
    /// A scene over `handle`'s source. `end` (exclusive) defaults to the
    /// total frame count reported right now.
    pub fn new(handle: &VideoHandle<S>, start: u64, end: Option<u64>) -> Self {
        let end = end.unwrap_or_else(|| handle.total_frames());
        log::debug!("Creating scene [{start}, {end})");
        Self {
            handle: handle.share(),
            start,
            end,
        }
    }

    /// First frame index of the range (inclusive).
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Frame index the range stops at (exclusive).
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Number of frames in the declared range.
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` if the declared range holds no frames.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The shared handle. Seeking through it moves the scene's cursor too.
    pub fn handle(&self) -> &VideoHandle<S> {
        &self.handle
    }

    /// Rewind the shared cursor to `start`.
    pub fn reset(&self) -> bool {
        self.handle.seek_to_frame_index(self.start)
    }

    /// Start a pass over `[current cursor, end)`.
    pub fn iter(&self) -> Frames<S> {
        let cursor = self.handle.current_index();
        let remaining = self.end.saturating_sub(cursor);
        log::trace!("Scene pass from frame {cursor} to {} ({remaining} frames)", self.end);
        Frames::new(self.handle.share(), Some(remaining))
    }
}

impl<S: FrameSource> IntoIterator for &Scene<S> {
    type Item = S::Frame;
    type IntoIter = Frames<S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<S: FrameSource> Debug for Scene<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Scene")
            .field("handle", &self.handle)
            .field("start", &self.start)
            .field("end", &self.end)
            .finish()
    }
}
