//! Lazy, pull-based frame iteration.
//!
//! Every iterator in this crate is a [`Frames`] value: it holds a shared
//! handle, pulls one frame per [`next()`](Iterator::next) through
//! [`VideoHandle::next_frame`], and stops either when the source runs out
//! ([`IterationState::Exhausted`]) or when its pull budget is spent
//! ([`IterationState::LimitReached`]).
//!
//! The cursor is not owned by the iterator. Anything else holding the same
//! source can move it between pulls, and the iterator simply continues from
//! wherever it is.
//!
//! # Example
//!
//! ```no_run
//! use videohandler::{VideoHandle, VideoIterator};
//!
//! let video = VideoHandle::open("input.mp4");
//! let first_ten = VideoIterator::new(&video, Some(10));
//!
//! for frame in &first_ten {
//!     println!("{}x{}", frame.width(), frame.height());
//! }
//! ```

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    iter::FusedIterator,
};

use crate::{handle::VideoHandle, source::FrameSource};

/// Where an iteration stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationState {
    /// More frames may follow.
    Running,
    /// The source returned no frame. Terminal.
    Exhausted,
    /// The pull budget was spent. Terminal.
    LimitReached,
}

/// A lazy sequence of frames pulled from a shared handle.
///
/// Created by [`VideoHandle::frames`], [`VideoIterator::iter`], and
/// [`Scene::iter`](crate::Scene::iter).
pub struct Frames<S: FrameSource> {
    handle: VideoHandle<S>,
    limit: Option<u64>,
    pulled: u64,
    state: IterationState,
}

impl<S: FrameSource> Frames<S> {
    pub(crate) fn new(handle: VideoHandle<S>, limit: Option<u64>) -> Self {
        Self {
            handle,
            limit,
            pulled: 0,
            state: IterationState::Running,
        }
    }

    /// Current state.
    pub fn state(&self) -> IterationState {
        self.state
    }

    /// Frames yielded so far.
    pub fn pulled(&self) -> u64 {
        self.pulled
    }

    /// The pull budget, `None` for unbounded iteration.
    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// The handle frames are pulled from.
    pub fn handle(&self) -> &VideoHandle<S> {
        &self.handle
    }

    fn finish(&mut self, state: IterationState) {
        log::trace!("Frame iteration finished after {} frames: {state:?}", self.pulled);
        self.state = state;
    }

    fn budget_spent(&self) -> bool {
        self.limit.is_some_and(|limit| self.pulled >= limit)
    }
}

impl<S: FrameSource> Iterator for Frames<S> {
    type Item = S::Frame;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state != IterationState::Running {
            return None;
        }

        if self.budget_spent() {
            self.finish(IterationState::LimitReached);
            return None;
        }

        match self.handle.next_frame() {
            Some(frame) => {
                self.pulled += 1;
                if self.budget_spent() {
                    self.finish(IterationState::LimitReached);
                }
                Some(frame)
            }
            None => {
                self.finish(IterationState::Exhausted);
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.state != IterationState::Running {
            return (0, Some(0));
        }
        let upper = self
            .limit
            .map(|limit| usize::try_from(limit - self.pulled).unwrap_or(usize::MAX));
        (0, upper)
    }
}

impl<S: FrameSource> FusedIterator for Frames<S> {}

impl<S: FrameSource> Debug for Frames<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Frames")
            .field("limit", &self.limit)
            .field("pulled", &self.pulled)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// A reusable, optionally count-limited iteration over a shared handle.
///
/// The limit counts frames pulled by one pass, not cursor positions. With a
/// limit of 10 and the cursor at index 0, skipping 5 frames through another
/// alias before iterating makes the pass end at index 15 (or earlier if the
/// source runs out). Each call to [`iter`](VideoIterator::iter) starts a
/// fresh count from the cursor's current position.
pub struct VideoIterator<S: FrameSource> {
    handle: VideoHandle<S>,
    count_limit: Option<u64>,
}

impl<S: FrameSource> VideoIterator<S> {
    /// Iterate `handle`'s source, yielding at most `count_limit` frames per
    /// pass. `None` iterates until the source is exhausted.
    pub fn new(handle: &VideoHandle<S>, count_limit: Option<u64>) -> Self {
        Self {
            handle: handle.share(),
            count_limit,
        }
    }

    /// Start a pass from the current cursor.
    pub fn iter(&self) -> Frames<S> {
        Frames::new(self.handle.share(), self.count_limit)
    }

    /// The per-pass limit.
    pub fn count_limit(&self) -> Option<u64> {
        self.count_limit
    }

    /// The shared handle.
    pub fn handle(&self) -> &VideoHandle<S> {
        &self.handle
    }
}

impl<S: FrameSource> IntoIterator for &VideoIterator<S> {
    type Item = S::Frame;
    type IntoIter = Frames<S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<S: FrameSource> IntoIterator for VideoIterator<S> {
    type Item = S::Frame;
    type IntoIter = Frames<S>;

    fn into_iter(self) -> Self::IntoIter {
        Frames::new(self.handle, self.count_limit)
    }
}

impl<S: FrameSource> Debug for VideoIterator<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoIterator")
            .field("handle", &self.handle)
            .field("count_limit", &self.count_limit)
            .finish()
    }
}
