//! The video handle.
//!
//! [`VideoHandle`] wraps a [`FrameSource`] and layers position mapping on top
//! of it. The only real state is the source's cursor, the zero-based index
//! of the frame the next pull returns. Everything else (seconds,
//! milliseconds, ratio, frame numbers) is derived from the cursor or written
//! through to it.
//!
//! Positions come in four flavours:
//!
//! - **frame index**: zero-based, what the cursor stores;
//! - **frame number**: one-based, `number = index + 1`;
//! - **time**: seconds or milliseconds;
//! - **ratio**: `0.0` at the start of the stream, `1.0` at the end.
//!
//! Time and ratio have two independent implementations each: one that asks
//! the source natively (`seek_to_seconds`, `get_ratio`, ...) and one that
//! computes through the frame rate or frame count (`seek_to_seconds_by_fps`,
//! `get_ratio_by_frames`, ...). They are kept apart because they do not
//! always agree: container time indexes rarely line up with exact frame
//! boundaries.
//!
//! # Example
//!
//! ```no_run
//! use videohandler::VideoHandle;
//!
//! let video = VideoHandle::open("input.mp4");
//! if !video.is_opened() {
//!     return;
//! }
//!
//! video.seek_to_seconds_by_fps(2.0);
//! if let Some(frame) = video.next_frame() {
//!     frame.save("two_seconds.png").unwrap();
//! }
//! println!("now at {:.3}s", video.get_seconds_by_fps());
//! ```

use std::{
    cell::{Ref, RefMut},
    fmt::{Debug, Formatter, Result as FmtResult},
    path::Path,
};

use crate::{
    capture::FfmpegCapture,
    configuration::CaptureOptions,
    conversion,
    info::VideoInfo,
    iterator::{Frames, VideoIterator},
    property::CaptureProperty,
    scene::Scene,
    source::{FrameSource, SharedSource},
};

/// A handle to a frame source.
///
/// Handles built from a path or a source value own that source. Handles
/// built with [`share`](VideoHandle::share), [`Clone`], or
/// [`from_shared`](VideoHandle::from_shared) alias an existing source: every
/// alias reads and moves the same cursor. The source is released when the
/// last alias is dropped, or earlier by an explicit
/// [`release`](VideoHandle::release).
///
/// Handles are single-threaded (`!Send`, `!Sync`).
pub struct VideoHandle<S: FrameSource> {
    source: SharedSource<S>,
}

impl VideoHandle<FfmpegCapture> {
    /// Open a video file with FFmpeg.
    ///
    /// Never fails: check [`is_opened`](VideoHandle::is_opened) before use.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::new(FfmpegCapture::open(path))
    }

    /// Open a video file with custom output options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: CaptureOptions) -> Self {
        Self::new(FfmpegCapture::open_with_options(path, options))
    }
}

impl<S: FrameSource> VideoHandle<S> {
    /// Wrap a source, taking ownership of it.
    pub fn new(source: S) -> Self {
        Self {
            source: SharedSource::new(source),
        }
    }

    /// Wrap an already-shared source without opening anything.
    pub fn from_shared(source: SharedSource<S>) -> Self {
        Self { source }
    }

    /// A second handle on the same source and cursor.
    pub fn share(&self) -> Self {
        Self {
            source: self.source.clone(),
        }
    }

    /// The shared source behind this handle.
    pub fn shared_source(&self) -> SharedSource<S> {
        self.source.clone()
    }

    /// Returns `true` if both handles alias the same source.
    pub fn shares_source_with(&self, other: &Self) -> bool {
        self.source.ptr_eq(&other.source)
    }

    /// Borrow the underlying source.
    ///
    /// # Panics
    ///
    /// Panics if the source is currently borrowed mutably.
    pub fn source(&self) -> Ref<'_, S> {
        self.source.borrow()
    }

    /// Borrow the underlying source mutably.
    ///
    /// # Panics
    ///
    /// Panics if the source is already borrowed.
    pub fn source_mut(&self) -> RefMut<'_, S> {
        self.source.borrow_mut()
    }

    // ── source delegation ──────────────────────────────────────────

    /// Advance the cursor, discarding the frame.
    pub fn grab(&self) -> bool {
        self.source.borrow_mut().grab()
    }

    /// Decode the frame at the already-grabbed position.
    pub fn retrieve(&self) -> Option<S::Frame> {
        self.source.borrow_mut().retrieve()
    }

    /// Grab and decode the next frame.
    pub fn read(&self) -> Option<S::Frame> {
        self.source.borrow_mut().read()
    }

    /// Release the source for every alias.
    ///
    /// Any operation after a release reports failure through the source.
    pub fn release(&self) {
        self.source.borrow_mut().release();
    }

    /// Same as [`release`](VideoHandle::release).
    pub fn close(&self) {
        self.release();
    }

    /// Returns `true` while the source is usable.
    pub fn is_opened(&self) -> bool {
        self.source.borrow().is_opened()
    }

    /// Read a raw property by id.
    pub fn get_prop(&self, property_id: i32) -> f64 {
        self.source.borrow().get(property_id)
    }

    /// Write a raw property by id.
    pub fn set_prop(&self, property_id: i32, value: f64) -> bool {
        self.source.borrow_mut().set(property_id, value)
    }

    fn property(&self, property: CaptureProperty) -> f64 {
        self.get_prop(property.id())
    }

    fn set_property(&self, property: CaptureProperty, value: f64) -> bool {
        self.set_prop(property.id(), value)
    }

    // ── pulling frames ─────────────────────────────────────────────

    /// Decode and return the next frame, or `None` once no frame can be
    /// read. This is the pull every iterator is built on.
    pub fn next_frame(&self) -> Option<S::Frame> {
        self.read()
    }

    /// Discard up to `amount` frames without decoding them.
    ///
    /// Stops at the first failed grab and returns how many of the requested
    /// frames were not skipped: `0` on a complete skip.
    pub fn skip(&self, amount: u64) -> u64 {
        let mut remaining = amount;
        while remaining > 0 {
            if !self.grab() {
                log::trace!("Skip stopped early with {remaining} of {amount} frames left");
                break;
            }
            remaining -= 1;
        }
        remaining
    }

    /// Iterate over every remaining frame, from the current cursor until the
    /// source is exhausted.
    pub fn frames(&self) -> Frames<S> {
        Frames::new(self.share(), None)
    }

    /// A reusable iteration over at most `count_limit` frames per pass.
    pub fn iter_limited(&self, count_limit: Option<u64>) -> VideoIterator<S> {
        VideoIterator::new(self, count_limit)
    }

    /// A range-bounded view over `[start, end)` sharing this cursor.
    ///
    /// `end` defaults to the current total frame count.
    pub fn scene(&self, start: u64, end: Option<u64>) -> Scene<S> {
        Scene::new(self, start, end)
    }

    /// Snapshot of the static stream properties.
    pub fn info(&self) -> VideoInfo {
        VideoInfo::from_handle(self)
    }

    // ── stream properties ──────────────────────────────────────────

    /// Zero-based index of the frame the next pull returns.
    pub fn current_index(&self) -> u64 {
        conversion::property_to_index(self.property(CaptureProperty::PositionFrames))
    }

    /// Frame width in pixels.
    pub fn frame_width(&self) -> u32 {
        self.property(CaptureProperty::FrameWidth) as u32
    }

    /// Frame height in pixels.
    pub fn frame_height(&self) -> u32 {
        self.property(CaptureProperty::FrameHeight) as u32
    }

    /// `(width, height)` of the frames.
    pub fn frame_dimensions(&self) -> (u32, u32) {
        (self.frame_width(), self.frame_height())
    }

    /// Frames per second as reported by the source.
    pub fn fps(&self) -> f64 {
        self.property(CaptureProperty::FramesPerSecond)
    }

    /// Total frame count as currently reported by the source.
    pub fn total_frames(&self) -> u64 {
        conversion::property_to_index(self.property(CaptureProperty::FrameCount))
    }

    // ── seeking ────────────────────────────────────────────────────

    /// Move the cursor to the one-based `frame_number`.
    ///
    /// Frame number `0` does not exist and is rejected without touching the
    /// source.
    pub fn seek_to_frame_number(&self, frame_number: u64) -> bool {
        match frame_number.checked_sub(1) {
            Some(index) => self.seek_to_frame_index(index),
            None => {
                log::debug!("Rejecting seek to frame number 0");
                false
            }
        }
    }

    /// Move the cursor to the zero-based `frame_index`.
    pub fn seek_to_frame_index(&self, frame_index: u64) -> bool {
        log::trace!("Seeking to frame index {frame_index}");
        self.set_property(CaptureProperty::PositionFrames, frame_index as f64)
    }

    /// Seek with the source's native time positioning. Approximate.
    pub fn seek_to_seconds(&self, seconds: f64) -> bool {
        self.seek_to_millis(seconds * 1000.0)
    }

    /// Seek with the source's native time positioning. Approximate.
    pub fn seek_to_millis(&self, millis: f64) -> bool {
        log::trace!("Seeking to {millis:.3}ms");
        self.set_property(CaptureProperty::PositionMillis, millis)
    }

    /// Seek to the frame containing `seconds`, computed from the frame rate.
    /// Approximate.
    pub fn seek_to_seconds_by_fps(&self, seconds: f64) -> bool {
        let index = conversion::seconds_to_frame_floor(seconds, self.fps());
        self.seek_to_frame_number(index + 1)
    }

    /// Seek to the frame containing `millis`, computed from the frame rate.
    /// Approximate.
    pub fn seek_to_millis_by_fps(&self, millis: f64) -> bool {
        self.seek_to_seconds_by_fps(millis / 1000.0)
    }

    /// Seek with the source's native ratio positioning.
    pub fn seek_to_ratio(&self, ratio: f64) -> bool {
        log::trace!("Seeking to ratio {ratio:.4}");
        self.set_property(CaptureProperty::PositionRatio, ratio)
    }

    /// Seek to `floor(ratio * total_frames)`.
    pub fn seek_to_ratio_by_frames(&self, ratio: f64) -> bool {
        let index = conversion::ratio_to_frame_floor(ratio, self.total_frames());
        self.seek_to_frame_number(index + 1)
    }

    // ── reading the position back ──────────────────────────────────

    /// Current position in seconds, as reported natively by the source.
    pub fn get_seconds(&self) -> f64 {
        self.get_millis() / 1000.0
    }

    /// Current position in milliseconds, as reported natively by the source.
    pub fn get_millis(&self) -> f64 {
        self.property(CaptureProperty::PositionMillis)
    }

    /// Current position in seconds, computed as `current_index / fps`.
    pub fn get_seconds_by_fps(&self) -> f64 {
        self.frame_to_seconds(self.current_index())
    }

    /// Current position in milliseconds, computed from the frame rate.
    pub fn get_millis_by_fps(&self) -> f64 {
        self.frame_to_millis(self.current_index())
    }

    /// Current position in `[0, 1]`, as reported natively by the source.
    pub fn get_ratio(&self) -> f64 {
        self.property(CaptureProperty::PositionRatio)
    }

    /// Current position in `[0, 1]`, computed as
    /// `current_index / total_frames`.
    pub fn get_ratio_by_frames(&self) -> f64 {
        conversion::frame_to_ratio(self.current_index(), self.total_frames())
    }

    // ── conversions independent of the cursor ──────────────────────

    /// Seconds at which `frame_index` is presented, using the frame rate.
    pub fn frame_to_seconds(&self, frame_index: u64) -> f64 {
        conversion::frame_to_seconds(frame_index, self.fps())
    }

    /// Milliseconds at which `frame_index` is presented, using the frame
    /// rate.
    pub fn frame_to_millis(&self, frame_index: u64) -> f64 {
        conversion::frame_to_millis(frame_index, self.fps())
    }

    /// Nearest frame index for `seconds`.
    pub fn seconds_to_frame(&self, seconds: f64) -> u64 {
        conversion::seconds_to_frame(seconds, self.fps())
    }

    /// Nearest frame index for `millis`.
    pub fn millis_to_frame(&self, millis: f64) -> u64 {
        conversion::millis_to_frame(millis, self.fps())
    }
}

impl<S: FrameSource> Clone for VideoHandle<S> {
    fn clone(&self) -> Self {
        self.share()
    }
}

impl<S: FrameSource> From<S> for VideoHandle<S> {
    fn from(source: S) -> Self {
        Self::new(source)
    }
}

impl<S: FrameSource> From<SharedSource<S>> for VideoHandle<S> {
    fn from(source: SharedSource<S>) -> Self {
        Self::from_shared(source)
    }
}

impl<S: FrameSource> Debug for VideoHandle<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoHandle")
            .field("source", &self.source)
            .finish()
    }
}

impl<S: FrameSource> IntoIterator for &VideoHandle<S> {
    type Item = S::Frame;
    type IntoIter = Frames<S>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames()
    }
}
