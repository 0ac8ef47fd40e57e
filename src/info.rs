//! Static stream properties.
//!
//! [`VideoInfo`] copies frame dimensions, frame count, and frame rate out of
//! a source once. It is never refreshed: if the source later revises its
//! frame count, the snapshot keeps the old value.

use crate::{
    conversion, handle::VideoHandle, property::CaptureProperty, source::FrameSource,
};

/// A frozen snapshot of a video's static properties.
///
/// # Example
///
/// ```no_run
/// use videohandler::VideoHandle;
///
/// let video = VideoHandle::open("input.mp4");
/// let info = video.info();
/// println!("{}x{} @ {} fps", info.frame_width, info.frame_height, info.fps);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[must_use]
pub struct VideoInfo {
    /// Frame width in pixels.
    pub frame_width: u32,
    /// Frame height in pixels.
    pub frame_height: u32,
    /// Total frame count at the time of the snapshot.
    pub total_frames: u64,
    /// Frames per second (may be approximate for variable-frame-rate content).
    pub fps: f64,
}

impl VideoInfo {
    /// Snapshot the source behind `handle`.
    pub fn from_handle<S: FrameSource>(handle: &VideoHandle<S>) -> Self {
        Self {
            frame_width: handle.frame_width(),
            frame_height: handle.frame_height(),
            total_frames: handle.total_frames(),
            fps: handle.fps(),
        }
    }

    /// Snapshot a bare source without wrapping it in a handle.
    pub fn from_source<S: FrameSource>(source: &S) -> Self {
        let property = |property: CaptureProperty| source.get(property.id());
        Self {
            frame_width: property(CaptureProperty::FrameWidth) as u32,
            frame_height: property(CaptureProperty::FrameHeight) as u32,
            total_frames: conversion::property_to_index(property(CaptureProperty::FrameCount)),
            fps: property(CaptureProperty::FramesPerSecond),
        }
    }

    /// `(width, height)` of the frames.
    pub fn frame_size(&self) -> (u32, u32) {
        (self.frame_width, self.frame_height)
    }

    /// Stream duration implied by the frame count and frame rate.
    pub fn duration_seconds(&self) -> f64 {
        conversion::frame_to_seconds(self.total_frames, self.fps)
    }
}

impl<S: FrameSource> From<&VideoHandle<S>> for VideoInfo {
    fn from(handle: &VideoHandle<S>) -> Self {
        Self::from_handle(handle)
    }
}
