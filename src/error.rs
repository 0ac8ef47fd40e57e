//! Error types for the `videohandler` crate.
//!
//! Handle-level operations never return errors: pulls yield `Option`, seeks
//! yield `bool`. [`CaptureError`] is only surfaced by the fallible FFmpeg
//! constructor ([`FfmpegCapture::try_open`](crate::FfmpegCapture::try_open))
//! and used internally by the decode paths, where it is logged and flattened
//! into the boolean/sentinel results.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// Errors raised while opening or decoding a capture.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CaptureError {
    /// The media file could not be opened.
    #[error("Failed to open video at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to the open call.
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A video frame could not be decoded or converted.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate while building or saving a frame.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl From<FfmpegError> for CaptureError {
    fn from(error: FfmpegError) -> Self {
        CaptureError::FfmpegError(error.to_string())
    }
}
