//! Capture configuration.
//!
//! [`CaptureOptions`] controls how the FFmpeg capture converts decoded
//! frames: output pixel format and output resolution. The defaults keep the
//! source resolution and produce RGB8 images.
//!
//! # Example
//!
//! ```no_run
//! use videohandler::{CaptureOptions, PixelFormat, VideoHandle};
//!
//! let options = CaptureOptions::new()
//!     .with_pixel_format(PixelFormat::Gray8)
//!     .with_resolution(Some(320), None);
//! let video = VideoHandle::open_with_options("input.mp4", options);
//! assert!(video.is_opened());
//! ```

use ffmpeg_next::format::Pixel;

/// Output pixel format for decoded frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// 8-bit RGB (24 bpp). This is the default.
    #[default]
    Rgb8,
    /// 8-bit RGBA with alpha pre-set to 255 (32 bpp).
    Rgba8,
    /// 8-bit grayscale (8 bpp).
    Gray8,
}

impl PixelFormat {
    /// Scaler target and packed bytes per pixel.
    fn layout(self) -> (Pixel, usize) {
        match self {
            PixelFormat::Rgb8 => (Pixel::RGB24, 3),
            PixelFormat::Rgba8 => (Pixel::RGBA, 4),
            PixelFormat::Gray8 => (Pixel::GRAY8, 1),
        }
    }

    pub(crate) fn to_ffmpeg_pixel(self) -> Pixel {
        self.layout().0
    }

    /// Bytes per pixel in the packed output buffer.
    pub fn bytes_per_pixel(self) -> usize {
        self.layout().1
    }

    /// Parse a user-facing name such as `"rgb"` or `"gray8"`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "rgb8" | "rgb" => Some(PixelFormat::Rgb8),
            "rgba8" | "rgba" => Some(PixelFormat::Rgba8),
            "gray8" | "gray" | "grey" | "grayscale" | "greyscale" => Some(PixelFormat::Gray8),
            _ => None,
        }
    }
}

/// How the capture converts decoded frames.
///
/// When only one dimension is set and
/// [`maintain_aspect_ratio`](CaptureOptions::maintain_aspect_ratio) is on,
/// the other dimension follows the source aspect ratio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureOptions {
    /// Output pixel format.
    pub pixel_format: PixelFormat,
    /// Target width. `None` keeps the source width.
    pub width: Option<u32>,
    /// Target height. `None` keeps the source height.
    pub height: Option<u32>,
    /// Derive the missing dimension from the source aspect ratio.
    pub maintain_aspect_ratio: bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureOptions {
    /// Source resolution, RGB8 output.
    pub fn new() -> Self {
        Self {
            pixel_format: PixelFormat::Rgb8,
            width: None,
            height: None,
            maintain_aspect_ratio: true,
        }
    }

    /// Set the output pixel format.
    #[must_use]
    pub fn with_pixel_format(mut self, format: PixelFormat) -> Self {
        self.pixel_format = format;
        self
    }

    /// Set the output resolution. `None` keeps the source value.
    #[must_use]
    pub fn with_resolution(mut self, width: Option<u32>, height: Option<u32>) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Control aspect-ratio preservation. Defaults to `true`.
    #[must_use]
    pub fn with_maintain_aspect_ratio(mut self, maintain: bool) -> Self {
        self.maintain_aspect_ratio = maintain;
        self
    }

    /// Output `(width, height)` for a source of the given size.
    ///
    /// A target of `0` counts as unset. A side derived from the aspect ratio
    /// is never smaller than one pixel.
    pub fn resolve_dimensions(&self, source_width: u32, source_height: u32) -> (u32, u32) {
        let follow = |target: u32, target_source: u32, other_source: u32| {
            if !self.maintain_aspect_ratio || target_source == 0 {
                return other_source;
            }
            let scaled = f64::from(other_source) * f64::from(target) / f64::from(target_source);
            (scaled.round() as u32).max(1)
        };

        match (self.width.filter(|&w| w > 0), self.height.filter(|&h| h > 0)) {
            (Some(width), Some(height)) => (width, height),
            (Some(width), None) => (width, follow(width, source_width, source_height)),
            (None, Some(height)) => (follow(height, source_height, source_width), height),
            (None, None) => (source_width, source_height),
        }
    }
}
