//! FFmpeg-backed frame source.
//!
//! [`FfmpegCapture`] implements [`FrameSource`] on top of `ffmpeg-next`. It
//! decodes the best video stream of a file sequentially and tracks the
//! cursor as the index of the frame the next grab will return.
//!
//! Position writes seek the container to the nearest keyframe at or before
//! the target and then decode forward, discarding frames until the target is
//! next. Frame-index seeks compare decoded frames by index, time seeks by
//! presentation time, so the two can land on different frames for
//! variable-frame-rate content.
//!
//! A seek derives the landing frame's index from its presentation time;
//! sequential grabs then count up from there. `POS_MSEC` always reports the
//! presentation time of the last grabbed frame, whichever way the cursor got
//! to where it is.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};

use ffmpeg_next::{
    Error as FfmpegError, Packet, Rational,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::context::Input,
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};

use crate::{
    configuration::{CaptureOptions, PixelFormat},
    conversion,
    error::CaptureError,
    property::CaptureProperty,
    source::FrameSource,
    utilities,
};

/// Sub-millisecond slack when comparing presentation times to a seek target.
const TIME_SEEK_TOLERANCE_MILLIS: f64 = 0.5;

/// A video capture decoding one file with FFmpeg.
///
/// Opening never panics. A capture that failed to open reports
/// [`is_opened`](FrameSource::is_opened) `false` and rejects every other
/// operation; use [`try_open`](FfmpegCapture::try_open) to learn why.
///
/// # Example
///
/// ```no_run
/// use videohandler::{FfmpegCapture, FrameSource, property};
///
/// let mut capture = FfmpegCapture::open("input.mp4");
/// if capture.is_opened() {
///     capture.set(property::POS_FRAMES, 10.0);
///     let frame = capture.read();
///     assert!(frame.is_some());
/// }
/// ```
pub struct FfmpegCapture {
    path: PathBuf,
    options: CaptureOptions,
    state: Option<DecodeState>,
}

struct DecodeState {
    input_context: Input,
    decoder: VideoDecoder,
    scaler: ScalingContext,
    video_stream_index: usize,
    time_base: Rational,
    start_pts: i64,
    /// Size of the frames handed out, after scaling.
    output_width: u32,
    output_height: u32,
    frames_per_second: f64,
    duration_millis: f64,
    decoded_frame: VideoFrame,
    scaled_frame: VideoFrame,
    cursor: Cursor,
    /// A grabbed frame is available for retrieval.
    has_frame: bool,
    /// A seek already decoded the next frame into `decoded_frame`.
    pending: bool,
    eof_sent: bool,
}

impl FfmpegCapture {
    /// Open `path` with default options.
    ///
    /// Failures are logged and produce a closed capture.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::open_with_options(path, CaptureOptions::default())
    }

    /// Open `path` with custom output options.
    ///
    /// Failures are logged and produce a closed capture.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: CaptureOptions) -> Self {
        let path = path.as_ref();
        match Self::try_open_with_options(path, options.clone()) {
            Ok(capture) => capture,
            Err(error) => {
                log::warn!("{error}");
                Self {
                    path: path.to_path_buf(),
                    options,
                    state: None,
                }
            }
        }
    }

    /// Open `path`, returning the reason on failure.
    ///
    /// # Errors
    ///
    /// - [`CaptureError::FileOpen`] if FFmpeg cannot open or probe the file.
    /// - [`CaptureError::NoVideoStream`] if the file has no video.
    /// - [`CaptureError::FfmpegError`] if the decoder or scaler cannot be
    ///   created.
    pub fn try_open<P: AsRef<Path>>(path: P) -> Result<Self, CaptureError> {
        Self::try_open_with_options(path, CaptureOptions::default())
    }

    /// Open `path` with custom output options, returning the reason on
    /// failure.
    ///
    /// # Errors
    ///
    /// See [`try_open`](FfmpegCapture::try_open).
    pub fn try_open_with_options<P: AsRef<Path>>(
        path: P,
        options: CaptureOptions,
    ) -> Result<Self, CaptureError> {
        let path = path.as_ref().to_path_buf();
        log::debug!("Opening video: {}", path.display());

        ffmpeg_next::init().map_err(|error| CaptureError::FileOpen {
            path: path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| CaptureError::FileOpen {
                path: path.clone(),
                reason: error.to_string(),
            })?;

        let duration_micros = input_context.duration();
        let duration_millis = if duration_micros > 0 {
            duration_micros as f64 / 1000.0
        } else {
            0.0
        };

        let (video_stream_index, time_base, start_pts, frames_per_second, stream_frames, decoder) = {
            let stream = input_context
                .streams()
                .best(Type::Video)
                .ok_or(CaptureError::NoVideoStream)?;

            let frame_rate = stream.avg_frame_rate();
            let frames_per_second = if frame_rate.denominator() != 0 {
                frame_rate.numerator() as f64 / frame_rate.denominator() as f64
            } else {
                let rate = stream.rate();
                if rate.denominator() != 0 {
                    rate.numerator() as f64 / rate.denominator() as f64
                } else {
                    0.0
                }
            };

            let decoder_context = CodecContext::from_parameters(stream.parameters())?;
            let decoder = decoder_context.decoder().video()?;

            (
                stream.index(),
                stream.time_base(),
                utilities::known_timestamp(stream.start_time()).unwrap_or(0),
                frames_per_second,
                stream.frames(),
                decoder,
            )
        };

        let frame_count = if stream_frames > 0 {
            stream_frames as u64
        } else {
            conversion::millis_to_frame(duration_millis, frames_per_second)
        };

        let width = decoder.width();
        let height = decoder.height();
        let (output_width, output_height) = options.resolve_dimensions(width, height);

        let scaler = ScalingContext::get(
            decoder.format(),
            width,
            height,
            options.pixel_format.to_ffmpeg_pixel(),
            output_width,
            output_height,
            ScalingFlags::BILINEAR,
        )?;

        log::debug!(
            "Opened {} ({}x{}, {:.3} fps, {} frames, stream={})",
            path.display(),
            width,
            height,
            frames_per_second,
            frame_count,
            video_stream_index,
        );

        Ok(Self {
            path,
            options,
            state: Some(DecodeState {
                input_context,
                decoder,
                scaler,
                video_stream_index,
                time_base,
                start_pts,
                output_width,
                output_height,
                frames_per_second,
                duration_millis,
                decoded_frame: VideoFrame::empty(),
                scaled_frame: VideoFrame::empty(),
                cursor: Cursor::new(frame_count),
                has_frame: false,
                pending: false,
                eof_sent: false,
            }),
        })
    }

    /// Path the capture was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Output options in effect.
    pub fn options(&self) -> &CaptureOptions {
        &self.options
    }

    /// Container duration in milliseconds, `0.0` when unknown or closed.
    pub fn duration_millis(&self) -> f64 {
        self.state.as_ref().map_or(0.0, |state| state.duration_millis)
    }
}

impl DecodeState {
    /// Decode the next frame of the video stream into `decoded_frame`.
    ///
    /// Returns `Ok(false)` once the decoder is drained.
    fn receive_next(&mut self) -> Result<bool, CaptureError> {
        loop {
            if self.decoder.receive_frame(&mut self.decoded_frame).is_ok() {
                return Ok(true);
            }

            if self.eof_sent {
                return Ok(false);
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.input_context) {
                Ok(()) => {
                    if packet.stream() == self.video_stream_index {
                        self.decoder.send_packet(&packet)?;
                    }
                }
                Err(FfmpegError::Eof) => {
                    self.decoder.send_eof()?;
                    self.eof_sent = true;
                }
                Err(error) => {
                    log::trace!("Skipping unreadable packet: {error}");
                }
            }
        }
    }

    /// Presentation time of `decoded_frame`, relative to the stream start.
    fn decoded_millis(&self) -> Option<f64> {
        self.decoded_frame
            .timestamp()
            .or_else(|| self.decoded_frame.pts())
            .map(|pts| utilities::pts_to_millis(pts - self.start_pts, self.time_base))
    }

    fn grab(&mut self) -> Result<bool, CaptureError> {
        if self.pending {
            self.pending = false;
        } else if !self.receive_next()? {
            self.has_frame = false;
            return Ok(false);
        }

        let millis = self.decoded_millis().unwrap_or_else(|| {
            conversion::frame_to_millis(self.cursor.index, self.frames_per_second)
        });
        self.cursor.advance(millis);
        self.has_frame = true;
        Ok(true)
    }

    fn retrieve(&mut self, pixel_format: PixelFormat) -> Result<Option<DynamicImage>, CaptureError> {
        if !self.has_frame {
            return Ok(None);
        }

        self.scaler.run(&self.decoded_frame, &mut self.scaled_frame)?;

        let width = self.output_width;
        let height = self.output_height;
        let buffer = utilities::frame_to_buffer(
            &self.scaled_frame,
            width,
            height,
            pixel_format.bytes_per_pixel(),
        );

        let image = match pixel_format {
            PixelFormat::Rgb8 => RgbImage::from_raw(width, height, buffer).map(DynamicImage::ImageRgb8),
            PixelFormat::Rgba8 => {
                RgbaImage::from_raw(width, height, buffer).map(DynamicImage::ImageRgba8)
            }
            PixelFormat::Gray8 => {
                GrayImage::from_raw(width, height, buffer).map(DynamicImage::ImageLuma8)
            }
        };

        image.map(Some).ok_or_else(|| {
            CaptureError::VideoDecodeError(format!(
                "Failed to construct {pixel_format:?} image from decoded frame data"
            ))
        })
    }

    /// Seek the container near `seek_millis`, then decode forward until
    /// `reached(index, millis)` accepts a frame. That frame becomes the next
    /// grab result.
    ///
    /// `seek_millis` should sit one frame before the target so the frame
    /// preceding it is decoded too and its time becomes the cursor time.
    fn seek_forward<F>(&mut self, seek_millis: f64, reached: F) -> Result<bool, CaptureError>
    where
        F: Fn(u64, f64) -> bool,
    {
        let seek_timestamp = utilities::millis_to_seek_timestamp(seek_millis);
        self.input_context.seek(seek_timestamp, ..seek_timestamp)?;
        self.decoder.flush();
        self.eof_sent = false;
        self.pending = false;
        self.has_frame = false;

        let mut previous: Option<(u64, f64)> = None;
        while self.receive_next()? {
            let millis = self.decoded_millis().unwrap_or(seek_millis);
            let index = conversion::millis_to_frame(millis, self.frames_per_second);
            if reached(index, millis) {
                let previous_millis = previous.map_or_else(
                    || self.estimated_previous_millis(index, millis),
                    |(_, previous_millis)| previous_millis,
                );
                self.cursor.land(index, previous_millis);
                self.pending = true;
                return Ok(true);
            }
            previous = Some((index, millis));
        }

        self.cursor.land_at_end(previous);
        Ok(true)
    }

    /// Time of the frame before `index` when the seek did not decode it.
    fn estimated_previous_millis(&self, index: u64, millis: f64) -> f64 {
        if index == 0 {
            return 0.0;
        }
        (millis - conversion::frame_to_millis(1, self.frames_per_second)).max(0.0)
    }

    fn seek_to_index(&mut self, target: u64) -> Result<bool, CaptureError> {
        if target > self.cursor.frame_count {
            log::debug!(
                "Rejecting seek to frame {target} (stream has {} frames)",
                self.cursor.frame_count
            );
            return Ok(false);
        }
        let seek_millis =
            conversion::frame_to_millis(target.saturating_sub(1), self.frames_per_second);
        self.seek_forward(seek_millis, |index, _| index >= target)
    }

    fn seek_to_millis(&mut self, target: f64) -> Result<bool, CaptureError> {
        if target < 0.0 || (self.duration_millis > 0.0 && target > self.duration_millis) {
            log::debug!(
                "Rejecting seek to {target:.3}ms (duration {:.3}ms)",
                self.duration_millis
            );
            return Ok(false);
        }
        let seek_millis =
            (target - conversion::frame_to_millis(1, self.frames_per_second)).max(0.0);
        self.seek_forward(seek_millis, |_, millis| {
            millis + TIME_SEEK_TOLERANCE_MILLIS >= target
        })
    }

    fn seek_to_ratio(&mut self, ratio: f64) -> Result<bool, CaptureError> {
        if !(0.0..=1.0).contains(&ratio) {
            return Ok(false);
        }
        if self.duration_millis > 0.0 {
            self.seek_to_millis(ratio * self.duration_millis)
        } else {
            self.seek_to_index(conversion::ratio_to_frame_floor(ratio, self.cursor.frame_count))
        }
    }

    fn ratio(&self) -> f64 {
        if self.duration_millis > 0.0 {
            (self.cursor.millis / self.duration_millis).clamp(0.0, 1.0)
        } else {
            conversion::frame_to_ratio(self.cursor.index, self.cursor.frame_count)
        }
    }
}

/// Where the capture stands in the stream.
///
/// `index` counts frames grabbed since the last anchor: the start of the
/// stream, or the frame a seek landed on, whose index comes from its
/// presentation time. `millis` is always the presentation time of the frame
/// just before `index` (the last one grabbed), or `0.0` at the start.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Cursor {
    /// Index of the frame the next grab returns.
    index: u64,
    millis: f64,
    /// Frames known to exist. Raised when decoding runs past it.
    frame_count: u64,
}

impl Cursor {
    fn new(frame_count: u64) -> Self {
        Self {
            index: 0,
            millis: 0.0,
            frame_count,
        }
    }

    /// A frame presented at `millis` was grabbed.
    fn advance(&mut self, millis: f64) {
        self.index += 1;
        self.millis = millis;
        self.frame_count = self.frame_count.max(self.index);
    }

    /// A seek decoded the frame at `index`; the next grab returns it.
    fn land(&mut self, index: u64, previous_millis: f64) {
        self.index = index;
        self.millis = previous_millis;
        self.frame_count = self.frame_count.max(index);
    }

    /// A seek decoded to the end of the stream without reaching its target.
    /// `last` is the final decoded frame, if any.
    fn land_at_end(&mut self, last: Option<(u64, f64)>) {
        if let Some((index, millis)) = last {
            self.frame_count = self.frame_count.max(index + 1);
            self.millis = millis;
        }
        self.index = self.frame_count;
    }
}

impl FrameSource for FfmpegCapture {
    type Frame = DynamicImage;

    fn grab(&mut self) -> bool {
        let Some(state) = self.state.as_mut() else {
            return false;
        };
        state.grab().unwrap_or_else(|error| {
            log::warn!("Grab failed at frame {}: {error}", state.cursor.index);
            false
        })
    }

    fn retrieve(&mut self) -> Option<DynamicImage> {
        let pixel_format = self.options.pixel_format;
        let state = self.state.as_mut()?;
        state.retrieve(pixel_format).unwrap_or_else(|error| {
            log::warn!("Retrieve failed at frame {}: {error}", state.cursor.index);
            None
        })
    }

    fn release(&mut self) {
        if self.state.take().is_some() {
            log::debug!("Released video: {}", self.path.display());
        }
    }

    fn is_opened(&self) -> bool {
        self.state.is_some()
    }

    fn get(&self, property_id: i32) -> f64 {
        let Some(state) = self.state.as_ref() else {
            return 0.0;
        };
        match CaptureProperty::from_id(property_id) {
            Some(CaptureProperty::PositionMillis) => state.cursor.millis,
            Some(CaptureProperty::PositionFrames) => state.cursor.index as f64,
            Some(CaptureProperty::PositionRatio) => state.ratio(),
            Some(CaptureProperty::FrameWidth) => state.output_width as f64,
            Some(CaptureProperty::FrameHeight) => state.output_height as f64,
            Some(CaptureProperty::FramesPerSecond) => state.frames_per_second,
            Some(CaptureProperty::FrameCount) => state.cursor.frame_count as f64,
            None => 0.0,
        }
    }

    fn set(&mut self, property_id: i32, value: f64) -> bool {
        let Some(state) = self.state.as_mut() else {
            return false;
        };
        if !value.is_finite() {
            return false;
        }
        let result = match CaptureProperty::from_id(property_id) {
            Some(CaptureProperty::PositionFrames) => {
                if value < 0.0 {
                    return false;
                }
                state.seek_to_index(conversion::property_to_index(value))
            }
            Some(CaptureProperty::PositionMillis) => state.seek_to_millis(value),
            Some(CaptureProperty::PositionRatio) => state.seek_to_ratio(value),
            _ => return false,
        };
        result.unwrap_or_else(|error| {
            log::warn!("Seek (property {property_id} = {value}) failed: {error}");
            false
        })
    }
}

impl Debug for FfmpegCapture {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let mut debug = f.debug_struct("FfmpegCapture");
        debug
            .field("path", &self.path)
            .field("options", &self.options)
            .field("opened", &self.state.is_some());
        if let Some(state) = &self.state {
            debug
                .field("position", &state.cursor.index)
                .field("frame_count", &state.cursor.frame_count)
                .field("frames_per_second", &state.frames_per_second);
        }
        debug.finish_non_exhaustive()
    }
}
