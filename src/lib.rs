//! # videohandler
//!
//! Handle videos frame by frame: step through frames, convert between frame
//! indices, frame numbers, timestamps, and ratios, and iterate over bounded
//! ranges, all on top of a single capture cursor.
//!
//! Decoding is delegated to a [`FrameSource`]. The crate ships
//! [`FfmpegCapture`], powered by
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next), which yields frames
//! as [`image::DynamicImage`] values.
//!
//! ## Quick Start
//!
//! ### Step Through a Video
//!
//! ```no_run
//! use videohandler::VideoHandle;
//!
//! let video = VideoHandle::open("input.mp4");
//! assert!(video.is_opened());
//!
//! video.skip(30);
//! let frame = video.next_frame().unwrap();
//! frame.save("frame_30.png").unwrap();
//! ```
//!
//! ### Seek by Time or Ratio
//!
//! ```no_run
//! use videohandler::VideoHandle;
//!
//! let video = VideoHandle::open("input.mp4");
//!
//! // Native container seek.
//! video.seek_to_seconds(12.5);
//! // Frame-rate based seek to the same moment.
//! video.seek_to_seconds_by_fps(12.5);
//! // Halfway through.
//! video.seek_to_ratio_by_frames(0.5);
//!
//! println!("frame {} of {}", video.current_index(), video.total_frames());
//! ```
//!
//! ### Iterate a Range
//!
//! ```no_run
//! use videohandler::{VideoHandle, VideoIterator};
//!
//! let video = VideoHandle::open("input.mp4");
//!
//! // At most 5 frames from the current position.
//! for frame in &VideoIterator::new(&video, Some(5)) {
//!     println!("{}x{}", frame.width(), frame.height());
//! }
//!
//! // Frames 100..200.
//! let scene = video.scene(100, Some(200));
//! scene.reset();
//! let count = scene.iter().count();
//! assert!(count <= 100);
//! ```
//!
//! ## Shared Cursor
//!
//! Handles, iterators, and scenes built from one source never copy it. They
//! all move the same cursor, and the source is released when the last of
//! them is dropped. See [`VideoHandle`] for details.
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod capture;
pub mod configuration;
pub mod conversion;
pub mod error;
pub mod handle;
pub mod info;
pub mod iterator;
pub mod logging;
pub mod property;
pub mod scene;
pub mod source;
mod utilities;

pub use capture::FfmpegCapture;
pub use configuration::{CaptureOptions, PixelFormat};
pub use error::CaptureError;
pub use handle::VideoHandle;
pub use info::VideoInfo;
pub use iterator::{Frames, IterationState, VideoIterator};
pub use logging::{LogLevel, get_ffmpeg_log_level, set_ffmpeg_log_level};
pub use property::CaptureProperty;
pub use scene::Scene;
pub use source::{FrameSource, SharedSource};
