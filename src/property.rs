//! Capture property identifiers.
//!
//! A capture exposes its state through numeric property ids read with
//! `get` and written with `set`. The ids are the video-capture library's own
//! codes and are passed through untouched; [`CaptureProperty`] only gives
//! them names.

/// Current position in milliseconds.
pub const POS_MSEC: i32 = 0;
/// Zero-based index of the frame that will be decoded next.
pub const POS_FRAMES: i32 = 1;
/// Relative position in the stream, `0.0` at the start and `1.0` at the end.
pub const POS_AVI_RATIO: i32 = 2;
/// Width of the frames in the stream.
pub const FRAME_WIDTH: i32 = 3;
/// Height of the frames in the stream.
pub const FRAME_HEIGHT: i32 = 4;
/// Frame rate.
pub const FPS: i32 = 5;
/// Number of frames in the stream.
pub const FRAME_COUNT: i32 = 7;

/// The capture properties this crate reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureProperty {
    /// See [`POS_MSEC`].
    PositionMillis,
    /// See [`POS_FRAMES`].
    PositionFrames,
    /// See [`POS_AVI_RATIO`].
    PositionRatio,
    /// See [`FRAME_WIDTH`].
    FrameWidth,
    /// See [`FRAME_HEIGHT`].
    FrameHeight,
    /// See [`FPS`].
    FramesPerSecond,
    /// See [`FRAME_COUNT`].
    FrameCount,
}

impl CaptureProperty {
    /// Every known property, in id order.
    pub const ALL: [CaptureProperty; 7] = [
        CaptureProperty::PositionMillis,
        CaptureProperty::PositionFrames,
        CaptureProperty::PositionRatio,
        CaptureProperty::FrameWidth,
        CaptureProperty::FrameHeight,
        CaptureProperty::FramesPerSecond,
        CaptureProperty::FrameCount,
    ];

    /// The raw id understood by the capture.
    pub const fn id(self) -> i32 {
        match self {
            CaptureProperty::PositionMillis => POS_MSEC,
            CaptureProperty::PositionFrames => POS_FRAMES,
            CaptureProperty::PositionRatio => POS_AVI_RATIO,
            CaptureProperty::FrameWidth => FRAME_WIDTH,
            CaptureProperty::FrameHeight => FRAME_HEIGHT,
            CaptureProperty::FramesPerSecond => FPS,
            CaptureProperty::FrameCount => FRAME_COUNT,
        }
    }

    /// Look up a property by raw id. Unknown ids return `None`.
    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|property| property.id() == id)
    }

    /// Whether the property describes the cursor and may be written.
    pub const fn is_position(self) -> bool {
        matches!(
            self,
            CaptureProperty::PositionMillis
                | CaptureProperty::PositionFrames
                | CaptureProperty::PositionRatio
        )
    }
}

impl From<CaptureProperty> for i32 {
    fn from(property: CaptureProperty) -> Self {
        property.id()
    }
}
