//! Internal helpers for the FFmpeg capture.
//!
//! Pixel-plane copying and timestamp rescaling that do not belong to the
//! public position API.

use ffmpeg_next::{Rational, frame::Video as VideoFrame};
use ffmpeg_sys_next::{AV_NOPTS_VALUE, AV_TIME_BASE};

/// Copy the first plane of a packed video frame into a tightly-packed buffer.
///
/// FFmpeg frames usually pad each row; the padding is stripped so the
/// result can be handed to [`image::ImageBuffer::from_raw`].
pub(crate) fn frame_to_buffer(
    video_frame: &VideoFrame,
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let row_length = (width as usize) * bytes_per_pixel;
    let rows = height as usize;
    let data = video_frame.data(0);

    if stride == row_length {
        data[..row_length * rows].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(row_length * rows);
        for row in 0..rows {
            let row_start = row * stride;
            buffer.extend_from_slice(&data[row_start..row_start + row_length]);
        }
        buffer
    }
}

/// Rescale a timestamp in `time_base` units to milliseconds.
pub(crate) fn pts_to_millis(pts: i64, time_base: Rational) -> f64 {
    let denominator = time_base.denominator();
    if denominator == 0 {
        return 0.0;
    }
    pts as f64 * time_base.numerator() as f64 * 1000.0 / denominator as f64
}

/// Convert milliseconds to a container seek timestamp in `AV_TIME_BASE`
/// units (microseconds).
pub(crate) fn millis_to_seek_timestamp(millis: f64) -> i64 {
    (millis.max(0.0) * AV_TIME_BASE as f64 / 1000.0) as i64
}

/// `None` when FFmpeg reports an unset timestamp.
pub(crate) fn known_timestamp(value: i64) -> Option<i64> {
    (value != AV_NOPTS_VALUE).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pts_rescales_with_time_base() {
        assert_eq!(pts_to_millis(90_000, Rational::new(1, 90_000)), 1000.0);
        assert_eq!(pts_to_millis(3, Rational::new(1001, 30_000)), 100.1);
        assert_eq!(pts_to_millis(5, Rational::new(1, 0)), 0.0);
    }

    #[test]
    fn seek_timestamps_are_microseconds() {
        assert_eq!(millis_to_seek_timestamp(1500.0), 1_500_000);
        assert_eq!(millis_to_seek_timestamp(-20.0), 0);
    }

    #[test]
    fn unset_timestamps_are_filtered() {
        assert_eq!(known_timestamp(AV_NOPTS_VALUE), None);
        assert_eq!(known_timestamp(0), Some(0));
    }
}
