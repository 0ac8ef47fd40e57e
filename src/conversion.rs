//! Frame, time, and ratio conversions.
//!
//! Pure functions that map between frame indices and time using a frame
//! rate. Frame → time is plain division. Time → frame rounds to the nearest
//! frame, half away from zero ([`f64::round`]). A non-positive or non-finite
//! frame rate maps every frame to `0.0` rather than dividing by zero.
//!
//! These conversions assume a constant frame rate. On variable-frame-rate
//! content they are approximations.

/// Seconds at which `frame_index` is presented.
pub fn frame_to_seconds(frame_index: u64, frames_per_second: f64) -> f64 {
    if !is_usable_rate(frames_per_second) {
        return 0.0;
    }
    frame_index as f64 / frames_per_second
}

/// Milliseconds at which `frame_index` is presented.
pub fn frame_to_millis(frame_index: u64, frames_per_second: f64) -> f64 {
    if !is_usable_rate(frames_per_second) {
        return 0.0;
    }
    frame_index as f64 * 1000.0 / frames_per_second
}

/// Nearest frame index for a time in seconds. Negative times map to `0`.
pub fn seconds_to_frame(seconds: f64, frames_per_second: f64) -> u64 {
    to_frame_index((seconds * frames_per_second).round())
}

/// Nearest frame index for a time in milliseconds. Negative times map to `0`.
pub fn millis_to_frame(millis: f64, frames_per_second: f64) -> u64 {
    to_frame_index((frames_per_second * millis / 1000.0).round())
}

/// Frame index containing a time in seconds (rounded down).
pub fn seconds_to_frame_floor(seconds: f64, frames_per_second: f64) -> u64 {
    to_frame_index((seconds * frames_per_second).floor())
}

/// Frame index at `ratio` of `total_frames` (rounded down).
pub fn ratio_to_frame_floor(ratio: f64, total_frames: u64) -> u64 {
    to_frame_index((ratio * total_frames as f64).floor())
}

/// Fraction of `total_frames` covered by `frame_index`.
///
/// Returns `0.0` for an empty stream.
pub fn frame_to_ratio(frame_index: u64, total_frames: u64) -> f64 {
    if total_frames == 0 {
        return 0.0;
    }
    frame_index as f64 / total_frames as f64
}

/// Convert a numeric property value to a count or index.
///
/// Capture properties are floating point. Negative and NaN values become
/// `0`; fractional values are truncated.
pub fn property_to_index(value: f64) -> u64 {
    to_frame_index(value.trunc())
}

fn to_frame_index(value: f64) -> u64 {
    if value.is_nan() || value <= 0.0 {
        0
    } else {
        value as u64
    }
}

fn is_usable_rate(frames_per_second: f64) -> bool {
    frames_per_second.is_finite() && frames_per_second > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_to_time_is_plain_division() {
        assert_eq!(frame_to_seconds(50, 25.0), 2.0);
        assert_eq!(frame_to_millis(50, 25.0), 2000.0);
        assert!((frame_to_seconds(1, 30.0) - 1.0 / 30.0).abs() < 1e-12);
    }

    #[test]
    fn zero_rate_does_not_divide() {
        assert_eq!(frame_to_seconds(10, 0.0), 0.0);
        assert_eq!(frame_to_millis(10, f64::NAN), 0.0);
        assert_eq!(seconds_to_frame(3.0, 0.0), 0);
    }

    #[test]
    fn time_to_frame_rounds_half_away_from_zero() {
        // 0.5 frames at 10 fps
        assert_eq!(seconds_to_frame(0.05, 10.0), 1);
        assert_eq!(seconds_to_frame(0.04, 10.0), 0);
        assert_eq!(millis_to_frame(150.0, 10.0), 2);
        assert_eq!(millis_to_frame(1000.0, 29.97), 30);
    }

    #[test]
    fn negative_time_clamps_to_first_frame() {
        assert_eq!(seconds_to_frame(-2.0, 25.0), 0);
        assert_eq!(millis_to_frame(-1.0, 25.0), 0);
        assert_eq!(seconds_to_frame_floor(-0.1, 25.0), 0);
    }

    #[test]
    fn round_trip_stays_within_one_frame() {
        for fps in [23.976, 24.0, 25.0, 29.97, 30.0, 59.94, 60.0] {
            for index in 0..500_u64 {
                let seconds = frame_to_seconds(index, fps);
                let back = seconds_to_frame(seconds, fps);
                assert!(back.abs_diff(index) <= 1, "fps={fps} index={index} back={back}");

                let millis = frame_to_millis(index, fps);
                let back = millis_to_frame(millis, fps);
                assert!(back.abs_diff(index) <= 1, "fps={fps} index={index} back={back}");
            }
        }
    }

    #[test]
    fn floor_variants_truncate() {
        assert_eq!(seconds_to_frame_floor(1.99, 10.0), 19);
        assert_eq!(ratio_to_frame_floor(0.5, 101), 50);
        assert_eq!(ratio_to_frame_floor(1.0, 100), 100);
        assert_eq!(ratio_to_frame_floor(0.0, 100), 0);
    }

    #[test]
    fn ratio_of_empty_stream_is_zero() {
        assert_eq!(frame_to_ratio(5, 0), 0.0);
        assert_eq!(frame_to_ratio(25, 100), 0.25);
    }

    #[test]
    fn frame_count_from_duration_rounds() {
        // 10.01s at 29.97 fps is 299.9997 frames.
        assert_eq!(millis_to_frame(10_010.0, 29.97), 300);
        assert_eq!(millis_to_frame(5_000.0, 30.0), 150);
        assert_eq!(millis_to_frame(0.0, 30.0), 0);
    }

    #[test]
    fn property_values_become_indices() {
        assert_eq!(property_to_index(12.0), 12);
        assert_eq!(property_to_index(12.9), 12);
        assert_eq!(property_to_index(-3.0), 0);
        assert_eq!(property_to_index(f64::NAN), 0);
    }
}
