//! FFmpeg capture integration tests.
//!
//! Tests that decode real video require `tests/fixtures/sample_video.mp4`
//! (generate it with `tests/fixtures/generate_fixtures.sh`) and return early
//! when it is missing.

use std::path::Path;

use videohandler::{
    CaptureOptions, FfmpegCapture, FrameSource, PixelFormat, VideoHandle, property,
};

const SAMPLE_VIDEO: &str = "tests/fixtures/sample_video.mp4";

fn sample_video() -> Option<VideoHandle<FfmpegCapture>> {
    if !Path::new(SAMPLE_VIDEO).exists() {
        return None;
    }
    let video = VideoHandle::open(SAMPLE_VIDEO);
    assert!(video.is_opened(), "Failed to open test video");
    Some(video)
}

#[test]
fn open_nonexistent_file_is_not_opened() {
    let video = VideoHandle::open("this_file_does_not_exist.mp4");
    assert!(!video.is_opened());
    assert_eq!(video.next_frame().map(|frame| frame.width()), None);
    assert_eq!(video.total_frames(), 0);
    assert!(!video.seek_to_frame_index(0));
}

#[test]
fn try_open_nonexistent_file_reports_the_path() {
    let result = FfmpegCapture::try_open("this_file_does_not_exist.mp4");
    let error_message = result.unwrap_err().to_string();
    assert!(
        error_message.contains("Failed to open video"),
        "Error message should mention open failure: {error_message}",
    );
    assert!(error_message.contains("this_file_does_not_exist.mp4"));
}

#[test]
fn open_invalid_file() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_file_path = temporary_directory.path().join("invalid.mp4");
    std::fs::write(&invalid_file_path, b"this is not a video file")
        .expect("Failed to write invalid file");

    assert!(FfmpegCapture::try_open(&invalid_file_path).is_err());

    let capture = FfmpegCapture::open(&invalid_file_path);
    assert!(!capture.is_opened());
    assert_eq!(capture.path(), invalid_file_path.as_path());
}

#[test]
fn release_closes_the_capture() {
    let Some(video) = sample_video() else {
        return;
    };
    video.release();
    assert!(!video.is_opened());
    assert!(video.next_frame().is_none());
    assert_eq!(video.get_prop(property::FRAME_COUNT), 0.0);
}

#[test]
fn stream_properties_are_reported() {
    let Some(video) = sample_video() else {
        return;
    };
    let info = video.info();
    assert!(info.frame_width > 0);
    assert!(info.frame_height > 0);
    assert!(info.total_frames > 0);
    assert!(info.fps > 0.0);
    assert_eq!(video.current_index(), 0);
}

#[test]
fn frames_have_the_reported_size() {
    let Some(video) = sample_video() else {
        return;
    };
    let (width, height) = video.frame_dimensions();
    let frame = video.next_frame().expect("Failed to read first frame");
    assert_eq!((frame.width(), frame.height()), (width, height));
    assert_eq!(video.current_index(), 1);
}

#[test]
fn grab_advances_without_decoding() {
    let Some(video) = sample_video() else {
        return;
    };
    assert_eq!(video.skip(10), 0);
    assert_eq!(video.current_index(), 10);
    assert!(video.retrieve().is_some());
}

#[test]
fn seek_to_index_lands_on_the_target() {
    let Some(video) = sample_video() else {
        return;
    };
    let target = video.total_frames() / 2;
    assert!(video.seek_to_frame_index(target));
    assert_eq!(video.current_index(), target);
    assert!(video.next_frame().is_some());
    assert_eq!(video.current_index(), target + 1);
}

#[test]
fn seek_backwards_after_reading() {
    let Some(video) = sample_video() else {
        return;
    };
    video.skip(30);
    assert!(video.seek_to_frame_index(5));
    assert_eq!(video.current_index(), 5);
}

#[test]
fn seek_beyond_the_end_is_rejected() {
    let Some(video) = sample_video() else {
        return;
    };
    video.seek_to_frame_index(3);
    assert!(!video.seek_to_frame_index(video.total_frames() + 100));
    assert!(!video.seek_to_millis(3_600_000.0));
    assert!(!video.seek_to_ratio(1.5));
}

#[test]
fn native_time_is_the_last_grabbed_frame() {
    let Some(video) = sample_video() else {
        return;
    };

    assert!(video.seek_to_seconds(1.0));
    let index = video.current_index();
    let expected = video.frame_to_millis(index - 1);
    assert!((video.get_millis() - expected).abs() < 1.0, "index={index}");
    assert!((video.get_millis_by_fps() - video.frame_to_millis(index)).abs() < 1e-9);

    assert!(video.seek_to_ratio_by_frames(0.5));
    assert!((video.get_ratio() - 0.5).abs() < 0.05);
}

#[test]
fn seeking_and_reading_agree_on_position() {
    let Some(video) = sample_video() else {
        return;
    };

    assert!(video.seek_to_frame_index(30));
    let sought = (video.current_index(), video.get_millis(), video.get_ratio());

    assert!(video.seek_to_frame_index(29));
    assert!(video.grab());
    let stepped = (video.current_index(), video.get_millis(), video.get_ratio());

    assert!(video.seek_to_frame_index(0));
    assert_eq!(video.skip(30), 0);
    let read = (video.current_index(), video.get_millis(), video.get_ratio());

    assert_eq!(sought.0, 30);
    assert_eq!(stepped.0, 30);
    assert_eq!(read.0, 30);
    assert!((sought.1 - stepped.1).abs() < 1e-6, "{sought:?} vs {stepped:?}");
    assert!((sought.1 - read.1).abs() < 1e-6, "{sought:?} vs {read:?}");
    assert!((sought.2 - read.2).abs() < 1e-9);
}

#[test]
fn reading_to_the_end_stays_within_the_frame_count() {
    let Some(video) = sample_video() else {
        return;
    };

    let read = video.frames().count() as u64;
    let total = video.total_frames();
    assert_eq!(video.current_index(), read);
    assert!(read <= total, "read={read} total={total}");
    assert!(video.get_ratio_by_frames() <= 1.0);

    assert!(video.seek_to_frame_index(read - 1));
    assert!(video.next_frame().is_some());
    assert!(video.next_frame().is_none());
}

#[test]
fn scene_over_a_real_video() {
    let Some(video) = sample_video() else {
        return;
    };
    let scene = video.scene(10, Some(15));
    assert!(scene.reset());
    assert_eq!(scene.iter().count(), 5);
    assert_eq!(video.current_index(), 15);
}

#[test]
fn gray_frames_use_one_channel() {
    if !Path::new(SAMPLE_VIDEO).exists() {
        return;
    }
    let options = CaptureOptions::new()
        .with_pixel_format(PixelFormat::Gray8)
        .with_resolution(Some(160), None);
    let video = VideoHandle::open_with_options(SAMPLE_VIDEO, options);
    let frame = video.next_frame().expect("Failed to read first frame");
    assert_eq!(frame.width(), 160);
    assert_eq!(frame.color().channel_count(), 1);
}
