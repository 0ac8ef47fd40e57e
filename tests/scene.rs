//! Range-bounded iteration.

mod common;

use common::MemorySource;
use videohandler::{IterationState, Scene, VideoHandle};

fn handle(total: u64) -> VideoHandle<MemorySource> {
    VideoHandle::new(MemorySource::new(total, 25.0))
}

#[test]
fn scene_iterates_from_the_cursor_not_the_start() {
    let video = handle(100);
    let scene = video.scene(10, Some(20));

    let frames: Vec<u64> = scene.iter().collect();
    assert_eq!(frames, (0..20).collect::<Vec<_>>());
}

#[test]
fn reset_covers_the_declared_range() {
    let video = handle(100);
    let scene = Scene::new(&video, 10, Some(20));

    assert!(scene.reset());
    let frames: Vec<u64> = scene.iter().collect();
    assert_eq!(frames, (10..20).collect::<Vec<_>>());
    assert_eq!(video.current_index(), 20);
}

#[test]
fn scene_is_reusable_after_reset() {
    let video = handle(100);
    let scene = video.scene(40, Some(43));

    scene.reset();
    assert_eq!(scene.iter().count(), 3);
    assert_eq!(scene.iter().count(), 0);

    scene.reset();
    let frames: Vec<u64> = (&scene).into_iter().collect();
    assert_eq!(frames, vec![40, 41, 42]);
}

#[test]
fn cursor_past_end_yields_nothing() {
    let video = handle(100);
    let scene = video.scene(10, Some(20));
    video.seek_to_frame_index(30);

    let mut frames = scene.iter();
    assert_eq!(frames.next(), None);
    assert_eq!(frames.state(), IterationState::LimitReached);
    assert_eq!(video.current_index(), 30);
}

#[test]
fn end_defaults_to_the_frame_count() {
    let video = handle(25);
    let scene = video.scene(20, None);
    assert_eq!(scene.end(), 25);
    assert_eq!(scene.len(), 5);

    scene.reset();
    let frames: Vec<u64> = scene.iter().collect();
    assert_eq!(frames, vec![20, 21, 22, 23, 24]);
}

#[test]
fn default_end_is_fixed_at_construction() {
    let video = handle(25);
    let scene = video.scene(0, None);
    video.source_mut().grow(10);
    assert_eq!(scene.end(), 25);
}

#[test]
fn start_after_end_is_an_empty_scene() {
    let video = handle(100);
    let scene = video.scene(30, Some(10));
    assert!(scene.is_empty());
    assert_eq!(scene.len(), 0);

    scene.reset();
    assert_eq!(scene.iter().count(), 0);
    assert_eq!(video.current_index(), 30);
}

#[test]
fn end_beyond_the_stream_gives_a_short_pass() {
    let video = handle(15);
    let scene = video.scene(10, Some(50));

    scene.reset();
    let mut frames = scene.iter();
    assert_eq!(frames.by_ref().count(), 5);
    assert_eq!(frames.state(), IterationState::Exhausted);
}

#[test]
fn scene_shares_the_handle_cursor() {
    let video = handle(100);
    let scene = video.scene(0, Some(10));
    assert!(scene.handle().shares_source_with(&video));

    scene.reset();
    video.skip(4);
    let frames: Vec<u64> = scene.iter().collect();
    assert_eq!(frames, vec![4, 5, 6, 7, 8, 9]);
}
