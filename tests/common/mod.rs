//! In-memory frame source shared by the integration tests.
//!
//! Frames are their own indices, so a test can tell exactly which frame a
//! pull returned. Native time and ratio seeks round to the nearest frame,
//! which deliberately differs from the floor used by the frame-rate based
//! handle methods.

#![allow(dead_code)]

use std::{cell::Cell, rc::Rc};

use videohandler::{FrameSource, property};

pub struct MemorySource {
    total: u64,
    fps: f64,
    width: u32,
    height: u32,
    cursor: u64,
    last_grabbed: Option<u64>,
    opened: bool,
    releases: Rc<Cell<u32>>,
}

impl MemorySource {
    pub fn new(total: u64, fps: f64) -> Self {
        Self {
            total,
            fps,
            width: 640,
            height: 360,
            cursor: 0,
            last_grabbed: None,
            opened: true,
            releases: Rc::new(Cell::new(0)),
        }
    }

    /// A source that failed to open.
    pub fn closed() -> Self {
        let mut source = Self::new(0, 0.0);
        source.opened = false;
        source
    }

    /// Counter incremented on every release.
    pub fn release_counter(&self) -> Rc<Cell<u32>> {
        Rc::clone(&self.releases)
    }

    /// Simulate a source that discovers more frames after opening.
    pub fn grow(&mut self, extra: u64) {
        self.total += extra;
    }

    fn move_cursor(&mut self, index: f64) -> bool {
        if !self.opened || index.is_nan() || index < 0.0 || index > self.total as f64 {
            return false;
        }
        self.cursor = index as u64;
        self.last_grabbed = None;
        true
    }
}

impl FrameSource for MemorySource {
    type Frame = u64;

    fn grab(&mut self) -> bool {
        if !self.opened || self.cursor >= self.total {
            self.last_grabbed = None;
            return false;
        }
        self.last_grabbed = Some(self.cursor);
        self.cursor += 1;
        true
    }

    fn retrieve(&mut self) -> Option<u64> {
        if self.opened { self.last_grabbed } else { None }
    }

    fn release(&mut self) {
        self.opened = false;
        self.releases.set(self.releases.get() + 1);
    }

    fn is_opened(&self) -> bool {
        self.opened
    }

    fn get(&self, property_id: i32) -> f64 {
        if !self.opened {
            return 0.0;
        }
        match property_id {
            property::POS_MSEC => self.cursor as f64 * 1000.0 / self.fps,
            property::POS_FRAMES => self.cursor as f64,
            property::POS_AVI_RATIO => {
                if self.total == 0 {
                    0.0
                } else {
                    self.cursor as f64 / self.total as f64
                }
            }
            property::FRAME_WIDTH => self.width as f64,
            property::FRAME_HEIGHT => self.height as f64,
            property::FPS => self.fps,
            property::FRAME_COUNT => self.total as f64,
            _ => 0.0,
        }
    }

    fn set(&mut self, property_id: i32, value: f64) -> bool {
        match property_id {
            property::POS_FRAMES => self.move_cursor(value.trunc()),
            property::POS_MSEC => self.move_cursor((value * self.fps / 1000.0).round()),
            property::POS_AVI_RATIO if (0.0..=1.0).contains(&value) => {
                self.move_cursor((value * self.total as f64).round())
            }
            _ => false,
        }
    }
}
