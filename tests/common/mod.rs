//! Common test utilities for VFU integration tests
//!
//! Provides frame generators and in-memory frame source/sink doubles shared
//! across the test suites.

#![allow(dead_code)]

use parking_lot::Mutex;
use std::sync::Arc;
use vfu_lib::error::{Error, Result};
use vfu_lib::frame::VideoFrame;
use vfu_lib::io::{FrameSink, FrameSource};

// ============================================================================
// Frame Generation
// ============================================================================

/// Create a solid-color test frame
pub fn solid_frame(width: u32, height: u32, bgr: [u8; 3]) -> VideoFrame {
    VideoFrame::solid(width, height, bgr)
}

/// Create a test frame with a per-pixel gradient pattern seeded by `index`
pub fn gradient_frame(width: u32, height: u32, index: u64) -> VideoFrame {
    let mut frame = VideoFrame::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let v = ((index as u32 + x * 7 + y * 13) % 256) as u8;
            frame.set_pixel(x, y, [v, v.wrapping_add(85), v.wrapping_add(170)]);
        }
    }
    frame
}

// ============================================================================
// In-Memory Source / Sink Doubles
// ============================================================================

/// A frame source serving a fixed list of frames from memory
pub struct MemorySource {
    frames: std::vec::IntoIter<VideoFrame>,
    width: u32,
    height: u32,
    fps: f64,
    closed: Arc<Mutex<bool>>,
}

impl MemorySource {
    pub fn new(frames: Vec<VideoFrame>, fps: f64) -> Self {
        let (width, height) = frames
            .first()
            .map(|f| (f.width, f.height))
            .unwrap_or((0, 0));
        MemorySource {
            frames: frames.into_iter(),
            width,
            height,
            fps,
            closed: Arc::new(Mutex::new(false)),
        }
    }

    /// Shared flag observing whether `close` was called
    pub fn closed_flag(&self) -> Arc<Mutex<bool>> {
        Arc::clone(&self.closed)
    }
}

impl FrameSource for MemorySource {
    fn frame_rate(&self) -> f64 {
        self.fps
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn read_frame(&mut self) -> Result<VideoFrame> {
        self.frames.next().ok_or(Error::EndOfStream)
    }

    fn close(&mut self) -> Result<()> {
        *self.closed.lock() = true;
        Ok(())
    }
}

/// A frame sink collecting written frames into shared memory
pub struct MemorySink {
    frames: Arc<Mutex<Vec<VideoFrame>>>,
    closed: Arc<Mutex<bool>>,
    /// Writing the frame at this index fails, simulating a mid-stream
    /// destination error
    fail_at: Option<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        MemorySink {
            frames: Arc::new(Mutex::new(Vec::new())),
            closed: Arc::new(Mutex::new(false)),
            fail_at: None,
        }
    }

    pub fn failing_at(index: usize) -> Self {
        let mut sink = Self::new();
        sink.fail_at = Some(index);
        sink
    }

    /// Shared storage of the frames written so far
    pub fn frames(&self) -> Arc<Mutex<Vec<VideoFrame>>> {
        Arc::clone(&self.frames)
    }

    /// Shared flag observing whether `close` was called
    pub fn closed_flag(&self) -> Arc<Mutex<bool>> {
        Arc::clone(&self.closed)
    }
}

impl FrameSink for MemorySink {
    fn write_frame(&mut self, frame: &VideoFrame) -> Result<()> {
        let mut frames = self.frames.lock();
        if Some(frames.len()) == self.fail_at {
            return Err(Error::Io(std::io::Error::other("simulated write failure")));
        }
        frames.push(frame.clone());
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        *self.closed.lock() = true;
        Ok(())
    }
}
