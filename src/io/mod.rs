//! Frame sources and sinks
//!
//! The save and preview paths treat video files as opaque sequential frame
//! streams behind these two traits. Resolution and frame rate are read from
//! the source at open time and are fixed for the lifetime of one stream.

pub mod rawvideo;

pub use rawvideo::{RawVideoSink, RawVideoSource};

use crate::error::{Error, Result};
use crate::frame::VideoFrame;
use std::path::Path;

/// A sequential source of video frames
pub trait FrameSource: Send {
    /// Source frame rate in frames per second
    fn frame_rate(&self) -> f64;

    /// Frame width in pixels
    fn width(&self) -> u32;

    /// Frame height in pixels
    fn height(&self) -> u32;

    /// Read the next frame; returns [`Error::EndOfStream`] when none remain
    fn read_frame(&mut self) -> Result<VideoFrame>;

    /// Close the source and release its resources
    fn close(&mut self) -> Result<()>;
}

/// A sequential sink for video frames
pub trait FrameSink: Send {
    /// Write one frame
    fn write_frame(&mut self, frame: &VideoFrame) -> Result<()>;

    /// Flush and close the sink
    fn close(&mut self) -> Result<()>;
}

/// Open a frame source for the given file
pub fn create_source(path: &Path) -> Result<Box<dyn FrameSource>> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("vfraw") => Ok(Box::new(RawVideoSource::open(path)?)),
        _ => Err(Error::unsupported(format!(
            "No frame source available for file: {}",
            path.display()
        ))),
    }
}

/// Create a frame sink for the given file
pub fn create_sink(path: &Path, fps: f64, width: u32, height: u32) -> Result<Box<dyn FrameSink>> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("vfraw") => Ok(Box::new(RawVideoSink::create(path, fps, width, height)?)),
        _ => Err(Error::unsupported(format!(
            "No frame sink available for file: {}",
            path.display()
        ))),
    }
}
