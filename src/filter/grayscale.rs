//! Grayscale filter

use super::{ParamValues, VideoFilter};
use crate::error::Result;
use crate::frame::VideoFrame;

/// A simple grayscale filter
///
/// Converts to luma and back so that the output keeps the 3-channel layout
/// the display and write pipeline expect.
pub struct GrayscaleFilter;

impl GrayscaleFilter {
    /// Create a new grayscale filter
    pub fn new() -> Self {
        GrayscaleFilter
    }
}

impl Default for GrayscaleFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoFilter for GrayscaleFilter {
    fn name(&self) -> &'static str {
        "Grayscale"
    }

    fn apply(&self, frame: &VideoFrame, _values: &ParamValues) -> Result<VideoFrame> {
        let mut out = frame.clone();
        for px in out.data.chunks_exact_mut(3) {
            // BT.601 luma from BGR
            let b = px[0] as u32;
            let g = px[1] as u32;
            let r = px[2] as u32;
            let y = ((299 * r + 587 * g + 114 * b) + 500) / 1000;
            let y = y as u8;
            px[0] = y;
            px[1] = y;
            px[2] = y;
        }
        Ok(out)
    }
}
