//! Sharpening filter

use super::{ParamValues, VideoFilter};
use crate::error::Result;
use crate::frame::{VideoFrame, CHANNELS};
use rayon::prelude::*;

/// 3x3 sharpening kernel
const KERNEL: [[i32; 3]; 3] = [[-1, -1, -1], [-1, 9, -1], [-1, -1, -1]];

/// A basic sharpening filter applying a fixed 3x3 kernel with clamped edges
pub struct SharpenFilter;

impl SharpenFilter {
    /// Create a new sharpen filter
    pub fn new() -> Self {
        SharpenFilter
    }
}

impl Default for SharpenFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoFilter for SharpenFilter {
    fn name(&self) -> &'static str {
        "Sharpen"
    }

    fn apply(&self, frame: &VideoFrame, _values: &ParamValues) -> Result<VideoFrame> {
        let width = frame.width as usize;
        let height = frame.height as usize;
        let stride = frame.stride();
        let src = &frame.data;

        let mut data = vec![0u8; src.len()];
        data.par_chunks_mut(stride)
            .enumerate()
            .for_each(|(y, row)| {
                for x in 0..width {
                    for c in 0..CHANNELS {
                        let mut acc = 0i32;
                        for (ky, kernel_row) in KERNEL.iter().enumerate() {
                            let sy = (y + ky).saturating_sub(1).min(height - 1);
                            for (kx, &k) in kernel_row.iter().enumerate() {
                                let sx = (x + kx).saturating_sub(1).min(width - 1);
                                acc += k * src[sy * stride + sx * CHANNELS + c] as i32;
                            }
                        }
                        row[x * CHANNELS + c] = acc.clamp(0, 255) as u8;
                    }
                }
            });

        VideoFrame::from_data(frame.width, frame.height, data)
    }
}
