//! Box blur filter

use super::{value_of, ParamSpec, ParamValues, VideoFilter};
use crate::error::Result;
use crate::frame::{VideoFrame, CHANNELS};
use rayon::prelude::*;

const PARAMS: &[ParamSpec] = &[
    ParamSpec {
        name: "Horizontal",
        min: 2.0,
        max: 100.0,
        default: 10.0,
    },
    ParamSpec {
        name: "Vertical",
        min: 2.0,
        max: 100.0,
        default: 10.0,
    },
];

/// A simple blurring filter averaging over a window of a given width and
/// height, applied as two separable passes
pub struct BlurFilter;

impl BlurFilter {
    /// Create a new blur filter
    pub fn new() -> Self {
        BlurFilter
    }
}

impl Default for BlurFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Average `src` horizontally over a window of `k` pixels, windows truncated
/// at the frame edges
fn blur_rows(src: &[u8], width: usize, k: usize) -> Vec<u8> {
    let stride = width * CHANNELS;
    let mut out = vec![0u8; src.len()];
    let half = k / 2;

    out.par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row)| {
            let src_row = &src[y * stride..(y + 1) * stride];
            for x in 0..width {
                let lo = x.saturating_sub(half);
                let hi = (x + (k - 1) - half).min(width - 1);
                let count = (hi - lo + 1) as u32;
                for c in 0..CHANNELS {
                    let mut sum = 0u32;
                    for sx in lo..=hi {
                        sum += src_row[sx * CHANNELS + c] as u32;
                    }
                    row[x * CHANNELS + c] = ((sum + count / 2) / count) as u8;
                }
            }
        });
    out
}

/// Average `src` vertically over a window of `k` pixels
fn blur_cols(src: &[u8], width: usize, height: usize, k: usize) -> Vec<u8> {
    let stride = width * CHANNELS;
    let mut out = vec![0u8; src.len()];
    let half = k / 2;

    out.par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row)| {
            let lo = y.saturating_sub(half);
            let hi = (y + (k - 1) - half).min(height - 1);
            let count = (hi - lo + 1) as u32;
            for i in 0..stride {
                let mut sum = 0u32;
                for sy in lo..=hi {
                    sum += src[sy * stride + i] as u32;
                }
                row[i] = ((sum + count / 2) / count) as u8;
            }
        });
    out
}

impl VideoFilter for BlurFilter {
    fn name(&self) -> &'static str {
        "Blur"
    }

    fn params(&self) -> &[ParamSpec] {
        PARAMS
    }

    fn apply(&self, frame: &VideoFrame, values: &ParamValues) -> Result<VideoFrame> {
        let kw = (value_of(values, "Horizontal")?.round().max(1.0)) as usize;
        let kh = (value_of(values, "Vertical")?.round().max(1.0)) as usize;

        let width = frame.width as usize;
        let height = frame.height as usize;

        let horizontal = blur_rows(&frame.data, width, kw);
        let data = blur_cols(&horizontal, width, height, kh);

        VideoFrame::from_data(frame.width, frame.height, data)
    }
}
