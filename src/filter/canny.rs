//! Edge detection filter

use super::{value_of, ParamSpec, ParamValues, VideoFilter};
use crate::error::Result;
use crate::frame::{VideoFrame, CHANNELS};
use rayon::prelude::*;

const PARAMS: &[ParamSpec] = &[
    ParamSpec {
        name: "Horizontal",
        min: 1.0,
        max: 1000.0,
        default: 100.0,
    },
    ParamSpec {
        name: "Vertical",
        min: 1.0,
        max: 1000.0,
        default: 100.0,
    },
];

/// An edge detection filter in the style of Canny
///
/// Each channel is processed independently: Sobel gradients, L1 magnitude,
/// then double thresholding - a pixel is an edge if its magnitude reaches the
/// high threshold, or reaches the low threshold while an 8-neighbor reaches
/// the high one. The per-channel edge maps are merged back into a 3-channel
/// frame.
pub struct CannyFilter;

impl CannyFilter {
    /// Create a new edge detection filter
    pub fn new() -> Self {
        CannyFilter
    }
}

impl Default for CannyFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Sobel L1 gradient magnitude of one channel plane, clamped borders
fn gradient_magnitude(plane: &[u8], width: usize, height: usize) -> Vec<i32> {
    let mut mag = vec![0i32; plane.len()];
    let at = |x: usize, y: usize| plane[y * width + x] as i32;

    mag.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        for (x, m) in row.iter_mut().enumerate() {
            let xl = x.saturating_sub(1);
            let xr = (x + 1).min(width - 1);
            let yt = y.saturating_sub(1);
            let yb = (y + 1).min(height - 1);

            let gx = at(xr, yt) + 2 * at(xr, y) + at(xr, yb)
                - at(xl, yt)
                - 2 * at(xl, y)
                - at(xl, yb);
            let gy = at(xl, yb) + 2 * at(x, yb) + at(xr, yb)
                - at(xl, yt)
                - 2 * at(x, yt)
                - at(xr, yt);
            *m = gx.abs() + gy.abs();
        }
    });
    mag
}

/// Double-threshold classification of a gradient magnitude plane
fn threshold_edges(mag: &[i32], width: usize, height: usize, low: i32, high: i32) -> Vec<u8> {
    let mut out = vec![0u8; mag.len()];
    for y in 0..height {
        for x in 0..width {
            let m = mag[y * width + x];
            if m >= high {
                out[y * width + x] = 255;
            } else if m >= low {
                // Weak edge: keep only when connected to a strong neighbor
                let xl = x.saturating_sub(1);
                let xr = (x + 1).min(width - 1);
                let yt = y.saturating_sub(1);
                let yb = (y + 1).min(height - 1);
                'scan: for ny in yt..=yb {
                    for nx in xl..=xr {
                        if mag[ny * width + nx] >= high {
                            out[y * width + x] = 255;
                            break 'scan;
                        }
                    }
                }
            }
        }
    }
    out
}

impl VideoFilter for CannyFilter {
    fn name(&self) -> &'static str {
        "Edge Detection (Canny)"
    }

    fn params(&self) -> &[ParamSpec] {
        PARAMS
    }

    fn apply(&self, frame: &VideoFrame, values: &ParamValues) -> Result<VideoFrame> {
        let t1 = value_of(values, "Horizontal")?;
        let t2 = value_of(values, "Vertical")?;
        let low = t1.min(t2).round() as i32;
        let high = t1.max(t2).round() as i32;

        let width = frame.width as usize;
        let height = frame.height as usize;

        // Split into channel planes, detect edges on each, merge back
        let mut planes = [
            vec![0u8; width * height],
            vec![0u8; width * height],
            vec![0u8; width * height],
        ];
        for (i, px) in frame.data.chunks_exact(CHANNELS).enumerate() {
            planes[0][i] = px[0];
            planes[1][i] = px[1];
            planes[2][i] = px[2];
        }

        let edges: Vec<Vec<u8>> = planes
            .iter()
            .map(|plane| {
                let mag = gradient_magnitude(plane, width, height);
                threshold_edges(&mag, width, height, low, high)
            })
            .collect();

        let mut data = vec![0u8; frame.data.len()];
        for i in 0..width * height {
            data[i * CHANNELS] = edges[0][i];
            data[i * CHANNELS + 1] = edges[1][i];
            data[i * CHANNELS + 2] = edges[2][i];
        }

        VideoFrame::from_data(frame.width, frame.height, data)
    }
}
