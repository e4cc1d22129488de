//! Face detection filter
//!
//! The detector model is a heavyweight read-only resource: it is built once
//! when the registry loads the filter and shared across every invocation via
//! `Arc`, so concurrent preview ticks and save jobs can call `apply` at the
//! same time without any hidden mutable state.

use super::{value_of, ParamSpec, ParamValues, VideoFilter};
use crate::error::Result;
use crate::frame::VideoFrame;
use std::sync::Arc;

const PARAMS: &[ParamSpec] = &[ParamSpec {
    name: "Scale factor",
    min: 2.0,
    max: 100.0,
    default: 5.0,
}];

/// Rectangle outline color (BGR green) and thickness, matching the classic
/// detector overlay
const BOX_COLOR: [u8; 3] = [0, 255, 0];
const BOX_THICKNESS: u32 = 15;

/// A detected region in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Read-only face detection model
///
/// A skin-probability classifier with a block-merge bounding-box pass. The
/// model is immutable after construction; all classification state lives on
/// the caller's stack.
#[derive(Debug)]
pub struct FaceModel {
    /// Minimum red channel value for a skin pixel
    min_red: u8,
    /// Minimum green channel value for a skin pixel
    min_green: u8,
    /// Minimum blue channel value for a skin pixel
    min_blue: u8,
    /// Minimum spread between the brightest and darkest channel
    min_spread: i16,
    /// Minimum red-over-green dominance
    min_red_green_gap: i16,
    /// Minimum number of skin cells for a region to count as a detection
    min_region_cells: usize,
}

impl FaceModel {
    /// Build the model; done once at registry startup
    pub fn load() -> Result<Arc<Self>> {
        Ok(Arc::new(FaceModel {
            min_red: 95,
            min_green: 40,
            min_blue: 20,
            min_spread: 15,
            min_red_green_gap: 15,
            min_region_cells: 4,
        }))
    }

    /// Classify one BGR pixel as skin or not
    fn is_skin(&self, bgr: [u8; 3]) -> bool {
        let (b, g, r) = (bgr[0] as i16, bgr[1] as i16, bgr[2] as i16);
        let max = b.max(g).max(r);
        let min = b.min(g).min(r);
        r >= self.min_red as i16
            && g >= self.min_green as i16
            && b >= self.min_blue as i16
            && max - min >= self.min_spread
            && r - g >= self.min_red_green_gap
            && r > b
    }

    /// Scan the frame on a coarse grid of `step`-sized cells and merge
    /// connected skin cells into bounding boxes
    pub fn detect(&self, frame: &VideoFrame, step: u32) -> Vec<Detection> {
        let step = step.max(1);
        let grid_w = frame.width.div_ceil(step) as usize;
        let grid_h = frame.height.div_ceil(step) as usize;
        if grid_w == 0 || grid_h == 0 {
            return Vec::new();
        }

        // Sample the center of each cell
        let mut skin = vec![false; grid_w * grid_h];
        for gy in 0..grid_h {
            for gx in 0..grid_w {
                let px = ((gx as u32 * step) + step / 2).min(frame.width - 1);
                let py = ((gy as u32 * step) + step / 2).min(frame.height - 1);
                skin[gy * grid_w + gx] = self.is_skin(frame.pixel(px, py));
            }
        }

        // Connected components over the cell grid, 4-connectivity
        let mut visited = vec![false; grid_w * grid_h];
        let mut detections = Vec::new();
        for start in 0..skin.len() {
            if !skin[start] || visited[start] {
                continue;
            }
            let mut stack = vec![start];
            visited[start] = true;
            let (mut min_x, mut max_x) = (grid_w, 0usize);
            let (mut min_y, mut max_y) = (grid_h, 0usize);
            let mut cells = 0usize;

            while let Some(cell) = stack.pop() {
                let (cx, cy) = (cell % grid_w, cell / grid_w);
                min_x = min_x.min(cx);
                max_x = max_x.max(cx);
                min_y = min_y.min(cy);
                max_y = max_y.max(cy);
                cells += 1;

                let mut push = |nx: usize, ny: usize| {
                    let n = ny * grid_w + nx;
                    if skin[n] && !visited[n] {
                        visited[n] = true;
                        stack.push(n);
                    }
                };
                if cx > 0 {
                    push(cx - 1, cy);
                }
                if cx + 1 < grid_w {
                    push(cx + 1, cy);
                }
                if cy > 0 {
                    push(cx, cy - 1);
                }
                if cy + 1 < grid_h {
                    push(cx, cy + 1);
                }
            }

            if cells >= self.min_region_cells {
                let x = min_x as u32 * step;
                let y = min_y as u32 * step;
                let x2 = ((max_x as u32 + 1) * step).min(frame.width);
                let y2 = ((max_y as u32 + 1) * step).min(frame.height);
                detections.push(Detection {
                    x,
                    y,
                    width: x2 - x,
                    height: y2 - y,
                });
            }
        }
        detections
    }
}

/// Face detection filter drawing a green rectangle around each detection
pub struct FaceDetectFilter {
    model: Arc<FaceModel>,
}

impl FaceDetectFilter {
    /// Create the filter around a registry-owned model
    pub fn with_model(model: Arc<FaceModel>) -> Self {
        FaceDetectFilter { model }
    }
}

/// Draw a rectangle outline of the given thickness, clipped to the frame
fn draw_rect(frame: &mut VideoFrame, det: &Detection) {
    let x2 = (det.x + det.width).min(frame.width);
    let y2 = (det.y + det.height).min(frame.height);
    for y in det.y..y2 {
        for x in det.x..x2 {
            let on_border = x < det.x + BOX_THICKNESS
                || x2 - x <= BOX_THICKNESS
                || y < det.y + BOX_THICKNESS
                || y2 - y <= BOX_THICKNESS;
            if on_border {
                frame.set_pixel(x, y, BOX_COLOR);
            }
        }
    }
}

impl VideoFilter for FaceDetectFilter {
    fn name(&self) -> &'static str {
        "Face Detection"
    }

    fn params(&self) -> &[ParamSpec] {
        PARAMS
    }

    fn apply(&self, frame: &VideoFrame, values: &ParamValues) -> Result<VideoFrame> {
        let scale = value_of(values, "Scale factor")?;
        let step = scale.round().max(1.0) as u32;

        let detections = self.model.detect(frame, step);
        let mut out = frame.clone();
        for det in &detections {
            draw_rect(&mut out, det);
        }
        Ok(out)
    }
}
