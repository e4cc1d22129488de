//! Contrast and luminosity adjustment filter

use super::{value_of, ParamSpec, ParamValues, VideoFilter};
use crate::error::Result;
use crate::frame::VideoFrame;

const PARAMS: &[ParamSpec] = &[
    ParamSpec {
        name: "Contrast",
        min: 1.0,
        max: 3.0,
        default: 1.0,
    },
    ParamSpec {
        name: "Luminosity",
        min: 0.0,
        max: 100.0,
        default: 0.0,
    },
];

/// Simple contrast + luminosity adjustment
///
/// Each byte becomes `clamp(round(contrast * v + luminosity))`.
pub struct LuminosityFilter;

impl LuminosityFilter {
    /// Create a new luminosity filter
    pub fn new() -> Self {
        LuminosityFilter
    }
}

impl Default for LuminosityFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoFilter for LuminosityFilter {
    fn name(&self) -> &'static str {
        "Luminosity"
    }

    fn params(&self) -> &[ParamSpec] {
        PARAMS
    }

    fn apply(&self, frame: &VideoFrame, values: &ParamValues) -> Result<VideoFrame> {
        let contrast = value_of(values, "Contrast")?;
        let luminosity = value_of(values, "Luminosity")?;

        let mut out = frame.clone();
        for v in out.data.iter_mut() {
            *v = (contrast * *v as f64 + luminosity).round().clamp(0.0, 255.0) as u8;
        }
        Ok(out)
    }
}
