//! Video filtering - the filter contract and the built-in filters
//!
//! Every filter is a pure per-frame transform: given a frame and a complete
//! mapping of parameter name to current value, it returns a new filtered
//! frame. Filters hold no per-call state; the only allowed shared state is a
//! heavyweight read-only resource initialized once and shared via `Arc`
//! (see `facedetect`), which must be safe under concurrent invocation.

pub mod blur;
pub mod canny;
pub mod facedetect;
pub mod grayscale;
pub mod luminosity;
pub mod sharpen;

pub use blur::BlurFilter;
pub use canny::CannyFilter;
pub use facedetect::{FaceDetectFilter, FaceModel};
pub use grayscale::GrayscaleFilter;
pub use luminosity::LuminosityFilter;
pub use sharpen::SharpenFilter;

use crate::error::{Error, Result};
use crate::frame::VideoFrame;
use std::collections::HashMap;

/// Current parameter values for one active filter, keyed by parameter name
pub type ParamValues = HashMap<String, f64>;

/// Schema for one tunable filter parameter
///
/// Invariant: `min <= default <= max`. The registry rejects filters whose
/// specs violate this at registration time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    /// Parameter name, unique within its filter
    pub name: &'static str,
    /// Minimum value
    pub min: f64,
    /// Maximum value
    pub max: f64,
    /// Default value, used to seed a newly added filter entry
    pub default: f64,
}

/// The filter contract
///
/// `name()` is the stable registry key and must be unique across all
/// registered filters. `apply()` must be safe to call repeatedly with
/// different values and from multiple threads at once.
pub trait VideoFilter: Send + Sync {
    /// Stable display name, used as the registry key
    fn name(&self) -> &'static str;

    /// Parameter schema; empty means no tunable parameters
    fn params(&self) -> &[ParamSpec] {
        &[]
    }

    /// Apply this filter to a frame with the given parameter values
    fn apply(&self, frame: &VideoFrame, values: &ParamValues) -> Result<VideoFrame>;
}

/// Seed a parameter value map from a filter's defaults
pub fn default_values(filter: &dyn VideoFilter) -> ParamValues {
    filter
        .params()
        .iter()
        .map(|spec| (spec.name.to_string(), spec.default))
        .collect()
}

/// Look up one parameter value, failing if the mapping is incomplete
pub fn value_of(values: &ParamValues, name: &str) -> Result<f64> {
    values
        .get(name)
        .copied()
        .ok_or_else(|| Error::UnknownParam(name.to_string()))
}

/// Scale factor between real parameter values and integer slider units
///
/// Integer-only UI controls represent a parameter as
/// `round(value * SLIDER_FACTOR)`; the round trip is exact to within
/// `1 / SLIDER_FACTOR`.
pub const SLIDER_FACTOR: f64 = 100_000.0;

/// Convert a real parameter value to integer slider units
pub fn to_slider(value: f64) -> i64 {
    (value * SLIDER_FACTOR).round() as i64
}

/// Convert integer slider units back to a real parameter value
pub fn from_slider(units: i64) -> f64 {
    units as f64 / SLIDER_FACTOR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values_seeded_from_specs() {
        let blur = BlurFilter::new();
        let values = default_values(&blur);
        assert_eq!(values.len(), 2);
        assert_eq!(values["Horizontal"], 10.0);
        assert_eq!(values["Vertical"], 10.0);
    }

    #[test]
    fn test_default_values_empty_for_parameterless_filter() {
        let gray = GrayscaleFilter::new();
        assert!(default_values(&gray).is_empty());
    }

    #[test]
    fn test_value_of_missing_key() {
        let values = ParamValues::new();
        assert!(matches!(
            value_of(&values, "Horizontal"),
            Err(Error::UnknownParam(_))
        ));
    }

    #[test]
    fn test_slider_round_trip() {
        for v in [0.0, 1.0, 2.5, 99.99999, 1000.0, 0.00001] {
            let back = from_slider(to_slider(v));
            assert!((back - v).abs() <= 1.0 / SLIDER_FACTOR, "{} -> {}", v, back);
        }
    }

    #[test]
    fn test_slider_factor_matches_documented_value() {
        assert_eq!(to_slider(1.0), 100_000);
    }
}
