//! Filter registry
//!
//! All available filters are enumerated once at startup from an explicit
//! registration table. A filter whose constructor fails (or whose parameter
//! schema is malformed) is reported and skipped so that one bad filter never
//! prevents the rest from loading. The registry is read-only after startup.

use crate::error::Result;
use crate::filter::{
    BlurFilter, CannyFilter, FaceDetectFilter, FaceModel, GrayscaleFilter, LuminosityFilter,
    SharpenFilter, VideoFilter,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// A filter constructor in the registration table
pub type FilterCtor = fn() -> Result<Arc<dyn VideoFilter>>;

/// Registry of all loaded filters, sorted alphabetically by name
pub struct FilterRegistry {
    filters: Vec<Arc<dyn VideoFilter>>,
}

impl FilterRegistry {
    /// Build a registry from a registration table
    ///
    /// Constructors run in table order. A failing constructor or an invalid
    /// parameter schema is logged and skipped. Duplicate names are a
    /// configuration error: the first registration wins and later ones are
    /// skipped, deterministically, since the table order is fixed.
    pub fn from_table(table: &[FilterCtor]) -> Self {
        let mut filters: Vec<Arc<dyn VideoFilter>> = Vec::new();

        for ctor in table {
            let filter = match ctor() {
                Ok(f) => f,
                Err(e) => {
                    warn!("Skipping filter that failed to load: {}", e);
                    continue;
                }
            };
            if let Err(e) = validate_params(filter.as_ref()) {
                warn!("Skipping filter '{}': {}", filter.name(), e);
                continue;
            }
            if filters.iter().any(|f| f.name() == filter.name()) {
                warn!(
                    "Skipping duplicate filter registration for '{}'",
                    filter.name()
                );
                continue;
            }
            debug!("Registered filter '{}'", filter.name());
            filters.push(filter);
        }

        filters.sort_by(|a, b| a.name().cmp(b.name()));
        FilterRegistry { filters }
    }

    /// Build the registry with all built-in filters
    pub fn with_builtins() -> Self {
        Self::from_table(BUILTIN_FILTERS)
    }

    /// Look up a filter by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn VideoFilter>> {
        self.filters
            .iter()
            .find(|f| f.name() == name)
            .map(Arc::clone)
    }

    /// All loaded filters in alphabetical order
    pub fn filters(&self) -> &[Arc<dyn VideoFilter>] {
        &self.filters
    }

    /// All filter names in alphabetical order
    pub fn names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Number of loaded filters
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Check whether no filters loaded
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

/// Check the `min <= default <= max` invariant of every parameter spec
fn validate_params(filter: &dyn VideoFilter) -> Result<()> {
    for spec in filter.params() {
        if !(spec.min <= spec.default && spec.default <= spec.max) {
            return Err(crate::Error::registry(format!(
                "parameter '{}' has invalid bounds: min {} default {} max {}",
                spec.name, spec.min, spec.default, spec.max
            )));
        }
    }
    Ok(())
}

/// The built-in registration table
///
/// The face detection model is built once here and shared read-only with the
/// filter; a model load failure skips only that filter.
pub const BUILTIN_FILTERS: &[FilterCtor] = &[
    || Ok(Arc::new(BlurFilter::new())),
    || Ok(Arc::new(CannyFilter::new())),
    || Ok(Arc::new(FaceDetectFilter::with_model(FaceModel::load()?))),
    || Ok(Arc::new(GrayscaleFilter::new())),
    || Ok(Arc::new(LuminosityFilter::new())),
    || Ok(Arc::new(SharpenFilter::new())),
];
