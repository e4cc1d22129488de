//! VFU - A video filtering pipeline library written in Rust
//!
//! VFU lets a caller compose an ordered chain of per-frame image filters,
//! tune each filter's parameters live, and apply the chain to every frame of
//! a video - either frame by frame for preview or as a background job that
//! writes a fully filtered copy to disk.
//!
//! # Architecture
//!
//! VFU is organized into several key modules:
//!
//! - `filter`: The filter contract and the built-in filter implementations
//! - `registry`: Startup-time discovery of all available filters
//! - `chain`: The ordered, shared, mutable sequence of active filters
//! - `pipeline`: Application of a chain snapshot to a single frame
//! - `save`: Background job streaming a whole video through a fixed snapshot
//! - `io`: Frame source/sink traits and a simple raw video container
//! - `frame`: Uncompressed frame representation

pub mod chain;
pub mod error;
pub mod filter;
pub mod frame;
pub mod io;
pub mod pipeline;
pub mod registry;
pub mod save;

pub use chain::{ActiveFilterChain, ChainSnapshot, EntryHandle};
pub use error::{Error, Result};
pub use frame::VideoFrame;
pub use pipeline::apply_chain;

/// VFU version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const VERSION_MAJOR: u32 = 0;
pub const VERSION_MINOR: u32 = 1;
pub const VERSION_PATCH: u32 = 0;

/// Configuration for the VFU library
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of threads to use for parallel processing
    pub max_threads: Option<usize>,
    /// Enable verbose logging
    pub verbose: bool,
    /// Enable debug output
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_threads: None,
            verbose: false,
            debug: false,
        }
    }
}

/// Initialize the VFU library with the given configuration
pub fn init(config: Config) -> Result<()> {
    // Initialize thread pool if max_threads is specified
    if let Some(threads) = config.max_threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .map_err(|e| Error::Init(format!("Failed to initialize thread pool: {}", e)))?;
    }

    // Initialize logging
    if config.verbose || config.debug {
        let level = if config.debug { "debug" } else { "info" };
        tracing_subscriber::fmt().with_env_filter(level).init();
    }

    Ok(())
}
