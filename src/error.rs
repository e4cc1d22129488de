//! Error types for VFU

use thiserror::Error;

/// Result type alias for VFU operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for VFU
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Container format error
    #[error("Format error: {0}")]
    Format(String),

    /// Filter execution error
    #[error("Filter error: {0}")]
    Filter(String),

    /// Filter registry error
    #[error("Registry error: {0}")]
    Registry(String),

    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Unsupported feature
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// End of stream
    #[error("End of stream")]
    EndOfStream,

    /// A chain entry handle that no longer exists
    #[error("Chain entry not found")]
    HandleNotFound,

    /// A parameter name unknown to the targeted filter entry
    #[error("Unknown parameter: {0}")]
    UnknownParam(String),

    /// A save job is already running
    #[error("A save job is already in progress")]
    SaveInProgress,
}

impl Error {
    /// Create a format error
    pub fn format<S: Into<String>>(msg: S) -> Self {
        Error::Format(msg.into())
    }

    /// Create a filter error
    pub fn filter<S: Into<String>>(msg: S) -> Self {
        Error::Filter(msg.into())
    }

    /// Create a registry error
    pub fn registry<S: Into<String>>(msg: S) -> Self {
        Error::Registry(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create an invalid state error
    pub fn invalid_state<S: Into<String>>(msg: S) -> Self {
        Error::InvalidState(msg.into())
    }

    /// Create an unsupported error
    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        Error::Unsupported(msg.into())
    }
}
