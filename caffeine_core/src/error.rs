//! Error types for the caffeine_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for caffeine_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration or environment selection error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Level record could not be read back
    #[error("State error: {0}")]
    State(String),

    /// Wall-clock time argument was not HH:MM
    #[error("Invalid walltime: {0}")]
    Walltime(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
