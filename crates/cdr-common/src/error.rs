//! Error types shared across the workspace

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for shared operations
pub type Result<T> = std::result::Result<T, CommonError>;

/// Errors raised before any extract file is touched
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("Failed to read configuration file '{path}': {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CommonError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
