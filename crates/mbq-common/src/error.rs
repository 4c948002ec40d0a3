//! Error types for MBQ

use thiserror::Error;

/// Result type alias for MBQ operations
pub type Result<T> = std::result::Result<T, MbqError>;

/// Main error type for MBQ
#[derive(Error, Debug)]
pub enum MbqError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}. Check your environment variables or command-line flags.")]
    Config(String),

    #[error("Mapping file error: {0}")]
    MappingFile(String),
}

impl MbqError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a mapping file error
    pub fn mapping_file(msg: impl Into<String>) -> Self {
        Self::MappingFile(msg.into())
    }
}
