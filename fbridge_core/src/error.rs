//! Error types shared by every fbridge crate

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for fbridge
#[derive(Debug, Error)]
pub enum BridgeError {
    /// I/O errors (file, stdin, output directory)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be read or failed validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// Topic registry errors
    #[error("Communication error: {0}")]
    Communication(String),

    /// Sprite or font asset could not be loaded or decoded
    #[error("Failed to load asset '{}': {reason}", path.display())]
    AssetLoad { path: PathBuf, reason: String },

    /// Surface compositing or PNG serialization failed
    #[error("Frame encoding failed: {0}")]
    Encode(String),

    /// Malformed inbound data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A node refused to start
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Shorthand for configuration errors
    pub fn config(msg: impl Into<String>) -> Self {
        BridgeError::Config(msg.into())
    }

    /// Shorthand for asset load failures
    pub fn asset(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        BridgeError::AssetLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::InvalidInput(err.to_string())
    }
}

impl From<serde_yaml::Error> for BridgeError {
    fn from(err: serde_yaml::Error) -> Self {
        BridgeError::Config(format!("YAML: {}", err))
    }
}

impl From<toml::de::Error> for BridgeError {
    fn from(err: toml::de::Error) -> Self {
        BridgeError::Config(format!("TOML: {}", err))
    }
}

/// Convenience result alias
pub type BridgeResult<T> = Result<T, BridgeError>;
