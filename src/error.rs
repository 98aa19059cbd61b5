//! Error types for the defect ledger
//!
//! The pipeline itself (tokenize → classify → ingest → aggregate) is total and
//! never returns these. They cover the edges: reading files and configuration.

use thiserror::Error;

/// Result alias for fallible ledger operations
pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

#[derive(Error, Debug)]
pub enum LedgerError {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML configuration could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration parsed but holds an unusable value
    #[error("Invalid config (key: {key}): {message}")]
    InvalidConfig { key: String, message: String },

    /// Record snapshot could not be (de)serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LedgerError {
    pub fn invalid_config(key: &str, message: impl Into<String>) -> Self {
        LedgerError::InvalidConfig {
            key: key.to_string(),
            message: message.into(),
        }
    }
}
