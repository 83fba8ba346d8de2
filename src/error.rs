use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for version-bump operations
#[derive(Error, Debug)]
pub enum BumpError {
    #[error("Key not found: {key}")]
    NotFound { key: String },

    #[error("Ambiguous match for '{key}': {reason}")]
    AmbiguousMatch { key: String, reason: String },

    #[error("Malformed version: '{0}'")]
    MalformedVersion(String),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Release data error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in version-bump
pub type Result<T> = std::result::Result<T, BumpError>;

impl BumpError {
    /// Create a not-found error for a key or block
    pub fn not_found(key: impl Into<String>) -> Self {
        BumpError::NotFound { key: key.into() }
    }

    /// Create an ambiguity error with the reason the match could not be resolved
    pub fn ambiguous(key: impl Into<String>, reason: impl Into<String>) -> Self {
        BumpError::AmbiguousMatch {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a malformed version error
    pub fn malformed(raw: impl Into<String>) -> Self {
        BumpError::MalformedVersion(raw.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        BumpError::Config(msg.into())
    }

    /// True when the caller may skip the operation instead of aborting
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            BumpError::NotFound { .. } | BumpError::FileNotFound(_) | BumpError::MalformedVersion(_)
        )
    }
}
