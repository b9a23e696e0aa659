//! Error types for appframe-publish-core

use crate::contract::BackendError;

pub type Result<T> = std::result::Result<T, PublishError>;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{what} not found in host '{hostname}'")]
    NotFound { what: String, hostname: String },

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Stylesheet block '{source_name}' is corrupt: {reason}")]
    DataCorruption { source_name: String, reason: String },

    #[error("Login to '{domain}' failed")]
    Authentication { domain: String },

    #[error("Failed to load '{path}': {error}")]
    Load {
        path: String,
        #[source]
        error: BackendError,
    },
}

impl PublishError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}
