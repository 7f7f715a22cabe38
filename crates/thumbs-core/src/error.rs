//! Error types for the thumbs image cache.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Request errors
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Action not allowed: {0}")]
    DisallowedAction(String),

    #[error("Unsafe source path: {0}")]
    UnsafePath(String),

    #[error("Source not found: {0}")]
    SourceMissing(String),

    // Render errors
    #[error("Transformation failed: {0}")]
    TransformationFailure(String),

    #[error("Render timeout after {millis} ms")]
    RenderTimeout { millis: u64 },

    #[error("Invalid action registry: {0}")]
    InvalidRegistry(String),

    // Backend errors
    #[error("Storage write failed: {0}")]
    StorageWrite(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Metadata cache unavailable: {0}")]
    MetadataUnavailable(String),

    // Infrastructure errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Errors that must be reported to clients as a plain "not found".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::InvalidGeometry(_)
                | Error::DisallowedAction(_)
                | Error::UnsafePath(_)
                | Error::SourceMissing(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Config(err.to_string())
    }
}
