//! Storage errors.

use thiserror::Error;

/// Storage tier error types.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The tier is not present in this runtime.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// The stored record could not be decoded.
    #[error("Corrupt storage record: {0}")]
    Corrupt(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
