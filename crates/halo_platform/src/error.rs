//! Platform error types

use thiserror::Error;

/// Host surface errors
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Storage is disabled or cannot be reached
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A write would exceed the storage quota
    #[error("Storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },

    /// Backing file could not be read or written
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Backing file could not be encoded
    #[error("Storage encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Selector syntax not understood by the document surface
    #[error("Invalid selector: {0:?}")]
    InvalidSelector(String),
}

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;
