//! Optimizer errors

use thiserror::Error;

/// Why a deferred batch produced no modules
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("module loader {index} failed: {message}")]
    Failed { index: usize, message: String },

    #[error("deferred load was disposed before it completed")]
    Disposed,

    #[error("deferred modules were already taken")]
    Consumed,
}

/// Cache backend failure.
///
/// [`ResourceCache::open`](crate::ResourceCache::open) returns it when the
/// database cannot be opened. Cache reads and writes never return it; their
/// failures only reach the diagnostic callback.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache storage unavailable: {0}")]
    Unavailable(String),

    #[error("cache database error: {0}")]
    Database(#[from] redb::Error),

    #[error("corrupt cache entry: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("cache task failed: {0}")]
    Task(String),
}
