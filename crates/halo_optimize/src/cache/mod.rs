//! Durable resource cache
//!
//! A write-through key/value cache keyed by resource URL. It is an
//! optimization only: writes that fail are dropped, reads that fail are
//! misses, and neither ever surfaces as an error to the caller. Failures are
//! logged and handed to an optional diagnostic callback.

mod durable;
mod memory;

pub use durable::RedbBackend;
pub use memory::MemoryBackend;

use crate::error::CacheError;
use async_trait::async_trait;
use halo_platform::{DisposeFlag, Disposable};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Cached resource body
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum Payload {
    Text(String),
    Bytes(Vec<u8>),
}

impl Payload {
    pub fn len(&self) -> usize {
        match self {
            Payload::Text(text) => text.len(),
            Payload::Bytes(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Bytes(bytes)
    }
}

/// One cached resource as stored by a backend
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCacheEntry {
    pub key: String,
    pub payload: Payload,
    /// Unix time in milliseconds
    #[serde(rename = "storedAt")]
    pub stored_at: u64,
}

impl ResourceCacheEntry {
    pub fn new(key: impl Into<String>, payload: Payload) -> Self {
        let stored_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or_default();
        Self {
            key: key.into(),
            payload,
            stored_at,
        }
    }
}

/// Storage behind a [`ResourceCache`]
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Insert or replace the entry for `entry.key`
    async fn put(&self, entry: ResourceCacheEntry) -> Result<(), CacheError>;

    async fn get(&self, key: &str) -> Result<Option<ResourceCacheEntry>, CacheError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheOperation {
    Write,
    Read,
}

/// A cache failure that was absorbed
#[derive(Debug)]
pub struct CacheDiagnostic {
    pub operation: CacheOperation,
    pub key: String,
    pub error: CacheError,
}

type DiagnosticCallback = Arc<dyn Fn(&CacheDiagnostic) + Send + Sync>;

pub struct ResourceCache {
    backend: Arc<dyn CacheBackend>,
    on_diagnostic: RwLock<Option<DiagnosticCallback>>,
    disposed: DisposeFlag,
}

impl ResourceCache {
    pub fn new(backend: impl CacheBackend + 'static) -> Self {
        Self::with_backend(Arc::new(backend))
    }

    pub fn with_backend(backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            backend,
            on_diagnostic: RwLock::new(None),
            disposed: DisposeFlag::new(),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// Open a redb-backed cache at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        Ok(Self::new(RedbBackend::open(path)?))
    }

    /// Open a redb-backed cache, falling back to memory if that fails
    pub fn open_or_memory(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::open(path).unwrap_or_else(|err| {
            tracing::warn!(path = %path.display(), %err, "resource cache unavailable, using memory");
            Self::in_memory()
        })
    }

    pub fn with_diagnostics<F>(self, callback: F) -> Self
    where
        F: Fn(&CacheDiagnostic) + Send + Sync + 'static,
    {
        self.set_diagnostic_callback(callback);
        self
    }

    pub fn set_diagnostic_callback<F>(&self, callback: F)
    where
        F: Fn(&CacheDiagnostic) + Send + Sync + 'static,
    {
        *self.on_diagnostic.write() = Some(Arc::new(callback));
    }

    /// Store `payload` under `key`. Failures are absorbed.
    pub async fn cache_resource(&self, key: &str, payload: impl Into<Payload>) {
        if self.disposed.is_set() {
            return;
        }
        let entry = ResourceCacheEntry::new(key, payload.into());
        if let Err(error) = self.backend.put(entry).await {
            self.report(CacheOperation::Write, key, error);
        }
    }

    /// Cached payload for `key`; `None` on a miss or any failure
    pub async fn read_cached_resource(&self, key: &str) -> Option<Payload> {
        if self.disposed.is_set() {
            return None;
        }
        match self.backend.get(key).await {
            Ok(entry) => entry.map(|entry| entry.payload),
            Err(error) => {
                self.report(CacheOperation::Read, key, error);
                None
            }
        }
    }

    fn report(&self, operation: CacheOperation, key: &str, error: CacheError) {
        tracing::debug!(key, ?operation, %error, "resource cache bypassed");
        if self.disposed.is_set() {
            return;
        }

        let callback = self.on_diagnostic.read().clone();
        if let Some(callback) = callback {
            callback(&CacheDiagnostic {
                operation,
                key: key.to_string(),
                error,
            });
        }
    }
}

impl Disposable for ResourceCache {
    fn dispose(&self) {
        if self.disposed.trip() {
            self.on_diagnostic.write().take();
        }
    }

    fn is_disposed(&self) -> bool {
        self.disposed.is_set()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[tokio::test]
    async fn test_write_then_read() {
        let cache = ResourceCache::in_memory();
        cache.cache_resource("r1", "payload").await;

        assert_eq!(
            cache.read_cached_resource("r1").await,
            Some(Payload::Text("payload".into()))
        );
        assert_eq!(cache.read_cached_resource("r2").await, None);
    }

    #[tokio::test]
    async fn test_failures_reach_diagnostics_only() {
        let backend = Arc::new(MemoryBackend::new());
        backend.set_available(false);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let cache = ResourceCache::with_backend(backend.clone()).with_diagnostics(move |d| {
            sink.lock().push((d.operation, d.key.clone()));
        });

        cache.cache_resource("r1", vec![1, 2, 3]).await;
        assert_eq!(cache.read_cached_resource("r1").await, None);
        assert_eq!(
            *seen.lock(),
            vec![
                (CacheOperation::Write, "r1".to_string()),
                (CacheOperation::Read, "r1".to_string()),
            ]
        );

        backend.set_available(true);
        cache.cache_resource("r1", vec![1, 2, 3]).await;
        assert_eq!(
            cache.read_cached_resource("r1").await,
            Some(Payload::Bytes(vec![1, 2, 3]))
        );
        assert_eq!(seen.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_disposed_cache_is_inert() {
        let backend = Arc::new(MemoryBackend::new());
        let cache = ResourceCache::with_backend(backend.clone());
        cache.cache_resource("r1", "kept").await;

        cache.dispose();
        cache.dispose();
        cache.cache_resource("r2", "dropped").await;

        assert_eq!(cache.read_cached_resource("r1").await, None);
        assert_eq!(backend.len(), 1);
    }

    #[test]
    fn test_entry_wire_format() {
        let entry = ResourceCacheEntry {
            key: "/api/me".into(),
            payload: Payload::Text("{}".into()),
            stored_at: 1_700_000_000_000,
        };
        assert_eq!(
            serde_json::to_string(&entry).unwrap(),
            r#"{"key":"/api/me","payload":{"kind":"text","data":"{}"},"storedAt":1700000000000}"#
        );
    }
}
