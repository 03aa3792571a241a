use super::{CacheBackend, ResourceCacheEntry};
use crate::error::CacheError;
use async_trait::async_trait;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Volatile backend, also used when the durable store cannot be opened
pub struct MemoryBackend {
    entries: Mutex<FxHashMap<String, ResourceCacheEntry>>,
    available: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(FxHashMap::default()),
            available: AtomicBool::new(true),
        }
    }

    /// Make every operation fail with [`CacheError::Unavailable`]
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn check_available(&self) -> Result<(), CacheError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CacheError::Unavailable("memory backend disabled".into()))
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn put(&self, entry: ResourceCacheEntry) -> Result<(), CacheError> {
        self.check_available()?;
        self.entries.lock().insert(entry.key.clone(), entry);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<ResourceCacheEntry>, CacheError> {
        self.check_available()?;
        Ok(self.entries.lock().get(key).cloned())
    }
}
