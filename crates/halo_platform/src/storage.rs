//! Persistent preference storage
//!
//! A synchronous key -> string mapping. Writes are last-write-wins and are
//! readable by the very next `get`. A write either lands completely or not at
//! all.

use crate::error::{PlatformError, Result};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Durable key/value storage shared by the runtime subsystems
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: PreferenceStore + ?Sized> PreferenceStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// Prefixes every key with `namespace.` so unrelated consumers of the same
/// storage medium never collide
pub struct NamespacedStore<S> {
    inner: S,
    namespace: String,
}

impl<S: PreferenceStore> NamespacedStore<S> {
    pub fn new(inner: S, namespace: impl Into<String>) -> Self {
        Self {
            inner,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The key as written to the underlying medium
    pub fn full_key(&self, key: &str) -> String {
        if self.namespace.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.namespace, key)
        }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: PreferenceStore> PreferenceStore for NamespacedStore<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(&self.full_key(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.inner.set(&self.full_key(key), value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.inner.remove(&self.full_key(key))
    }
}

/// Bytes an entry map occupies, counted the way web storage counts quota
fn footprint(entries: &BTreeMap<String, String>) -> usize {
    entries.iter().map(|(k, v)| k.len() + v.len()).sum()
}

fn check_quota(entries: &BTreeMap<String, String>, quota: Option<usize>) -> Result<()> {
    let Some(quota) = quota else {
        return Ok(());
    };
    let needed = footprint(entries);
    if needed > quota {
        return Err(PlatformError::QuotaExceeded { needed, quota });
    }
    Ok(())
}

/// Session-only store.
///
/// Can be switched unavailable and given a quota to exercise the failure
/// paths of its callers.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
    unavailable: AtomicBool,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects writes growing it past `quota` bytes
    pub fn with_quota(quota: usize) -> Self {
        Self {
            quota: Some(quota),
            ..Self::default()
        }
    }

    /// Simulate storage being disabled (every operation fails)
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn ensure_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(PlatformError::StorageUnavailable(
                "memory store disabled".to_string(),
            ));
        }
        Ok(())
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.ensure_available()?;
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.ensure_available()?;
        let mut entries = self.entries.write();
        let mut next = entries.clone();
        next.insert(key.to_string(), value.to_string());
        check_quota(&next, self.quota)?;
        *entries = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.ensure_available()?;
        self.entries.write().remove(key);
        Ok(())
    }
}

/// Durable store backed by a JSON object on disk.
///
/// Every write goes to a temporary sibling file which is then renamed over
/// the original, so readers see either the old or the new contents.
pub struct FileStore {
    path: Option<PathBuf>,
    entries: RwLock<BTreeMap<String, String>>,
    quota: Option<usize>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`.
    ///
    /// A missing file is an empty store. An unreadable or corrupt file is
    /// logged and treated as empty; the next write replaces it.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(entries) => entries,
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "ignoring corrupt preference file");
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "preference file unreadable");
                BTreeMap::new()
            }
        };

        Self {
            path: Some(path),
            entries: RwLock::new(entries),
            quota: None,
        }
    }

    /// A store whose medium is switched off: every operation fails
    pub fn disabled() -> Self {
        Self {
            path: None,
            entries: RwLock::new(BTreeMap::new()),
            quota: None,
        }
    }

    pub fn with_quota(mut self, quota: usize) -> Self {
        self.quota = Some(quota);
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn require_path(&self) -> Result<&Path> {
        self.path
            .as_deref()
            .ok_or_else(|| PlatformError::StorageUnavailable("storage disabled".to_string()))
    }

    fn persist(&self, path: &Path, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp = path.with_file_name(tmp_name);

        let bytes = serde_json::to_vec_pretty(entries)?;
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Applies `edit` to a copy of the entries and persists it.
    ///
    /// The write lock is held from the copy through the swap, so concurrent
    /// writers are serialised and share the temporary file safely. Returns
    /// without touching disk when `edit` reports no change.
    fn update(&self, edit: impl FnOnce(&mut BTreeMap<String, String>) -> bool) -> Result<()> {
        let path = self.require_path()?;
        let mut entries = self.entries.write();
        let mut next = entries.clone();
        if !edit(&mut next) {
            return Ok(());
        }
        check_quota(&next, self.quota)?;
        self.persist(path, &next)?;
        *entries = next;
        Ok(())
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.require_path()?;
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|next| {
            next.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.update(|next| next.remove(key).is_some())
    }
}
