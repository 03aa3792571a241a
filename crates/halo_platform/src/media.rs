//! OS color-scheme preference signal
//!
//! Mirrors a `(prefers-color-scheme: dark)` media query: a readable boolean
//! plus change notifications. The runtime listens to it and never writes it.

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Listener invoked with the new "prefers dark" value
pub type SchemeListener = Box<dyn Fn(bool) + Send + Sync>;

/// Subscribable "prefers dark" signal
pub trait ColorSchemeQuery: Send + Sync {
    /// Current preference, `None` when the platform does not report one
    fn prefers_dark(&self) -> Option<bool>;

    fn subscribe(&self, listener: SchemeListener) -> Subscription;
}

/// Handle to a registered listener.
///
/// Released by [`Subscription::unsubscribe`] or on drop, whichever comes first.
pub struct Subscription {
    release: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Mutex::new(Some(Box::new(release))),
        }
    }

    /// A subscription with nothing to release
    pub fn detached() -> Self {
        Self {
            release: Mutex::new(None),
        }
    }

    pub fn unsubscribe(&self) {
        let release = self.release.lock().take();
        if let Some(release) = release {
            release();
        }
    }

    pub fn is_active(&self) -> bool {
        self.release.lock().is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

struct MediaQueryInner {
    prefers_dark: RwLock<Option<bool>>,
    listeners: Mutex<FxHashMap<u64, Arc<dyn Fn(bool) + Send + Sync>>>,
    next_id: AtomicU64,
}

/// In-memory color-scheme signal.
///
/// Clones share state, so a host (or a test) can keep one clone to drive
/// changes while the runtime holds another.
#[derive(Clone)]
pub struct MediaQuery {
    inner: Arc<MediaQueryInner>,
}

impl MediaQuery {
    pub fn new(prefers_dark: Option<bool>) -> Self {
        Self {
            inner: Arc::new(MediaQueryInner {
                prefers_dark: RwLock::new(prefers_dark),
                listeners: Mutex::new(FxHashMap::default()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Update the preference and notify listeners if it changed
    pub fn set_prefers_dark(&self, prefers_dark: bool) {
        {
            let mut current = self.inner.prefers_dark.write();
            if *current == Some(prefers_dark) {
                return;
            }
            *current = Some(prefers_dark);
        }

        tracing::debug!(prefers_dark, "color scheme preference changed");

        let listeners: Vec<_> = self.inner.listeners.lock().values().cloned().collect();
        for listener in listeners {
            listener(prefers_dark);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }
}

impl Default for MediaQuery {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ColorSchemeQuery for MediaQuery {
    fn prefers_dark(&self) -> Option<bool> {
        *self.inner.prefers_dark.read()
    }

    fn subscribe(&self, listener: SchemeListener) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        self.inner
            .listeners
            .lock()
            .insert(id, Arc::from(listener));

        let weak: Weak<MediaQueryInner> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.listeners.lock().remove(&id);
            }
        })
    }
}
