//! Theme engine
//!
//! [`ThemeEngine`] is the single gate through which the active theme changes.
//! Applying a theme is one synchronous sequence: persist the preference, then
//! hand the document one [`RootPatch`](halo_platform::RootPatch) that swaps the
//! mode markers and rewrites every style variable. Nothing can observe the
//! document between those steps.
//!
//! The engine also follows the OS color-scheme preference, but only while the
//! user has not chosen a theme explicitly.

use crate::error::ThemeError;
use crate::prepaint::{self, SWITCHING_CLASS};
use crate::theme::{ThemeBundle, ThemeMode};
use crate::variables::StyleVariableSet;
use halo_platform::{
    ColorSchemeQuery, DisposeFlag, Disposable, DocumentSurface, PreferenceStore, RootPatch,
    Subscription,
};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, Weak};

/// Preference key holding `"light"` or `"dark"`
pub const THEME_KEY: &str = "app_theme";

/// Process-wide engine instance
static THEME_ENGINE: OnceLock<ThemeEngine> = OnceLock::new();

type ChangeCallback = Arc<dyn Fn(ThemeMode) + Send + Sync>;

/// Engine tuning
#[derive(Clone, Debug)]
pub struct ThemeOptions {
    /// Mode used when neither storage nor the OS report a preference
    pub fallback: ThemeMode,
    /// Add the `theme-switching` class for one frame on every switch
    pub suppress_transitions: bool,
}

impl Default for ThemeOptions {
    fn default() -> Self {
        Self {
            fallback: ThemeMode::Dark,
            suppress_transitions: true,
        }
    }
}

#[derive(Default)]
struct EngineState {
    /// Active mode, resolved on first read
    current: Option<ThemeMode>,
    /// Mode currently painted on the document
    applied: Option<ThemeMode>,
    /// A persistence failure has already been logged at warn level
    persist_warned: bool,
}

struct EngineInner {
    store: Arc<dyn PreferenceStore>,
    surface: Arc<dyn DocumentSurface>,
    query: Arc<dyn ColorSchemeQuery>,
    bundle: ThemeBundle,
    options: ThemeOptions,
    state: Mutex<EngineState>,
    system: Mutex<Option<Subscription>>,
    on_change: RwLock<Option<ChangeCallback>>,
    release_pending: Arc<AtomicBool>,
    disposed: DisposeFlag,
}

/// Owner of the active [`ThemeMode`]
pub struct ThemeEngine {
    inner: Arc<EngineInner>,
}

impl ThemeEngine {
    /// Create an engine without touching the document.
    ///
    /// The active mode is resolved lazily on first read; nothing is painted
    /// until the first `set_theme`.
    pub fn new(
        store: Arc<dyn PreferenceStore>,
        surface: Arc<dyn DocumentSurface>,
        query: Arc<dyn ColorSchemeQuery>,
    ) -> Self {
        Self::with_options(store, surface, query, ThemeBundle::default(), ThemeOptions::default())
    }

    pub fn with_options(
        store: Arc<dyn PreferenceStore>,
        surface: Arc<dyn DocumentSurface>,
        query: Arc<dyn ColorSchemeQuery>,
        bundle: ThemeBundle,
        options: ThemeOptions,
    ) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                store,
                surface,
                query,
                bundle,
                options,
                state: Mutex::new(EngineState::default()),
                system: Mutex::new(None),
                on_change: RwLock::new(None),
                release_pending: Arc::new(AtomicBool::new(false)),
                disposed: DisposeFlag::new(),
            }),
        }
    }

    /// Run the flash guard, then create an engine that follows the OS
    /// preference. Call before the view tree is built.
    pub fn mount(
        store: Arc<dyn PreferenceStore>,
        surface: Arc<dyn DocumentSurface>,
        query: Arc<dyn ColorSchemeQuery>,
    ) -> Self {
        Self::mount_with(store, surface, query, ThemeBundle::default(), ThemeOptions::default())
    }

    pub fn mount_with(
        store: Arc<dyn PreferenceStore>,
        surface: Arc<dyn DocumentSurface>,
        query: Arc<dyn ColorSchemeQuery>,
        bundle: ThemeBundle,
        options: ThemeOptions,
    ) -> Self {
        let mode = prepaint::apply_initial_theme_with(
            store.as_ref(),
            query.as_ref(),
            surface.as_ref(),
            &bundle,
            options.fallback,
        );

        let engine = Self::with_options(store, surface, query, bundle, options);
        {
            let mut state = engine.inner.state.lock();
            state.current = Some(mode);
            state.applied = Some(mode);
        }
        engine.watch_system_preference();
        engine
    }

    /// Install `engine` as the process-wide instance.
    ///
    /// The first install wins and returns `true`; later engines are dropped
    /// (and their listeners released).
    pub fn install(engine: ThemeEngine) -> bool {
        match THEME_ENGINE.set(engine) {
            Ok(()) => true,
            Err(rejected) => {
                tracing::warn!("ThemeEngine already installed; ignoring new instance");
                rejected.dispose();
                false
            }
        }
    }

    /// The process-wide engine, if one was installed
    pub fn try_get() -> Option<&'static ThemeEngine> {
        THEME_ENGINE.get()
    }

    // ========== Reading ==========

    /// The theme in effect. Never blocks on I/O beyond the first resolution.
    pub fn current_theme(&self) -> ThemeMode {
        let mut state = self.inner.state.lock();
        *state.current.get_or_insert_with(|| {
            prepaint::resolve_initial_mode(
                self.inner.store.as_ref(),
                self.inner.query.as_ref(),
                self.inner.options.fallback,
            )
        })
    }

    /// Variable set of the theme in effect
    pub fn variables(&self) -> StyleVariableSet {
        StyleVariableSet::from_bundle(&self.inner.bundle, self.current_theme())
    }

    /// Whether the user has explicitly chosen a theme
    pub fn has_explicit_preference(&self) -> bool {
        self.inner.has_explicit_preference()
    }

    // ========== Writing ==========

    /// Persist `mode`, then paint it.
    ///
    /// The document is updated even when persisting fails; the failure is
    /// returned so the caller can report it. Both steps run under the state
    /// lock, so an OS preference change cannot land between them.
    pub fn set_theme(&self, mode: ThemeMode) -> Result<(), ThemeError> {
        let (persisted, painted) = {
            let mut state = self.inner.state.lock();
            let persisted = self.inner.persist(&mut state, mode);
            (persisted, self.inner.apply_locked(&mut state, mode))
        };
        if painted {
            self.inner.notify(mode);
        }
        persisted
    }

    pub fn toggle_theme(&self) -> Result<(), ThemeError> {
        self.set_theme(self.current_theme().toggle())
    }

    /// Forget the explicit choice and follow the OS preference again
    pub fn clear_preference(&self) -> Result<(), ThemeError> {
        let mode = self
            .inner
            .query
            .prefers_dark()
            .map(ThemeMode::from_prefers_dark)
            .unwrap_or(self.inner.options.fallback);

        let painted = {
            let mut state = self.inner.state.lock();
            self.inner
                .store
                .remove(THEME_KEY)
                .map_err(ThemeError::Clear)?;
            self.inner.apply_locked(&mut state, mode)
        };
        if painted {
            self.inner.notify(mode);
        }
        Ok(())
    }

    /// Register a callback run after every visible theme change
    pub fn set_change_callback(&self, callback: impl Fn(ThemeMode) + Send + Sync + 'static) {
        *self.inner.on_change.write() = Some(Arc::new(callback));
    }

    // ========== OS preference ==========

    /// Follow the OS color-scheme signal while no explicit preference exists.
    ///
    /// Calling this again replaces the previous subscription.
    pub fn watch_system_preference(&self) {
        if self.inner.disposed.is_set() {
            return;
        }

        let weak: Weak<EngineInner> = Arc::downgrade(&self.inner);
        let subscription = self.inner.query.subscribe(Box::new(move |prefers_dark| {
            if let Some(inner) = weak.upgrade() {
                inner.on_system_change(prefers_dark);
            }
        }));

        let previous = self.inner.system.lock().replace(subscription);
        if let Some(previous) = previous {
            previous.unsubscribe();
        }
    }

    pub fn is_watching_system(&self) -> bool {
        self.inner
            .system
            .lock()
            .as_ref()
            .is_some_and(Subscription::is_active)
    }
}

impl Disposable for ThemeEngine {
    /// Release the OS preference listener
    fn dispose(&self) {
        if !self.inner.disposed.trip() {
            return;
        }
        let subscription = self.inner.system.lock().take();
        if let Some(subscription) = subscription {
            subscription.unsubscribe();
        }
        tracing::debug!("theme engine disposed");
    }

    fn is_disposed(&self) -> bool {
        self.inner.disposed.is_set()
    }
}

impl EngineInner {
    fn has_explicit_preference(&self) -> bool {
        prepaint::stored_mode(self.store.as_ref()).is_some()
    }

    fn persist(&self, state: &mut EngineState, mode: ThemeMode) -> Result<(), ThemeError> {
        self.store.set(THEME_KEY, mode.as_str()).map_err(|source| {
            if state.persist_warned {
                tracing::debug!(%mode, %source, "theme preference still not persisted");
            } else {
                state.persist_warned = true;
                tracing::warn!(%mode, %source, "theme preference not persisted; using it for this session only");
            }
            ThemeError::Persist { mode, source }
        })
    }

    /// Paint `mode` if it is not already painted.
    ///
    /// Returns `true` if the document changed; the caller runs
    /// [`notify`](Self::notify) once the state lock is released.
    fn apply_locked(&self, state: &mut EngineState, mode: ThemeMode) -> bool {
        state.current = Some(mode);
        if state.applied == Some(mode) {
            return false;
        }

        let switching = self.options.suppress_transitions;
        self.surface
            .apply_root(&prepaint::root_patch(&self.bundle, mode, switching));
        state.applied = Some(mode);

        if switching {
            self.schedule_transition_release();
        }
        tracing::debug!(%mode, "theme applied");
        true
    }

    fn notify(&self, mode: ThemeMode) {
        let callback = self.on_change.read().clone();
        if let Some(callback) = callback {
            callback(mode);
        }
    }

    /// Drop the `theme-switching` class once the new theme has painted
    fn schedule_transition_release(&self) {
        if self.release_pending.swap(true, Ordering::SeqCst) {
            return;
        }
        let surface = Arc::clone(&self.surface);
        let pending = Arc::clone(&self.release_pending);
        self.surface.after_next_paint(Box::new(move || {
            pending.store(false, Ordering::SeqCst);
            surface.apply_root(&RootPatch::new().remove_class(SWITCHING_CLASS));
        }));
    }

    fn on_system_change(&self, prefers_dark: bool) {
        if self.disposed.is_set() {
            return;
        }

        let mode = ThemeMode::from_prefers_dark(prefers_dark);
        let painted = {
            let mut state = self.state.lock();
            if self.has_explicit_preference() {
                tracing::debug!(prefers_dark, "OS preference ignored; explicit theme set");
                return;
            }
            self.apply_locked(&mut state, mode)
        };
        if painted {
            self.notify(mode);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halo_platform::{MediaQuery, MemoryStore, VirtualDocument};

    fn engine() -> (ThemeEngine, Arc<MemoryStore>, Arc<VirtualDocument>, MediaQuery) {
        let store = Arc::new(MemoryStore::new());
        let doc = Arc::new(VirtualDocument::new());
        let query = MediaQuery::new(Some(true));
        let engine = ThemeEngine::new(store.clone(), doc.clone(), Arc::new(query.clone()));
        (engine, store, doc, query)
    }

    #[test]
    fn test_lazy_resolution_does_not_paint() {
        let (engine, store, doc, _query) = engine();
        assert_eq!(engine.current_theme(), ThemeMode::Dark);
        assert!(doc.root_snapshot().classes.is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_theme_persists_then_paints() {
        let (engine, store, doc, _query) = engine();
        engine.set_theme(ThemeMode::Light).unwrap();

        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("light"));
        let root = doc.root_snapshot();
        assert!(root.has_class("light"));
        assert!(!root.has_class("dark"));
        assert_eq!(root.attribute("data-theme"), Some("light"));
    }

    #[test]
    fn test_toggle() {
        let (engine, _store, _doc, _query) = engine();
        engine.toggle_theme().unwrap();
        assert_eq!(engine.current_theme(), ThemeMode::Light);
        engine.toggle_theme().unwrap();
        assert_eq!(engine.current_theme(), ThemeMode::Dark);
    }

    #[test]
    fn test_switching_class_lasts_one_frame() {
        let (engine, _store, doc, _query) = engine();
        engine.set_theme(ThemeMode::Light).unwrap();
        engine.set_theme(ThemeMode::Dark).unwrap();
        assert_eq!(doc.pending_paint_callbacks(), 1);

        let first = doc.paint();
        assert!(first.root.has_class(SWITCHING_CLASS));
        let second = doc.paint();
        assert!(!second.root.has_class(SWITCHING_CLASS));
        assert!(second.root.has_class("dark"));
    }

    #[test]
    fn test_no_switching_class_when_disabled() {
        let store = Arc::new(MemoryStore::new());
        let doc = Arc::new(VirtualDocument::new());
        let engine = ThemeEngine::with_options(
            store,
            doc.clone(),
            Arc::new(MediaQuery::default()),
            ThemeBundle::default(),
            ThemeOptions {
                fallback: ThemeMode::Light,
                suppress_transitions: false,
            },
        );
        assert_eq!(engine.current_theme(), ThemeMode::Light);
        engine.set_theme(ThemeMode::Dark).unwrap();
        assert!(!doc.root_snapshot().has_class(SWITCHING_CLASS));
        assert_eq!(doc.pending_paint_callbacks(), 0);
    }

    #[test]
    fn test_change_callback_fires_per_visible_change() {
        let (engine, _store, _doc, _query) = engine();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        engine.set_change_callback(move |mode| sink.lock().push(mode));

        engine.set_theme(ThemeMode::Light).unwrap();
        engine.set_theme(ThemeMode::Light).unwrap();
        engine.set_theme(ThemeMode::Dark).unwrap();

        assert_eq!(*seen.lock(), vec![ThemeMode::Light, ThemeMode::Dark]);
    }

    #[test]
    fn test_clear_preference_returns_to_os() {
        let (engine, store, _doc, query) = engine();
        engine.watch_system_preference();
        engine.set_theme(ThemeMode::Light).unwrap();

        engine.clear_preference().unwrap();
        assert!(!engine.has_explicit_preference());
        assert!(store.is_empty());
        assert_eq!(engine.current_theme(), ThemeMode::Dark);

        query.set_prefers_dark(false);
        assert_eq!(engine.current_theme(), ThemeMode::Light);
    }
}
