use halo_platform::{
    Disposable, DocumentSurface, MediaQuery, MemoryStore, PreferenceStore, VirtualDocument,
};
use halo_theme::{
    apply_initial_theme, StyleRole, StyleVariableSet, ThemeEngine, ThemeError, ThemeMode,
    THEME_KEY,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

struct Host {
    store: Arc<MemoryStore>,
    document: Arc<VirtualDocument>,
    query: MediaQuery,
}

impl Host {
    fn new(prefers_dark: Option<bool>) -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            document: Arc::new(VirtualDocument::new()),
            query: MediaQuery::new(prefers_dark),
        }
    }

    fn mount(&self) -> ThemeEngine {
        ThemeEngine::mount(
            self.store.clone(),
            self.document.clone(),
            Arc::new(self.query.clone()),
        )
    }
}

fn assert_painted(document: &VirtualDocument, mode: ThemeMode) {
    let root = document.root_snapshot();
    let expected = StyleVariableSet::for_mode(mode);
    for role in StyleRole::ALL {
        assert_eq!(
            root.variable(&role.css_variable()),
            expected.get(role),
            "{role:?}"
        );
    }
    assert!(root.has_class(mode.as_str()));
    assert!(!root.has_class(mode.toggle().as_str()));
    assert_eq!(root.attribute("data-theme"), Some(mode.as_str()));
}

#[test]
fn fresh_profile_follows_os_without_creating_entry() {
    let host = Host::new(Some(true));
    let engine = host.mount();

    assert_eq!(engine.current_theme(), ThemeMode::Dark);
    assert!(!engine.has_explicit_preference());
    assert_eq!(host.store.get(THEME_KEY).unwrap(), None);
    assert_painted(&host.document, ThemeMode::Dark);
}

#[test]
fn no_preference_anywhere_defaults_to_dark() {
    let host = Host::new(None);
    let engine = host.mount();
    assert_eq!(engine.current_theme(), ThemeMode::Dark);
}

#[test]
fn explicit_choice_overrides_os_signal() {
    let host = Host::new(Some(true));
    let engine = host.mount();

    engine.set_theme(ThemeMode::Light).unwrap();
    assert_eq!(host.store.get(THEME_KEY).unwrap().as_deref(), Some("light"));

    host.query.set_prefers_dark(false);
    host.query.set_prefers_dark(true);
    assert_eq!(engine.current_theme(), ThemeMode::Light);
    assert_painted(&host.document, ThemeMode::Light);
}

#[test]
fn explicit_choice_wins_against_concurrent_os_signal() {
    for _ in 0..50 {
        let host = Host::new(Some(true));
        let engine = host.mount();

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for i in 0..20 {
                    host.query.set_prefers_dark(i % 2 == 0);
                }
            });
            engine.set_theme(ThemeMode::Light).unwrap();
        });

        assert_eq!(engine.current_theme(), ThemeMode::Light);
        assert_painted(&host.document, ThemeMode::Light);
    }
}

#[test]
fn os_signal_drives_theme_without_explicit_choice() {
    let host = Host::new(Some(true));
    let engine = host.mount();

    host.query.set_prefers_dark(false);
    assert_eq!(engine.current_theme(), ThemeMode::Light);
    assert_painted(&host.document, ThemeMode::Light);
    assert_eq!(host.store.get(THEME_KEY).unwrap(), None);
}

#[test]
fn set_theme_twice_matches_set_theme_once() {
    let host = Host::new(Some(false));
    let engine = host.mount();

    engine.set_theme(ThemeMode::Dark).unwrap();
    let once = host.document.root_snapshot();
    let invalidations = host.document.invalidations();

    engine.set_theme(ThemeMode::Dark).unwrap();
    assert_eq!(host.document.root_snapshot(), once);
    assert_eq!(host.document.invalidations(), invalidations);
    assert_eq!(host.query.listener_count(), 1);
}

#[test]
fn first_paint_after_cold_start_never_shows_light_values() {
    let host = Host::new(Some(false));
    host.store.set(THEME_KEY, "dark").unwrap();

    let mode = apply_initial_theme(
        host.store.as_ref(),
        &host.query,
        host.document.as_ref(),
    );
    let first = host.document.paint();

    assert_eq!(mode, ThemeMode::Dark);
    let light = StyleVariableSet::for_mode(ThemeMode::Light);
    for (name, value) in first.root.variables.iter() {
        let light_value = light
            .css_pairs()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.to_string());
        assert_ne!(Some(value.clone()), light_value, "{name} painted light");
    }
    assert!(first.root.has_class("dark"));
    assert!(!first.root.has_class("light"));
}

#[test]
fn persistence_failure_still_paints_and_is_reported() {
    let host = Host::new(Some(true));
    let engine = host.mount();
    host.store.set_available(false);

    let err = engine.set_theme(ThemeMode::Light).unwrap_err();
    assert!(matches!(err, ThemeError::Persist { mode: ThemeMode::Light, .. }));
    assert_eq!(engine.current_theme(), ThemeMode::Light);
    assert_painted(&host.document, ThemeMode::Light);

    // Second failure is still returned to the caller
    assert!(engine.set_theme(ThemeMode::Dark).is_err());

    // Next cold start falls back to the OS default
    host.store.set_available(true);
    let cold = Host {
        store: host.store.clone(),
        document: Arc::new(VirtualDocument::new()),
        query: MediaQuery::new(Some(true)),
    };
    assert_eq!(cold.mount().current_theme(), ThemeMode::Dark);
}

#[test]
fn quota_failure_is_a_persist_error() {
    let store = Arc::new(MemoryStore::with_quota(4));
    let document = Arc::new(VirtualDocument::new());
    let engine = ThemeEngine::mount(store, document.clone(), Arc::new(MediaQuery::default()));

    assert!(matches!(
        engine.set_theme(ThemeMode::Light),
        Err(ThemeError::Persist { .. })
    ));
    assert_painted(&document, ThemeMode::Light);
}

#[test]
fn watching_twice_registers_one_listener() {
    let host = Host::new(Some(true));
    let engine = host.mount();
    engine.watch_system_preference();
    engine.watch_system_preference();
    assert_eq!(host.query.listener_count(), 1);
}

#[test]
fn dispose_releases_listener_and_is_idempotent() {
    let host = Host::new(Some(true));
    let engine = host.mount();

    engine.dispose();
    engine.dispose();
    assert!(engine.is_disposed());
    assert!(!engine.is_watching_system());
    assert_eq!(host.query.listener_count(), 0);

    host.query.set_prefers_dark(false);
    assert_eq!(engine.current_theme(), ThemeMode::Dark);

    engine.watch_system_preference();
    assert_eq!(host.query.listener_count(), 0);
}

#[test]
fn dropping_engine_releases_listener() {
    let host = Host::new(Some(true));
    drop(host.mount());
    assert_eq!(host.query.listener_count(), 0);
}
