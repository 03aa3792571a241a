//! Mount/unmount wiring

use crate::config::HaloConfig;
use halo_optimize::{RenderPathOptimizer, ResourceCache};
use halo_platform::{
    ColorSchemeQuery, DisposeFlag, Disposable, DocumentSurface, NamespacedStore, PreferenceStore,
};
use halo_theme::{ThemeBundle, ThemeEngine};
use halo_verify::{start_for_session, PollHandle, Session, StatusSource, VerificationState};
use std::sync::Arc;

type ReloadFn = Box<dyn FnOnce() + Send>;

/// Everything the runtime needs from its host
pub struct Host {
    pub store: Arc<dyn PreferenceStore>,
    pub surface: Arc<dyn DocumentSurface>,
    pub query: Arc<dyn ColorSchemeQuery>,
    session: Option<Session>,
    status_source: Option<Arc<dyn StatusSource>>,
    on_reload: Option<ReloadFn>,
    cache: Option<Arc<ResourceCache>>,
}

impl Host {
    pub fn new(
        store: Arc<dyn PreferenceStore>,
        surface: Arc<dyn DocumentSurface>,
        query: Arc<dyn ColorSchemeQuery>,
    ) -> Self {
        Self {
            store,
            surface,
            query,
            session: None,
            status_source: None,
            on_reload: None,
            cache: None,
        }
    }

    /// Attach the signed-in session. `on_reload` runs once when an
    /// unverified account becomes verified.
    pub fn with_session(
        mut self,
        session: Session,
        on_reload: impl FnOnce() + Send + 'static,
    ) -> Self {
        self.session = Some(session);
        self.on_reload = Some(Box::new(on_reload));
        self
    }

    /// Status source used instead of the configured `status_url`
    pub fn with_status_source(mut self, source: Arc<dyn StatusSource>) -> Self {
        self.status_source = Some(source);
        self
    }

    /// Cache used instead of opening `cache_path`
    pub fn with_cache(mut self, cache: Arc<ResourceCache>) -> Self {
        self.cache = Some(cache);
        self
    }
}

/// The three subsystems, mounted on one host
pub struct HaloRuntime {
    theme: ThemeEngine,
    optimizer: RenderPathOptimizer,
    poller: Option<PollHandle>,
    pending: bool,
    unmounted: DisposeFlag,
}

impl HaloRuntime {
    /// Paint the initial theme, then start every background effect.
    ///
    /// Starting the poller needs a tokio runtime; without one the poller is
    /// skipped and a warning is logged.
    pub fn mount(config: &HaloConfig, host: Host) -> Self {
        let Host {
            store,
            surface,
            query,
            session,
            status_source,
            on_reload,
            cache,
        } = host;

        let store: Arc<dyn PreferenceStore> =
            Arc::new(NamespacedStore::new(store, config.storage.namespace.clone()));
        let theme = ThemeEngine::mount_with(
            store,
            surface.clone(),
            query,
            ThemeBundle::default(),
            config.theme_options(),
        );

        let cache = cache.unwrap_or_else(|| {
            Arc::new(ResourceCache::open_or_memory(&config.optimizer.cache_path))
        });
        let optimizer = RenderPathOptimizer::install(surface, cache, &config.optimizer_options());

        let pending = session.as_ref().is_some_and(|s| !s.verified);
        let poller = session.and_then(|session| {
            let source = status_source.or_else(|| configured_source(config))?;
            if tokio::runtime::Handle::try_current().is_err() {
                tracing::warn!("no async runtime, verification polling skipped");
                return None;
            }
            let on_reload = on_reload.unwrap_or_else(|| Box::new(|| {}));
            Some(start_for_session(&session, config.poller_config(), source, on_reload))
        });

        tracing::info!(
            theme = %theme.current_theme(),
            polling = poller.is_some(),
            "halo runtime mounted"
        );

        Self {
            theme,
            optimizer,
            poller,
            pending,
            unmounted: DisposeFlag::new(),
        }
    }

    pub fn theme(&self) -> &ThemeEngine {
        &self.theme
    }

    pub fn optimizer(&self) -> &RenderPathOptimizer {
        &self.optimizer
    }

    pub fn cache(&self) -> &Arc<ResourceCache> {
        self.optimizer.cache()
    }

    pub fn poller(&self) -> Option<&PollHandle> {
        self.poller.as_ref()
    }

    pub fn verification(&self) -> VerificationState {
        match &self.poller {
            Some(poller) => poller.verification(),
            None => VerificationState {
                pending: self.pending,
            },
        }
    }

    /// Dispose every subsystem. Safe to call more than once.
    pub fn unmount(&self) {
        if !self.unmounted.trip() {
            return;
        }
        if let Some(poller) = &self.poller {
            poller.cancel();
        }
        self.optimizer.dispose();
        self.theme.dispose();
        tracing::info!("halo runtime unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        !self.unmounted.is_set()
    }
}

impl Drop for HaloRuntime {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn configured_source(config: &HaloConfig) -> Option<Arc<dyn StatusSource>> {
    let url = config.verification.status_url.as_deref()?;
    Some(Arc::new(halo_verify::HttpStatusSource::new(url)))
}
