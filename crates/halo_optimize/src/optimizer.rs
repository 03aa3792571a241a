//! Optimizer bundle

use crate::cache::ResourceCache;
use crate::compositing::CompositingHints;
use crate::critical::{CriticalResource, CriticalResources};
use crate::deferred::{defer_modules, DeferredBatch, DeferredModules};
use halo_platform::{DisposeFlag, Disposable, DocumentSurface};
use parking_lot::Mutex;
use std::fmt::Display;
use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptimizerOptions {
    pub compositing_selector: String,
    pub critical_resources: Vec<CriticalResource>,
    pub defer_delay: Duration,
}

impl Default for OptimizerOptions {
    fn default() -> Self {
        Self {
            compositing_selector: ".animate".to_string(),
            critical_resources: Vec::new(),
            defer_delay: Duration::from_millis(2000),
        }
    }
}

/// Every render-path hint installed for one mount
pub struct RenderPathOptimizer {
    compositing: CompositingHints,
    critical: CriticalResources,
    cache: Arc<ResourceCache>,
    /// Batches still loading. Settled or dropped batches are pruned on
    /// every [`defer`](Self::defer).
    deferred: Mutex<Vec<Weak<dyn DeferredBatch>>>,
    defer_delay: Duration,
    disposed: DisposeFlag,
}

impl RenderPathOptimizer {
    /// Install the document hints. A bad compositing selector is logged
    /// and skipped.
    pub fn install(
        surface: Arc<dyn DocumentSurface>,
        cache: Arc<ResourceCache>,
        options: &OptimizerOptions,
    ) -> Self {
        let compositing = CompositingHints::new(surface.clone());
        if let Err(err) = compositing.mark(&options.compositing_selector) {
            tracing::warn!(%err, "compositing hints skipped");
        }
        let critical = CriticalResources::tag(surface, options.critical_resources.iter().cloned());

        Self {
            compositing,
            critical,
            cache,
            deferred: Mutex::new(Vec::new()),
            defer_delay: options.defer_delay,
            disposed: DisposeFlag::new(),
        }
    }

    /// Schedule `loaders` after the configured delay. The batch is
    /// disposed together with the optimizer unless it settles first.
    pub fn defer<M, E, F, Fut>(&self, loaders: Vec<F>) -> Arc<DeferredModules<M>>
    where
        M: Send + 'static,
        E: Display,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<M, E>> + Send + 'static,
    {
        let modules = Arc::new(defer_modules(loaders, self.defer_delay));
        if self.disposed.is_set() {
            modules.dispose();
        } else {
            let batch: Weak<dyn DeferredBatch> = Arc::<DeferredModules<M>>::downgrade(&modules);
            let mut deferred = self.deferred.lock();
            deferred.retain(|weak| weak.upgrade().is_some_and(|batch| !batch.is_settled()));
            deferred.push(batch);
        }
        modules
    }

    /// Batches tracked for disposal
    pub fn deferred_count(&self) -> usize {
        self.deferred.lock().len()
    }

    pub fn cache(&self) -> &Arc<ResourceCache> {
        &self.cache
    }

    pub fn compositing(&self) -> &CompositingHints {
        &self.compositing
    }

    pub fn critical(&self) -> &CriticalResources {
        &self.critical
    }
}

impl Disposable for RenderPathOptimizer {
    fn dispose(&self) {
        if !self.disposed.trip() {
            return;
        }
        self.compositing.dispose();
        self.critical.dispose();
        let deferred = std::mem::take(&mut *self.deferred.lock());
        for batch in deferred.iter().filter_map(Weak::upgrade) {
            batch.dispose();
        }
        self.cache.dispose();
        tracing::debug!("render-path optimizer disposed");
    }

    fn is_disposed(&self) -> bool {
        self.disposed.is_set()
    }
}
