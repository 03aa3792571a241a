//! Deferred module loading
//!
//! Non-critical modules are loaded as one batch once a delay has elapsed.
//! The caller gets a handle back immediately and never blocks.

use crate::error::LoadError;
use futures_util::future::try_join_all;
use halo_platform::{DisposeFlag, Disposable};
use parking_lot::Mutex;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

type Outcome<M> = Result<Vec<M>, LoadError>;

/// A batch of modules scheduled by [`defer_modules`].
///
/// Dropping the handle disposes it.
#[must_use = "dropping DeferredModules cancels the load"]
pub struct DeferredModules<M> {
    outcome: Mutex<Option<oneshot::Receiver<Outcome<M>>>>,
    task: Mutex<Option<JoinHandle<()>>>,
    disposed: DisposeFlag,
}

/// Run every loader once `delay` has elapsed since this call.
///
/// Loaders run concurrently. The batch resolves with the modules in loader
/// order, or fails with the first loader error. Must be called from within a
/// tokio runtime.
pub fn defer_modules<M, E, F, Fut>(loaders: Vec<F>, delay: Duration) -> DeferredModules<M>
where
    M: Send + 'static,
    E: Display,
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<M, E>> + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    let count = loaders.len();

    let task = tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        tracing::debug!(count, "loading deferred modules");

        let loads = loaders.into_iter().enumerate().map(|(index, loader)| {
            let load = loader();
            async move {
                load.await.map_err(|err| LoadError::Failed {
                    index,
                    message: err.to_string(),
                })
            }
        });
        let outcome = try_join_all(loads).await;
        if let Err(err) = &outcome {
            tracing::warn!(%err, "deferred module load failed");
        }
        // nobody waiting is fine
        let _ = tx.send(outcome);
    });

    DeferredModules {
        outcome: Mutex::new(Some(rx)),
        task: Mutex::new(Some(task)),
        disposed: DisposeFlag::new(),
    }
}

impl<M> DeferredModules<M> {
    /// Wait for the batch. The modules can be taken only once.
    pub async fn wait(&self) -> Outcome<M> {
        if self.disposed.is_set() {
            return Err(LoadError::Disposed);
        }
        let outcome = self.outcome.lock().take();
        let Some(rx) = outcome else {
            return Err(LoadError::Consumed);
        };
        rx.await.unwrap_or(Err(LoadError::Disposed))
    }

    /// The batch has finished loading, failed, or been disposed
    pub fn is_settled(&self) -> bool {
        self.disposed.is_set()
            || self
                .task
                .lock()
                .as_ref()
                .map_or(true, JoinHandle::is_finished)
    }

    fn cancel(&self) {
        if !self.disposed.trip() {
            return;
        }
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }
}

impl<M: Send + 'static> Disposable for DeferredModules<M> {
    fn dispose(&self) {
        self.cancel();
    }

    fn is_disposed(&self) -> bool {
        self.disposed.is_set()
    }
}

/// Type-erased view of a batch, for owners that track many of them
pub(crate) trait DeferredBatch: Disposable {
    fn is_settled(&self) -> bool;
}

impl<M: Send + 'static> DeferredBatch for DeferredModules<M> {
    fn is_settled(&self) -> bool {
        DeferredModules::is_settled(self)
    }
}

impl<M> Drop for DeferredModules<M> {
    fn drop(&mut self) {
        self.cancel();
    }
}
