//! Halo Render-Path Optimizer
//!
//! Independent, best-effort hints that speed up the render path:
//!
//! - [`defer_modules`]: load non-critical modules after a delay
//! - [`CompositingHints`]: promote animated elements to their own layer
//! - [`CriticalResources`]: preload links for resources the first view needs
//! - [`ResourceCache`]: durable write-through cache that never fails the caller
//!
//! Every hint implements [`Disposable`](halo_platform::Disposable). Disposing
//! twice, or before the hint's async work finishes, is a no-op.
//! [`RenderPathOptimizer`] bundles them behind a single `dispose`.

pub mod cache;
pub mod compositing;
pub mod critical;
pub mod deferred;
pub mod error;
pub mod optimizer;

pub use cache::{
    CacheBackend, CacheDiagnostic, CacheOperation, MemoryBackend, Payload, RedbBackend,
    ResourceCache, ResourceCacheEntry,
};
pub use compositing::{CompositingHints, COMPOSITING_PROPERTIES};
pub use critical::{CriticalResource, CriticalResources};
pub use deferred::{defer_modules, DeferredModules};
pub use error::{CacheError, LoadError};
pub use optimizer::{OptimizerOptions, RenderPathOptimizer};
