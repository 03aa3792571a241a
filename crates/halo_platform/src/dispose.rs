//! Scoped teardown contract

use std::sync::atomic::{AtomicBool, Ordering};

/// A background effect owned by a UI scope.
///
/// `dispose` clears every timer and listener the effect started. It must be
/// safe to call any number of times and at any point of the effect's life.
pub trait Disposable: Send + Sync {
    fn dispose(&self);

    fn is_disposed(&self) -> bool;
}

/// One-way latch backing `Disposable` implementations
#[derive(Debug, Default)]
pub struct DisposeFlag(AtomicBool);

impl DisposeFlag {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Set the flag. Returns `true` only for the call that set it.
    pub fn trip(&self) -> bool {
        !self.0.swap(true, Ordering::SeqCst)
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
