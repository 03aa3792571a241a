//! Halo Platform
//!
//! The host surfaces the Halo runtime talks to. Every surface is a trait so
//! the runtime can be driven in tests without a browser:
//!
//! - [`PreferenceStore`]: durable key/value storage shared by all subsystems
//! - [`DocumentSurface`]: document-level style variables, marker classes and
//!   element styles
//! - [`ColorSchemeQuery`]: the OS "prefers dark" signal
//! - [`Disposable`]: the single idempotent teardown every background effect exposes
//!
//! In-memory implementations ([`MemoryStore`], [`VirtualDocument`], [`MediaQuery`])
//! and a file-backed [`FileStore`] are provided.

pub mod dispose;
pub mod document;
pub mod error;
pub mod media;
pub mod storage;

pub use dispose::{DisposeFlag, Disposable};
pub use document::{
    DocumentSurface, ElementId, LinkHint, PaintFrame, RootPatch, RootSnapshot, Selector,
    VirtualDocument, VirtualElement,
};
pub use error::{PlatformError, Result};
pub use media::{ColorSchemeQuery, MediaQuery, SchemeListener, Subscription};
pub use storage::{FileStore, MemoryStore, NamespacedStore, PreferenceStore};
