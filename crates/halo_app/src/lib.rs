//! Halo Application Runtime
//!
//! Wires the three subsystems to one host for the lifetime of a mount:
//!
//! ```ignore
//! let config = HaloConfig::load_or_default("halo.toml")?;
//! let runtime = HaloRuntime::mount(&config, Host::new(store, document, query));
//! // ...
//! runtime.unmount();
//! ```
//!
//! Mounting runs the flash guard before anything else, so the first paint
//! already carries the resolved theme. Unmounting disposes every timer,
//! listener and hint the mount created.

pub mod config;
pub mod runtime;

pub use config::{
    ConfigError, HaloConfig, OptimizerConfig, StorageConfig, ThemeConfig, VerificationConfig,
};
pub use runtime::{HaloRuntime, Host};
