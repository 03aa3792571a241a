//! Halo Theme Engine
//!
//! Owns the single source of truth for light/dark presentation, persists it,
//! and re-paints the document root to match.
//!
//! # Overview
//!
//! - **[`ThemeMode`]**: exactly one of `Light` / `Dark` is active at any time
//! - **[`StyleVariableSet`]**: the complete set of document style variables for a mode
//! - **Flash guard**: [`prepaint::apply_initial_theme`] paints the persisted (or OS)
//!   theme before the view tree mounts
//! - **[`ThemeEngine`]**: the one gate through which the theme changes, plus the
//!   OS preference listener
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use halo_platform::{MediaQuery, MemoryStore, VirtualDocument};
//! use halo_theme::{ThemeEngine, ThemeMode};
//!
//! let store = Arc::new(MemoryStore::new());
//! let document = Arc::new(VirtualDocument::new());
//! let query = Arc::new(MediaQuery::new(Some(true)));
//!
//! // Before the first paint
//! let engine = ThemeEngine::mount(store, document, query);
//! assert_eq!(engine.current_theme(), ThemeMode::Dark);
//!
//! engine.set_theme(ThemeMode::Light).unwrap();
//! assert_eq!(engine.current_theme(), ThemeMode::Light);
//! ```
//!
//! # Document contract
//!
//! Downstream stylesheets depend on these names; changing them is breaking:
//!
//! - root class `light` or `dark`
//! - root attribute `data-theme="light|dark"`
//! - one `--<role>` variable per [`StyleRole`]
//! - transient root class `theme-switching`, present for exactly one frame
//!   after a switch so stylesheets can disable transitions

pub mod error;
pub mod prepaint;
pub mod state;
pub mod theme;
pub mod themes;
pub mod tokens;
pub mod variables;

pub use error::ThemeError;
pub use prepaint::{apply_initial_theme, resolve_initial_mode};
pub use state::{ThemeEngine, ThemeOptions, THEME_KEY};
pub use theme::{Theme, ThemeBundle, ThemeMode};
pub use themes::HaloTheme;
pub use tokens::*;
pub use variables::{StyleRole, StyleVariableSet};
