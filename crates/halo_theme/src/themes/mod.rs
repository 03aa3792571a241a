//! Built-in themes

mod halo;

pub use halo::{daylight, midnight, HaloTheme};
