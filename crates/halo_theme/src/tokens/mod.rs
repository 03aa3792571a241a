//! Design tokens for theming
//!
//! Tokens are the atomic values that make up a theme:
//! - Colors
//! - Shadows
//! - Opacity

mod color;
mod opacity;
mod shadow;

pub use color::*;
pub use opacity::*;
pub use shadow::*;
