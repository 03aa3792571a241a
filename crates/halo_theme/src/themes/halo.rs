//! Default Halo theme
//!
//! Two palettes:
//! - Daylight (light)
//! - Midnight (dark)

use crate::theme::{Theme, ThemeBundle, ThemeMode};
use crate::tokens::*;
use halo_core::Color;

/// Daylight palette (light theme)
pub mod daylight {
    use halo_core::Color;

    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const SNOW: Color = Color::rgb(248.0 / 255.0, 250.0 / 255.0, 252.0 / 255.0);
    pub const MIST: Color = Color::rgb(241.0 / 255.0, 245.0 / 255.0, 249.0 / 255.0);
    pub const CLOUD: Color = Color::rgb(226.0 / 255.0, 232.0 / 255.0, 240.0 / 255.0);
    pub const PEWTER: Color = Color::rgb(203.0 / 255.0, 213.0 / 255.0, 225.0 / 255.0);
    pub const STONE: Color = Color::rgb(148.0 / 255.0, 163.0 / 255.0, 184.0 / 255.0);
    pub const SLATE: Color = Color::rgb(71.0 / 255.0, 85.0 / 255.0, 105.0 / 255.0);
    pub const INK: Color = Color::rgb(15.0 / 255.0, 23.0 / 255.0, 42.0 / 255.0);
    pub const INDIGO: Color = Color::rgb(99.0 / 255.0, 102.0 / 255.0, 241.0 / 255.0);
    pub const INDIGO_DEEP: Color = Color::rgb(79.0 / 255.0, 70.0 / 255.0, 229.0 / 255.0);
}

/// Midnight palette (dark theme)
pub mod midnight {
    use halo_core::Color;

    pub const ABYSS: Color = Color::rgb(11.0 / 255.0, 15.0 / 255.0, 25.0 / 255.0);
    pub const NIGHT: Color = Color::rgb(17.0 / 255.0, 24.0 / 255.0, 39.0 / 255.0);
    pub const DUSK: Color = Color::rgb(31.0 / 255.0, 41.0 / 255.0, 55.0 / 255.0);
    pub const GRAPHITE: Color = Color::rgb(55.0 / 255.0, 65.0 / 255.0, 81.0 / 255.0);
    pub const ASH: Color = Color::rgb(107.0 / 255.0, 114.0 / 255.0, 128.0 / 255.0);
    pub const SILVER: Color = Color::rgb(209.0 / 255.0, 213.0 / 255.0, 219.0 / 255.0);
    pub const PEARL: Color = Color::rgb(249.0 / 255.0, 250.0 / 255.0, 251.0 / 255.0);
    pub const PERIWINKLE: Color = Color::rgb(129.0 / 255.0, 140.0 / 255.0, 248.0 / 255.0);
    pub const LILAC: Color = Color::rgb(165.0 / 255.0, 180.0 / 255.0, 252.0 / 255.0);
}

/// Default Halo theme
pub struct HaloTheme;

impl HaloTheme {
    /// Daylight variant
    pub fn light() -> Theme {
        Theme::new(
            ThemeMode::Light,
            ColorTokens {
                background_primary: daylight::WHITE,
                background_secondary: daylight::SNOW,
                background_tertiary: daylight::MIST,
                text_primary: daylight::INK,
                text_secondary: daylight::SLATE,
                text_muted: daylight::STONE,
                border_primary: daylight::CLOUD,
                border_secondary: daylight::PEWTER,
                accent_primary: daylight::INDIGO,
                accent_hover: daylight::INDIGO_DEEP,
            },
            ShadowTokens {
                primary: Shadow::new(0.0, 1.0, 3.0, 0.0, daylight::INK.with_alpha(0.1)),
                secondary: Shadow::new(0.0, 10.0, 25.0, -5.0, daylight::INK.with_alpha(0.08)),
            },
            OpacityTokens { overlay: 0.5 },
        )
    }

    /// Midnight variant
    pub fn dark() -> Theme {
        Theme::new(
            ThemeMode::Dark,
            ColorTokens {
                background_primary: midnight::ABYSS,
                background_secondary: midnight::NIGHT,
                background_tertiary: midnight::DUSK,
                text_primary: midnight::PEARL,
                text_secondary: midnight::SILVER,
                text_muted: midnight::ASH,
                border_primary: midnight::DUSK,
                border_secondary: midnight::GRAPHITE,
                accent_primary: midnight::PERIWINKLE,
                accent_hover: midnight::LILAC,
            },
            ShadowTokens {
                primary: Shadow::new(0.0, 1.0, 3.0, 0.0, Color::BLACK.with_alpha(0.5)),
                secondary: Shadow::new(0.0, 10.0, 25.0, -5.0, Color::BLACK.with_alpha(0.4)),
            },
            OpacityTokens { overlay: 0.7 },
        )
    }

    pub fn bundle() -> ThemeBundle {
        ThemeBundle::new(Self::light(), Self::dark())
    }
}
