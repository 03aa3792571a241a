//! Theme modes and light/dark bundles

use crate::error::ThemeError;
use crate::tokens::{ColorTokens, OpacityTokens, ShadowTokens};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Light or dark presentation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    #[default]
    Dark,
}

impl ThemeMode {
    pub const ALL: [ThemeMode; 2] = [ThemeMode::Light, ThemeMode::Dark];

    /// Stored and marker representation (`"light"` / `"dark"`)
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    pub fn from_prefers_dark(prefers_dark: bool) -> Self {
        if prefers_dark {
            ThemeMode::Dark
        } else {
            ThemeMode::Light
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            _ => Err(ThemeError::UnknownMode(s.to_string())),
        }
    }
}

/// Tokens for one mode
#[derive(Clone, Debug)]
pub struct Theme {
    mode: ThemeMode,
    colors: ColorTokens,
    shadows: ShadowTokens,
    opacities: OpacityTokens,
}

impl Theme {
    pub fn new(
        mode: ThemeMode,
        colors: ColorTokens,
        shadows: ShadowTokens,
        opacities: OpacityTokens,
    ) -> Self {
        Self {
            mode,
            colors,
            shadows,
            opacities,
        }
    }

    pub fn mode(&self) -> ThemeMode {
        self.mode
    }

    pub fn colors(&self) -> &ColorTokens {
        &self.colors
    }

    pub fn shadows(&self) -> &ShadowTokens {
        &self.shadows
    }

    pub fn opacities(&self) -> &OpacityTokens {
        &self.opacities
    }
}

/// A light/dark pair
#[derive(Clone, Debug)]
pub struct ThemeBundle {
    light: Theme,
    dark: Theme,
}

impl ThemeBundle {
    pub fn new(light: Theme, dark: Theme) -> Self {
        Self { light, dark }
    }

    pub fn for_mode(&self, mode: ThemeMode) -> &Theme {
        match mode {
            ThemeMode::Light => &self.light,
            ThemeMode::Dark => &self.dark,
        }
    }
}

impl Default for ThemeBundle {
    fn default() -> Self {
        crate::themes::HaloTheme::bundle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("light".parse::<ThemeMode>().unwrap(), ThemeMode::Light);
        assert_eq!(" DARK ".parse::<ThemeMode>().unwrap(), ThemeMode::Dark);
        assert!(matches!(
            "sepia".parse::<ThemeMode>(),
            Err(ThemeError::UnknownMode(_))
        ));
    }

    #[test]
    fn test_toggle_and_display() {
        assert_eq!(ThemeMode::Light.toggle(), ThemeMode::Dark);
        assert_eq!(ThemeMode::Dark.toggle().to_string(), "light");
    }

    #[test]
    fn test_serde_uses_lowercase() {
        assert_eq!(serde_json::to_string(&ThemeMode::Dark).unwrap(), "\"dark\"");
        let mode: ThemeMode = serde_json::from_str("\"light\"").unwrap();
        assert_eq!(mode, ThemeMode::Light);
    }

    #[test]
    fn test_bundle_selects_by_mode() {
        let bundle = ThemeBundle::default();
        for mode in ThemeMode::ALL {
            assert_eq!(bundle.for_mode(mode).mode(), mode);
        }
    }
}
