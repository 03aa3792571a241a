//! Color tokens for theming

use halo_core::Color;

/// Semantic color token keys for dynamic access
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum ColorToken {
    // Surfaces
    BackgroundPrimary,
    BackgroundSecondary,
    BackgroundTertiary,

    // Text
    TextPrimary,
    TextSecondary,
    TextMuted,

    // Borders
    BorderPrimary,
    BorderSecondary,

    // Accent
    AccentPrimary,
    AccentHover,
}

/// Complete set of semantic color tokens
#[derive(Clone, Debug, PartialEq)]
pub struct ColorTokens {
    pub background_primary: Color,
    pub background_secondary: Color,
    pub background_tertiary: Color,

    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_muted: Color,

    pub border_primary: Color,
    pub border_secondary: Color,

    pub accent_primary: Color,
    pub accent_hover: Color,
}

impl ColorTokens {
    /// Get color by token key
    pub fn get(&self, token: ColorToken) -> Color {
        match token {
            ColorToken::BackgroundPrimary => self.background_primary,
            ColorToken::BackgroundSecondary => self.background_secondary,
            ColorToken::BackgroundTertiary => self.background_tertiary,
            ColorToken::TextPrimary => self.text_primary,
            ColorToken::TextSecondary => self.text_secondary,
            ColorToken::TextMuted => self.text_muted,
            ColorToken::BorderPrimary => self.border_primary,
            ColorToken::BorderSecondary => self.border_secondary,
            ColorToken::AccentPrimary => self.accent_primary,
            ColorToken::AccentHover => self.accent_hover,
        }
    }
}
