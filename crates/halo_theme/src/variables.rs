//! Document style variables
//!
//! A [`StyleVariableSet`] is always complete: one value for every
//! [`StyleRole`]. The theme engine writes the whole set in one patch, so the
//! document never holds variables from two different modes.

use crate::theme::{Theme, ThemeBundle, ThemeMode};
use crate::tokens::{ColorToken, OpacityToken, ShadowToken};
use std::collections::BTreeMap;

/// Logical design role exposed to stylesheets as `--<name>`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StyleRole {
    BackgroundPrimary,
    BackgroundSecondary,
    BackgroundTertiary,
    TextPrimary,
    TextSecondary,
    TextMuted,
    BorderPrimary,
    BorderSecondary,
    AccentPrimary,
    AccentHover,
    ShadowPrimary,
    ShadowSecondary,
    OverlayOpacity,
}

impl StyleRole {
    pub const ALL: [StyleRole; 13] = [
        StyleRole::BackgroundPrimary,
        StyleRole::BackgroundSecondary,
        StyleRole::BackgroundTertiary,
        StyleRole::TextPrimary,
        StyleRole::TextSecondary,
        StyleRole::TextMuted,
        StyleRole::BorderPrimary,
        StyleRole::BorderSecondary,
        StyleRole::AccentPrimary,
        StyleRole::AccentHover,
        StyleRole::ShadowPrimary,
        StyleRole::ShadowSecondary,
        StyleRole::OverlayOpacity,
    ];

    /// Role name without the `--` prefix
    pub fn name(self) -> &'static str {
        match self {
            StyleRole::BackgroundPrimary => "background-primary",
            StyleRole::BackgroundSecondary => "background-secondary",
            StyleRole::BackgroundTertiary => "background-tertiary",
            StyleRole::TextPrimary => "text-primary",
            StyleRole::TextSecondary => "text-secondary",
            StyleRole::TextMuted => "text-muted",
            StyleRole::BorderPrimary => "border-primary",
            StyleRole::BorderSecondary => "border-secondary",
            StyleRole::AccentPrimary => "accent-primary",
            StyleRole::AccentHover => "accent-hover",
            StyleRole::ShadowPrimary => "shadow-primary",
            StyleRole::ShadowSecondary => "shadow-secondary",
            StyleRole::OverlayOpacity => "overlay-opacity",
        }
    }

    /// Custom property name, e.g. `--text-primary`
    pub fn css_variable(self) -> String {
        format!("--{}", self.name())
    }

    fn resolve(self, theme: &Theme) -> String {
        let color = |token| theme.colors().get(token).to_css();
        let shadow = |token| theme.shadows().get(token).to_css();
        match self {
            StyleRole::BackgroundPrimary => color(ColorToken::BackgroundPrimary),
            StyleRole::BackgroundSecondary => color(ColorToken::BackgroundSecondary),
            StyleRole::BackgroundTertiary => color(ColorToken::BackgroundTertiary),
            StyleRole::TextPrimary => color(ColorToken::TextPrimary),
            StyleRole::TextSecondary => color(ColorToken::TextSecondary),
            StyleRole::TextMuted => color(ColorToken::TextMuted),
            StyleRole::BorderPrimary => color(ColorToken::BorderPrimary),
            StyleRole::BorderSecondary => color(ColorToken::BorderSecondary),
            StyleRole::AccentPrimary => color(ColorToken::AccentPrimary),
            StyleRole::AccentHover => color(ColorToken::AccentHover),
            StyleRole::ShadowPrimary => shadow(ShadowToken::Primary),
            StyleRole::ShadowSecondary => shadow(ShadowToken::Secondary),
            StyleRole::OverlayOpacity => theme.opacities().get(OpacityToken::Overlay).to_string(),
        }
    }
}

/// Concrete value for every style role of one mode
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleVariableSet {
    mode: ThemeMode,
    values: BTreeMap<StyleRole, String>,
}

impl StyleVariableSet {
    pub fn from_theme(theme: &Theme) -> Self {
        let values = StyleRole::ALL
            .iter()
            .map(|role| (*role, role.resolve(theme)))
            .collect();
        Self {
            mode: theme.mode(),
            values,
        }
    }

    /// Variable set of the default Halo bundle
    pub fn for_mode(mode: ThemeMode) -> Self {
        Self::from_bundle(&ThemeBundle::default(), mode)
    }

    pub fn from_bundle(bundle: &ThemeBundle, mode: ThemeMode) -> Self {
        Self::from_theme(bundle.for_mode(mode))
    }

    pub fn mode(&self) -> ThemeMode {
        self.mode
    }

    pub fn get(&self, role: StyleRole) -> Option<&str> {
        self.values.get(&role).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(--name, value)` pairs in role order
    pub fn css_pairs(&self) -> impl Iterator<Item = (String, &str)> + '_ {
        self.values
            .iter()
            .map(|(role, value)| (role.css_variable(), value.as_str()))
    }

    /// Render as a CSS rule, e.g. for a static `:root.dark { ... }` stylesheet
    pub fn to_css_rule(&self, selector: &str) -> String {
        let mut css = format!("{selector} {{\n");
        for (name, value) in self.css_pairs() {
            css.push_str(&format!("  {name}: {value};\n"));
        }
        css.push('}');
        css
    }
}
