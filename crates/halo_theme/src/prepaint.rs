//! Pre-paint flash guard
//!
//! Runs synchronously before the view tree is built: resolves the theme from
//! storage (or the OS preference) and paints the full baseline, so the very
//! first paint already matches the steady state.

use crate::state::THEME_KEY;
use crate::theme::{ThemeBundle, ThemeMode};
use crate::variables::StyleVariableSet;
use halo_platform::{ColorSchemeQuery, DocumentSurface, PreferenceStore, RootPatch};

/// Root attribute carrying the active mode
pub const DATA_ATTRIBUTE: &str = "data-theme";

/// Root class present for one frame after a theme switch
pub const SWITCHING_CLASS: &str = "theme-switching";

/// Explicitly stored mode, if any.
///
/// Unreadable storage and unrecognized values both count as "no preference".
pub fn stored_mode(store: &dyn PreferenceStore) -> Option<ThemeMode> {
    match store.get(THEME_KEY) {
        Ok(Some(value)) => match value.parse() {
            Ok(mode) => Some(mode),
            Err(err) => {
                tracing::debug!(%err, "ignoring stored theme");
                None
            }
        },
        Ok(None) => None,
        Err(err) => {
            tracing::debug!(%err, "theme preference unreadable");
            None
        }
    }
}

/// Stored preference, then OS preference, then `fallback`
pub fn resolve_initial_mode(
    store: &dyn PreferenceStore,
    query: &dyn ColorSchemeQuery,
    fallback: ThemeMode,
) -> ThemeMode {
    stored_mode(store)
        .or_else(|| query.prefers_dark().map(ThemeMode::from_prefers_dark))
        .unwrap_or(fallback)
}

/// Root patch that fully paints `mode`.
///
/// Removes every mode marker, adds the new one and the data attribute, then
/// writes the complete variable set.
pub(crate) fn root_patch(bundle: &ThemeBundle, mode: ThemeMode, switching: bool) -> RootPatch {
    let mut patch = ThemeMode::ALL
        .iter()
        .fold(RootPatch::new(), |patch, m| patch.remove_class(m.as_str()))
        .add_class(mode.as_str())
        .attribute(DATA_ATTRIBUTE, mode.as_str());

    if switching {
        patch = patch.add_class(SWITCHING_CLASS);
    }

    let variables = StyleVariableSet::from_bundle(bundle, mode);
    for (name, value) in variables.css_pairs() {
        patch = patch.variable(name, value);
    }
    patch
}

/// Resolve and paint the initial theme. Never waits on anything asynchronous.
pub fn apply_initial_theme(
    store: &dyn PreferenceStore,
    query: &dyn ColorSchemeQuery,
    surface: &dyn DocumentSurface,
) -> ThemeMode {
    apply_initial_theme_with(store, query, surface, &ThemeBundle::default(), ThemeMode::Dark)
}

pub fn apply_initial_theme_with(
    store: &dyn PreferenceStore,
    query: &dyn ColorSchemeQuery,
    surface: &dyn DocumentSurface,
    bundle: &ThemeBundle,
    fallback: ThemeMode,
) -> ThemeMode {
    let mode = resolve_initial_mode(store, query, fallback);
    surface.apply_root(&root_patch(bundle, mode, false));
    tracing::debug!(%mode, "pre-paint theme applied");
    mode
}
