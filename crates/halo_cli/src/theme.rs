//! `halo theme` commands

use anyhow::{Context, Result};
use halo_app::HaloConfig;
use halo_platform::{FileStore, MediaQuery, NamespacedStore, VirtualDocument};
use halo_theme::{StyleVariableSet, ThemeBundle, ThemeEngine, ThemeMode};
use std::sync::Arc;

/// Engine over the configured preference file with a headless document
fn engine(config: &HaloConfig, prefers_dark: Option<bool>) -> ThemeEngine {
    let store = NamespacedStore::new(
        FileStore::open(&config.storage.path),
        config.storage.namespace.clone(),
    );
    ThemeEngine::with_options(
        Arc::new(store),
        Arc::new(VirtualDocument::new()),
        Arc::new(MediaQuery::new(prefers_dark)),
        ThemeBundle::default(),
        config.theme_options(),
    )
}

fn report(engine: &ThemeEngine) {
    let source = if engine.has_explicit_preference() {
        "stored"
    } else {
        "system"
    };
    println!("{} ({source})", engine.current_theme());
}

pub fn get(config: &HaloConfig, prefers_dark: Option<bool>) -> Result<()> {
    report(&engine(config, prefers_dark));
    Ok(())
}

pub fn set(config: &HaloConfig, prefers_dark: Option<bool>, mode: ThemeMode) -> Result<()> {
    let engine = engine(config, prefers_dark);
    engine
        .set_theme(mode)
        .with_context(|| format!("failed to store theme in {}", config.storage.path.display()))?;
    report(&engine);
    Ok(())
}

pub fn toggle(config: &HaloConfig, prefers_dark: Option<bool>) -> Result<()> {
    let engine = engine(config, prefers_dark);
    engine.toggle_theme().context("failed to store theme")?;
    report(&engine);
    Ok(())
}

pub fn clear(config: &HaloConfig, prefers_dark: Option<bool>) -> Result<()> {
    let engine = engine(config, prefers_dark);
    engine.clear_preference().context("failed to clear theme")?;
    report(&engine);
    Ok(())
}

pub fn css(mode: Option<ThemeMode>) {
    let modes = match mode {
        Some(mode) => vec![mode],
        None => ThemeMode::ALL.to_vec(),
    };
    for mode in modes {
        let set = StyleVariableSet::for_mode(mode);
        println!("{}\n", set.to_css_rule(&format!(":root.{mode}")));
    }
}
