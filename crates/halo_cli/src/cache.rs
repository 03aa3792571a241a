//! `halo cache` commands

use anyhow::{Context, Result};
use halo_app::HaloConfig;
use halo_optimize::{Payload, ResourceCache};
use parking_lot::Mutex;
use std::sync::Arc;

/// Open the configured cache; absorbed failures are collected so the
/// command can report them.
fn open(config: &HaloConfig) -> Result<(ResourceCache, Arc<Mutex<Option<String>>>)> {
    let path = &config.optimizer.cache_path;
    let failure = Arc::new(Mutex::new(None));
    let sink = failure.clone();
    let cache = ResourceCache::open(path)
        .with_context(|| format!("failed to open cache {}", path.display()))?
        .with_diagnostics(move |diagnostic| {
            *sink.lock() = Some(diagnostic.error.to_string());
        });
    Ok((cache, failure))
}

fn check(failure: &Mutex<Option<String>>) -> Result<()> {
    match failure.lock().take() {
        Some(err) => anyhow::bail!("cache operation failed: {err}"),
        None => Ok(()),
    }
}

pub async fn put(config: &HaloConfig, key: &str, value: String) -> Result<()> {
    let (cache, failure) = open(config)?;
    cache.cache_resource(key, value).await;
    check(&failure)
}

pub async fn get(config: &HaloConfig, key: &str) -> Result<()> {
    let (cache, failure) = open(config)?;
    let payload = cache.read_cached_resource(key).await;
    check(&failure)?;

    match payload {
        Some(Payload::Text(text)) => println!("{text}"),
        Some(Payload::Bytes(bytes)) => println!("<{} bytes>", bytes.len()),
        None => eprintln!("{key}: not cached"),
    }
    Ok(())
}
