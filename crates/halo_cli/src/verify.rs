//! `halo verify` command

use anyhow::{Context, Result};
use halo_app::HaloConfig;
use halo_verify::{start_polling, AccountId, HttpStatusSource, PollState, PollerConfig};
use std::sync::Arc;

pub async fn run(
    config: &HaloConfig,
    account: String,
    url: Option<String>,
    interval_ms: Option<u64>,
) -> Result<()> {
    let url = url
        .or_else(|| config.verification.status_url.clone())
        .context("no status endpoint: pass --url or set [verification].status_url")?;
    let poller_config = interval_ms
        .map(PollerConfig::with_interval_ms)
        .unwrap_or_else(|| config.poller_config());

    let account = AccountId::new(account);
    tracing::info!(%account, %url, "waiting for verification");

    let handle = start_polling(
        account.clone(),
        poller_config,
        Arc::new(HttpStatusSource::new(url)),
        || tracing::info!("reload requested"),
    );

    tokio::select! {
        state = handle.finished() => {
            if state == PollState::Verified {
                println!("{account} verified after {} checks", handle.check_count());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            handle.cancel();
            println!("{account} still pending after {} checks", handle.check_count());
        }
    }
    Ok(())
}
