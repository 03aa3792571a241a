//! Halo CLI
//!
//! Inspect and change the stored theme preference, run the verification
//! poller against a status endpoint, and read or write the resource cache.

mod cache;
mod theme;
mod verify;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use halo_app::HaloConfig;
use halo_theme::ThemeMode;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "halo")]
#[command(version, about = "Halo client runtime tools", long_about = None)]
struct Cli {
    /// Path to halo.toml
    #[arg(short, long, global = true, default_value = "halo.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read or change the stored theme
    Theme {
        #[command(subcommand)]
        action: ThemeAction,

        /// OS color-scheme preference to assume (light or dark)
        #[arg(long, global = true)]
        prefers: Option<ThemeMode>,
    },

    /// Poll the status endpoint until the account is verified
    Verify {
        /// Account to check
        #[arg(short, long)]
        account: String,

        /// Status endpoint base URL (overrides [verification].status_url)
        #[arg(long)]
        url: Option<String>,

        /// Delay between checks in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,
    },

    /// Read or write the resource cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Show or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ThemeAction {
    /// Print the active theme
    Get,
    /// Store an explicit theme
    Set { mode: ThemeMode },
    /// Switch between light and dark
    Toggle,
    /// Forget the stored theme and follow the OS again
    Clear,
    /// Print the style variables as CSS
    Css {
        /// Only this mode (default: both)
        #[arg(long)]
        mode: Option<ThemeMode>,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Store a text payload
    Put { key: String, value: String },
    /// Print a cached payload
    Get { key: String },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Commands::Config {
        action: ConfigAction::Init { force },
    } = &cli.command
    {
        return init_config(&cli.config, *force);
    }

    let config = HaloConfig::load_or_default(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    match cli.command {
        Commands::Theme { action, prefers } => {
            let prefers_dark = prefers.map(|mode| mode == ThemeMode::Dark);
            match action {
                ThemeAction::Get => theme::get(&config, prefers_dark),
                ThemeAction::Set { mode } => theme::set(&config, prefers_dark, mode),
                ThemeAction::Toggle => theme::toggle(&config, prefers_dark),
                ThemeAction::Clear => theme::clear(&config, prefers_dark),
                ThemeAction::Css { mode } => {
                    theme::css(mode);
                    Ok(())
                }
            }
        }
        Commands::Verify {
            account,
            url,
            interval_ms,
        } => verify::run(&config, account, url, interval_ms).await,
        Commands::Cache { action } => match action {
            CacheAction::Put { key, value } => cache::put(&config, &key, value).await,
            CacheAction::Get { key } => cache::get(&config, &key).await,
        },
        Commands::Config { .. } => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    HaloConfig::default().save(path)?;
    println!("wrote {}", path.display());
    Ok(())
}
