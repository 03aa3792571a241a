//! Halo configuration file handling

use halo_optimize::{CriticalResource, OptimizerOptions};
use halo_theme::{ThemeMode, ThemeOptions};
use halo_verify::PollerConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Top-level Halo configuration (halo.toml)
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct HaloConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub verification: VerificationConfig,
    #[serde(default)]
    pub optimizer: OptimizerConfig,
}

/// Preference storage
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Preference file
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
    /// Prefix applied to every preference key
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("halo-preferences.json")
}

fn default_namespace() -> String {
    "halo".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            namespace: default_namespace(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ThemeConfig {
    /// Mode used when neither storage nor the OS has a preference
    #[serde(default)]
    pub fallback: ThemeMode,
    #[serde(default = "default_true")]
    pub suppress_transitions: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            fallback: ThemeMode::default(),
            suppress_transitions: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct VerificationConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Base URL of the status endpoint; the account id is appended
    #[serde(default)]
    pub status_url: Option<String>,
}

fn default_interval_ms() -> u64 {
    5000
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            status_url: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct OptimizerConfig {
    #[serde(default = "default_defer_delay_ms")]
    pub defer_delay_ms: u64,
    #[serde(default = "default_compositing_selector")]
    pub compositing_selector: String,
    /// URLs preloaded on mount
    #[serde(default)]
    pub critical_resources: Vec<String>,
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,
}

fn default_defer_delay_ms() -> u64 {
    2000
}

fn default_compositing_selector() -> String {
    ".animate".to_string()
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("halo-cache.redb")
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            defer_delay_ms: default_defer_delay_ms(),
            compositing_selector: default_compositing_selector(),
            critical_resources: Vec::new(),
            cache_path: default_cache_path(),
        }
    }
}

impl HaloConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        fs::write(path, self.to_toml()?).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn theme_options(&self) -> ThemeOptions {
        ThemeOptions {
            fallback: self.theme.fallback,
            suppress_transitions: self.theme.suppress_transitions,
        }
    }

    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig::with_interval_ms(self.verification.interval_ms)
    }

    pub fn optimizer_options(&self) -> OptimizerOptions {
        OptimizerOptions {
            compositing_selector: self.optimizer.compositing_selector.clone(),
            critical_resources: self
                .optimizer
                .critical_resources
                .iter()
                .map(|href| CriticalResource::infer(href.as_str()))
                .collect(),
            defer_delay: Duration::from_millis(self.optimizer.defer_delay_ms),
        }
    }
}
