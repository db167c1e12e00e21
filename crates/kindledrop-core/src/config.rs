use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::downloader::{default_user_agent, DownloadBudget, DownloaderOptions};

/// Global configuration loaded from `~/.config/kindledrop/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindledropConfig {
    /// Default byte budget per fetch when a request does not carry one.
    pub max_bytes: u64,
    pub connect_timeout_secs: u64,
    /// Whole-request deadline, body included.
    pub request_timeout_secs: u64,
    /// Redirect hops followed after the initial request.
    pub max_redirects: u32,
    /// Overrides the `kindledrop/<version>` User-Agent.
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Parent directory for per-fetch staging dirs (system temp dir if unset).
    #[serde(default)]
    pub staging_dir: Option<PathBuf>,
    /// Where `send` drops delivered documents (current directory if unset).
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

impl Default for KindledropConfig {
    fn default() -> Self {
        Self {
            max_bytes: DownloadBudget::DEFAULT_MAX_BYTES,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            max_redirects: 5,
            user_agent: None,
            staging_dir: None,
            output_dir: None,
        }
    }
}

impl KindledropConfig {
    pub fn downloader_options(&self) -> DownloaderOptions {
        DownloaderOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_redirects: self.max_redirects,
            user_agent: self
                .user_agent
                .clone()
                .filter(|ua| !ua.trim().is_empty())
                .unwrap_or_else(default_user_agent),
            staging_root: self.staging_dir.clone(),
        }
    }

    /// Default budget; a zero `max_bytes` is a configuration error.
    pub fn budget(&self) -> Result<DownloadBudget> {
        DownloadBudget::new(self.max_bytes).context("config: max_bytes")
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("kindledrop")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<KindledropConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = KindledropConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: KindledropConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
