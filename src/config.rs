use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::warn;

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    pub csv: PathBuf,
    pub json: PathBuf,
    pub html: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    pub dir: PathBuf,
    pub max_entries: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub maintainer_name: String,
    pub maintainer_link: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotifyConfig {
    #[serde(default = "default_telegram_api")]
    pub api_base: String,
    pub bot_token: String,
    pub chat_id: String,
    pub title: String,
    pub dashboard_url: String,
    pub history_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub input: PathBuf,
    pub api_key: String,
    pub locale: String,
    pub request_delay_secs: f64,
    pub request_timeout_secs: u64,
    #[serde(default = "default_psi_endpoint")]
    pub psi_endpoint: String,
    pub output: OutputConfig,
    pub history: HistoryConfig,
    pub dashboard: DashboardConfig,
    pub notify: NotifyConfig,
}

fn default_psi_endpoint() -> String {
    crate::scoring::psi::PSI_ENDPOINT.to_string()
}

fn default_telegram_api() -> String {
    crate::notify::TELEGRAM_API.to_string()
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub config_hash: String,
}

pub fn load_config(path: Option<&Path>) -> Result<LoadedConfig> {
    let bytes: Vec<u8> = if let Some(p) = path {
        std::fs::read(p)?
    } else {
        include_bytes!("../config/default.yml").to_vec()
    };

    let mut config: Config = serde_yaml::from_slice(&bytes)?;
    if config.locale.trim().is_empty() {
        config.locale = "en".to_string();
    }

    let config_hash = hash_bytes(&bytes);

    Ok(LoadedConfig { config, config_hash })
}

impl Config {
    /// Apply environment-style overrides on top of the file values.
    ///
    /// `lookup` is usually `|k| std::env::var(k).ok()`; empty values count as unset.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("PSI_API_KEY") {
            self.api_key = v;
        }
        if let Some(v) = get("LOCALE") {
            self.locale = v.trim().to_string();
        }
        if let Some(v) = get("PSI_SLEEP_SECS") {
            match v.trim().parse::<f64>() {
                Ok(secs) if secs.is_finite() && secs >= 0.0 => self.request_delay_secs = secs,
                _ => warn!("ignoring invalid PSI_SLEEP_SECS={v}"),
            }
        }
        if let Some(v) = get("TELEGRAM_BOT_TOKEN") {
            self.notify.bot_token = v;
        }
        if let Some(v) = get("TELEGRAM_CHAT_ID") {
            self.notify.chat_id = v;
        }
        if let Some(v) = get("MAINTAINER_NAME") {
            self.dashboard.maintainer_name = v;
        }
        if let Some(v) = get("MAINTAINER_LINK") {
            self.dashboard.maintainer_link = v;
        }
        if let Some(v) = get("DASHBOARD_URL") {
            self.notify.dashboard_url = v;
        }
    }

    pub fn request_delay(&self) -> std::time::Duration {
        let secs = self.request_delay_secs;
        if secs.is_finite() && secs > 0.0 {
            std::time::Duration::from_secs_f64(secs)
        } else {
            std::time::Duration::ZERO
        }
    }
}

fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    hex::encode(digest)
}
