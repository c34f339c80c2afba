use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_NAME: &str = "lectern.config.json";

/// Lectern configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Base url of the lesson API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Page used when `--page` is not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,

    /// Default tracing filter; `RUST_LOG` wins when set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Config {
    pub fn path(cwd: &Path) -> PathBuf {
        cwd.join(DEFAULT_CONFIG_NAME)
    }

    /// Load config from a directory, falling back to defaults
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = Self::path(cwd);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("reading {}", config_path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("parsing {}", config_path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Apply command-line overrides
    pub fn with_overrides(mut self, api_url: Option<String>, page_id: Option<String>) -> Self {
        if let Some(url) = api_url {
            self.api_url = url;
        }
        if page_id.is_some() {
            self.page_id = page_id;
        }
        self
    }

    pub fn page(&self) -> anyhow::Result<&str> {
        self.page_id
            .as_deref()
            .ok_or_else(|| anyhow!("No page selected; pass --page or set pageId in {}", DEFAULT_CONFIG_NAME))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            page_id: None,
            log_level: default_log_level(),
            request_timeout_secs: default_timeout(),
        }
    }
}
