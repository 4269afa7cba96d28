use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Settings file read when `TECH_FEED_SETTINGS` is not set.
pub const DEFAULT_SETTINGS_PATH: &str = "tech-feed.toml";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the `*.json` feed source files
    pub config_dir: PathBuf,
    /// Store of items found by the collector and consumed by the publisher
    pub latest_items_path: PathBuf,
    pub output_dir: PathBuf,
    pub output_file: String,
    pub http: HttpSettings,
    pub endpoints: Endpoints,
    pub hatena: HatenaSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from("config"),
            latest_items_path: PathBuf::from("tmp/data/latest-items.json"),
            output_dir: PathBuf::from("tmp/publisher"),
            output_file: "newsletter.html".to_string(),
            http: HttpSettings::default(),
            endpoints: Endpoints::default(),
            hatena: HatenaSettings::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpSettings {
    pub user_agent: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: "TechFeedWeekly/1.0 (Feed Collector)".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Endpoints {
    pub github_api: String,
    pub hatena_hotentry: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            github_api: "https://api.github.com".to_string(),
            hatena_hotentry: "https://b.hatena.ne.jp/hotentry/it.rss".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HatenaSettings {
    pub enabled: bool,
}

impl Default for HatenaSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Settings {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Settings {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load settings from `path` if it exists, falling back to defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Resolve settings the way both binaries do: settings file, then
    /// environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var("TECH_FEED_SETTINGS")
            .unwrap_or_else(|_| DEFAULT_SETTINGS_PATH.to_string());
        let mut settings = Self::load_or_default(path)?;
        settings.apply_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("TECH_FEED_CONFIG_DIR") {
            self.config_dir = PathBuf::from(dir);
        }
        if let Some(path) = lookup("TECH_FEED_LATEST_ITEMS") {
            self.latest_items_path = PathBuf::from(path);
        }
        if let Some(dir) = lookup("TECH_FEED_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_file)
    }

    /// Parse settings from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
