//! CLI settings persisted as `config.toml` in the platform config directory.
//!
//! These are host-side settings (where to find the card config and the state
//! snapshot, HTTP timeouts). The card configuration itself is a separate file
//! whose path lives here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::platform;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub paths: PathsSettings,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub watch: WatchSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsSettings {
    /// Card configuration (TOML, flat key/value table).
    #[serde(default = "default_card_config")]
    pub card_config: PathBuf,
    /// State snapshot (JSON map or host state list).
    #[serde(default = "default_snapshot")]
    pub snapshot: PathBuf,
    /// Where `watch` writes the rendered card.
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchSettings {
    /// Snapshot poll interval for `watch`.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for PathsSettings {
    fn default() -> Self {
        Self {
            card_config: default_card_config(),
            snapshot: default_snapshot(),
            output: default_output(),
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

fn default_card_config() -> PathBuf {
    platform::config_dir().join("card.toml")
}

fn default_snapshot() -> PathBuf {
    platform::data_dir().join("states.json")
}

fn default_output() -> PathBuf {
    platform::data_dir().join("card.html")
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_interval_ms() -> u64 {
    1000
}

impl Settings {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load from `path`, writing defaults there first if it does not exist yet.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            let settings = Self::default();
            settings.save_to(path)?;
            return Ok(settings);
        }

        let content = std::fs::read_to_string(path)?;
        let settings: Self = toml::from_str(&content)?;
        Ok(settings)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}
