use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::model::{DEFAULT_REPORT_LENGTH, ForecastStyle};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_ERROR_DISMISS_SECS: u64 = 5;

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// base_url = "http://localhost:8000"
/// style = "balanced"
/// default_report_length = 200
/// error_dismiss_secs = 5
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Forecast server root; the endpoint path is appended to it.
    pub base_url: String,
    pub style: ForecastStyle,
    pub default_report_length: u32,
    /// How long an error banner stays up.
    pub error_dismiss_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            style: ForecastStyle::default(),
            default_report_length: DEFAULT_REPORT_LENGTH,
            error_dismiss_secs: DEFAULT_ERROR_DISMISS_SECS,
        }
    }
}

impl Config {
    pub fn error_dismiss_after(&self) -> Duration {
        Duration::from_secs(self.error_dismiss_secs)
    }

    /// Full URL of the forecast endpoint.
    pub fn forecast_url(&self) -> String {
        format!("{}/api/generate_forecast", self.base_url.trim_end_matches('/'))
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "atmos", "atmos-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
