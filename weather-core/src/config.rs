use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::{
    model::Location,
    provider::open_meteo::{FORECAST_ENDPOINT, GEOCODING_ENDPOINT},
    units::UnitPreference,
};

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// suggestion_count = 5
///
/// [units]
/// temp = "fahrenheit"
/// speed = "mph"
/// precip = "inch"
///
/// [default_location]
/// name = "Berlin"
/// country = "Germany"
/// latitude = 52.52
/// longitude = 13.41
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Units applied on startup. Unknown values fall back to metric.
    pub units: UnitPreference,

    /// Location loaded before any search.
    pub default_location: Location,

    pub geocoding_url: String,
    pub forecast_url: String,

    /// HTTP timeout in seconds.
    pub timeout_secs: u64,

    /// Maximum number of candidates per search.
    pub suggestion_count: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            units: UnitPreference::METRIC,
            default_location: Location::berlin(),
            geocoding_url: GEOCODING_ENDPOINT.to_string(),
            forecast_url: FORECAST_ENDPOINT.to_string(),
            timeout_secs: 10,
            suggestion_count: 5,
        }
    }
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Invalid configuration TOML")
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

        tracing::info!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-now", "weather-now")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
