use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf};

use crate::model::UnitSystem;

pub const DEFAULT_BASE_URL: &str =
    "https://weather.visualcrossing.com/VisualCrossingWebServices/rest/services";

pub const ENV_API_KEY: &str = "FORECAST_API_KEY";
pub const ENV_UNIT_SYSTEM: &str = "FORECAST_UNIT_SYSTEM";
pub const ENV_BASE_URL: &str = "FORECAST_BASE_URL";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// unit_system = "metric"
/// default_location = "Lisbon"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Visual Crossing API key.
    pub api_key: Option<String>,

    pub unit_system: UnitSystem,

    /// Provider endpoint up to (not including) `/timeline`.
    pub base_url: String,

    /// Location used when none is given on the command line.
    pub default_location: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            unit_system: UnitSystem::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            default_location: None,
        }
    }
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Config file contents with environment overrides applied on top.
    pub fn resolve() -> Result<Self> {
        let mut cfg = Self::load()?;
        cfg.apply_overrides(|name| env::var(name).ok())?;
        Ok(cfg)
    }

    /// Apply `FORECAST_*` overrides read through `lookup`. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_API_KEY) {
            self.api_key = Some(key);
        }

        if let Some(units) = get(ENV_UNIT_SYSTEM) {
            self.unit_system = units
                .parse()
                .with_context(|| format!("Invalid {ENV_UNIT_SYSTEM} value"))?;
        }

        if let Some(url) = get(ENV_BASE_URL) {
            self.base_url = url;
        }

        Ok(())
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
        let dirs = ProjectDirs::from("dev", "weekday-forecast", "forecast-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// The configured API key, or an error explaining how to set one.
    pub fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No API key configured.\n\
                     Hint: run `forecast configure` or set {ENV_API_KEY}."
                )
            })
    }

    /// Location to use when the caller gives none.
    pub fn location_or_default(&self, explicit: Option<String>) -> String {
        explicit
            .or_else(|| self.default_location.clone())
            .unwrap_or_else(|| crate::model::Selection::default().location)
    }
}
