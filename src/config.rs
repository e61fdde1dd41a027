//! Application settings and configuration

use crate::protocol::DEFAULT_ENDPOINT;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application settings
///
/// Stored as JSON. Every field has a default, so a partial file is fine.
///
/// # Example
/// ```rust,no_run
/// use concierge::config::Settings;
///
/// // Load settings (returns default if file doesn't exist)
/// let settings = Settings::load("settings.json").expect("Failed to load");
/// println!("Endpoint: {}", settings.endpoint);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// WebSocket URL of the assistant backend
    pub endpoint: String,
    /// Seconds between simulated status checks
    pub status_check_interval_secs: u64,
    /// Chance of a simulated offline period at each check
    pub offline_probability: f64,
    /// Shortest simulated offline period in milliseconds
    pub offline_min_ms: u64,
    /// Longest simulated offline period in milliseconds
    pub offline_max_ms: u64,
    /// Directory conversation exports are written to
    pub export_dir: PathBuf,
    /// Start with the dark theme
    pub dark_theme: bool,
    /// Delay before the view follows a newly appended message, in milliseconds
    pub scroll_delay_ms: u64,
}

impl Settings {
    /// Load settings from a JSON file
    ///
    /// # Returns
    /// The loaded settings, or default settings if the file doesn't exist or is empty
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let data = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read settings: {}", e)))?;

        if data.trim().is_empty() {
            return Ok(Self::default());
        }

        let settings: Self = serde_json::from_str(&data)
            .map_err(|e| Error::Config(format!("Failed to parse settings: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a JSON file, creating parent directories as needed
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create settings directory: {}", e)))?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(path, json)
            .map_err(|e| Error::Config(format!("Failed to write settings: {}", e)))?;

        Ok(())
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if !self.endpoint.starts_with("ws://") && !self.endpoint.starts_with("wss://") {
            return Err(Error::Config(format!(
                "Endpoint must be a ws:// or wss:// URL, got {}",
                self.endpoint
            )));
        }
        if !(0.0..=1.0).contains(&self.offline_probability) {
            return Err(Error::Config(format!(
                "offline_probability must be within [0, 1], got {}",
                self.offline_probability
            )));
        }
        if self.offline_min_ms > self.offline_max_ms {
            return Err(Error::Config(format!(
                "offline_min_ms ({}) exceeds offline_max_ms ({})",
                self.offline_min_ms, self.offline_max_ms
            )));
        }
        if self.status_check_interval_secs == 0 {
            return Err(Error::Config(
                "status_check_interval_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Default settings file location: `<config dir>/concierge/settings.json`
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

        Ok(config_dir.join("concierge").join("settings.json"))
    }

    /// Directory for the log file: `<data dir>/concierge`
    pub fn data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| Error::Config("Could not determine data directory".to_string()))?;

        Ok(data_dir.join("concierge"))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            status_check_interval_secs: 30,
            offline_probability: 0.05,
            offline_min_ms: 1000,
            offline_max_ms: 3000,
            export_dir: PathBuf::from("."),
            dark_theme: false,
            scroll_delay_ms: 100,
        }
    }
}
