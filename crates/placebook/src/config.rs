//! Configuration management for placebook.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sync::FailurePolicy;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "placebook";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "places.db";

/// Largest zoom level the static map API accepts.
const MAX_ZOOM: u8 = 21;

/// Largest preview edge, in pixels, the static map API serves.
const MAX_PREVIEW_EDGE: u32 = 640;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `PLACEBOOK_`)
/// 2. TOML config file at `~/.config/placebook/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Cache synchronization configuration.
    pub sync: SyncConfig,
    /// Maps and geocoding configuration.
    pub maps: MapsConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/placebook/places.db`
    pub database_path: Option<PathBuf>,
}

/// Synchronization-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Whether store failures are returned to the user or only logged.
    pub failure_policy: FailurePolicy,
}

/// Maps-related configuration (reverse geocoding and map previews).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapsConfig {
    /// Google Maps API key. Geocoding is unavailable without one.
    pub api_key: Option<String>,
    /// Reverse geocoding endpoint.
    pub geocode_endpoint: String,
    /// Static map image endpoint.
    pub static_map_endpoint: String,
    /// Timeout for map service requests, in seconds.
    pub request_timeout_secs: u64,
    /// Zoom level of the preview image.
    pub zoom: u8,
    /// Preview width in pixels.
    pub preview_width: u32,
    /// Preview height in pixels.
    pub preview_height: u32,
    /// Map style, e.g. `roadmap` or `satellite`.
    pub map_type: String,
}

impl MapsConfig {
    /// Timeout for map service requests.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            geocode_endpoint: "https://maps.googleapis.com/maps/api/geocode/json".to_string(),
            static_map_endpoint: "https://maps.googleapis.com/maps/api/staticmap".to_string(),
            request_timeout_secs: 10,
            zoom: 14,
            preview_width: 400,
            preview_height: 200,
            map_type: "roadmap".to_string(),
        }
    }
}

/// Map styles the static map API understands.
const MAP_TYPES: &[&str] = &["roadmap", "satellite", "terrain", "hybrid"];

impl Config {
    /// Load configuration, reading the TOML file at `config_path` or the
    /// default location.
    ///
    /// Sources, later overriding earlier: defaults, the TOML file (if it
    /// exists), then `PLACEBOOK_`-prefixed environment variables with `__`
    /// between section and key (`PLACEBOOK_MAPS__API_KEY`).
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("PLACEBOOK_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let maps = &self.maps;

        if maps.zoom > MAX_ZOOM {
            return Err(Error::ConfigValidation {
                message: format!("maps.zoom ({}) must be between 0 and {MAX_ZOOM}", maps.zoom),
            });
        }

        for (name, value) in [
            ("preview_width", maps.preview_width),
            ("preview_height", maps.preview_height),
        ] {
            if value == 0 || value > MAX_PREVIEW_EDGE {
                return Err(Error::ConfigValidation {
                    message: format!(
                        "maps.{name} ({value}) must be between 1 and {MAX_PREVIEW_EDGE}"
                    ),
                });
            }
        }

        if !MAP_TYPES.contains(&maps.map_type.as_str()) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "maps.map_type must be one of {}, got '{}'",
                    MAP_TYPES.join(", "),
                    maps.map_type
                ),
            });
        }

        if maps.request_timeout_secs == 0 {
            return Err(Error::ConfigValidation {
                message: "maps.request_timeout_secs must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Whether an API key is available for geocoding.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.maps
            .api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }
}
