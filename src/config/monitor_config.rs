//! Monitor Configuration - thresholds and service settings as TOML values
//!
//! Every struct implements `Default` with the clinical defaults, so a missing
//! file or section changes nothing.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;
use crate::types::ChannelBands;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for one monitor deployment.
///
/// Load with `MonitorConfig::load()` which searches:
/// 1. `$DPN_CONFIG` env var
/// 2. `./monitor_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Clinical bands per channel
    #[serde(default)]
    pub bands: ChannelBands,

    /// Trend window
    #[serde(default)]
    pub history: HistoryConfig,

    /// Device control defaults
    #[serde(default)]
    pub control: ControlConfig,

    /// Text-generation backend
    #[serde(default)]
    pub narrative: NarrativeConfig,

    /// Reading persistence
    #[serde(default)]
    pub storage: StorageConfig,
}

impl MonitorConfig {
    /// Load configuration using the standard search order:
    /// 1. `$DPN_CONFIG` environment variable
    /// 2. `./monitor_config.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(defaults::CONFIG_PATH_ENV) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded monitor config from DPN_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from DPN_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "DPN_CONFIG points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from("monitor_config.toml");
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded monitor config from ./monitor_config.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./monitor_config.toml, using defaults");
                }
            }
        }

        info!("No monitor_config.toml found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate TOML text. Unknown keys only produce warnings.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }
        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        for w in super::validation::validate_band_plausibility(&config) {
            warn!("{}", w);
        }
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Monitor config saved");
        Ok(())
    }

    /// Validate for internal consistency. All problems are collected.
    ///
    /// Rules:
    /// - Bands must be finite with `min < max` and `safe` inside `[min, max]`
    /// - History capacity must be within `1..=HISTORY_WINDOW_SIZE`
    /// - Control defaults must be a valid command and duration
    /// - Narrative timeout must be positive
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        for channel in crate::types::Channel::ALL {
            errors.extend(
                self.bands
                    .get(channel)
                    .check(&format!("bands.{}", channel.name())),
            );
        }

        let cap = self.history.capacity;
        if !(1..=defaults::HISTORY_WINDOW_SIZE).contains(&cap) {
            errors.push(format!(
                "history.capacity = {cap} must be within [1, {}]",
                defaults::HISTORY_WINDOW_SIZE
            ));
        }

        if !matches!(self.control.default_power.as_str(), "ON" | "OFF") {
            errors.push(format!(
                "control.default_power = '{}' must be 'ON' or 'OFF'",
                self.control.default_power
            ));
        }
        let d = self.control.default_vibration_duration_ms;
        if !(defaults::MIN_VIBRATION_DURATION_MS..=defaults::MAX_VIBRATION_DURATION_MS).contains(&d)
        {
            errors.push(format!(
                "control.default_vibration_duration_ms = {d} must be within [{}, {}]",
                defaults::MIN_VIBRATION_DURATION_MS,
                defaults::MAX_VIBRATION_DURATION_MS
            ));
        }

        if self.narrative.timeout_secs == 0 {
            errors.push("narrative.timeout_secs must be > 0".to_string());
        }

        if self.storage.backend == StorageBackend::Sled && self.storage.path.trim().is_empty() {
            errors.push("storage.path must be set when storage.backend = 'sled'".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Sections
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server bind address.
    ///
    /// Can be overridden by `DPN_SERVER_ADDR` env var or `--addr` CLI flag.
    #[serde(default = "default_server_addr")]
    pub addr: String,
}

fn default_server_addr() -> String {
    defaults::DEFAULT_SERVER_ADDR.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Points kept per trended channel
    #[serde(default = "default_history_capacity")]
    pub capacity: usize,
}

fn default_history_capacity() -> usize {
    defaults::HISTORY_WINDOW_SIZE
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_history_capacity(),
        }
    }
}

/// Control state at process start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlConfig {
    /// `"ON"` or `"OFF"`
    #[serde(default = "default_power")]
    pub default_power: String,

    #[serde(default = "default_vibration_duration")]
    pub default_vibration_duration_ms: u32,
}

fn default_power() -> String {
    "ON".to_string()
}
fn default_vibration_duration() -> u32 {
    defaults::MIN_VIBRATION_DURATION_MS
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            default_power: default_power(),
            default_vibration_duration_ms: default_vibration_duration(),
        }
    }
}

/// Gemini-compatible `generateContent` backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativeConfig {
    /// Base URL, without the `/models/...` suffix
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Name of the environment variable holding the API key. The key itself
    /// never lives in the file.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    defaults::NARRATIVE_ENDPOINT.to_string()
}
fn default_model() -> String {
    defaults::NARRATIVE_MODEL.to_string()
}
fn default_api_key_env() -> String {
    defaults::NARRATIVE_API_KEY_ENV.to_string()
}
fn default_timeout_secs() -> u64 {
    defaults::NARRATIVE_TIMEOUT_SECS
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl NarrativeConfig {
    /// API key from the configured environment variable, if set and non-empty.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Sled,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::Sled => write!(f, "sled"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Database directory for the sled backend
    #[serde(default = "default_store_path")]
    pub path: String,
}

fn default_store_path() -> String {
    defaults::DEFAULT_STORE_PATH.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_store_path(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
