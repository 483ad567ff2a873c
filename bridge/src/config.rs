//! Configuration for the KingsRow bridge.
//!
//! Runtime tunables come from an optional JSON file (the `config.json`
//! written by the installer). Every field has a default, so a missing file
//! is not an error. Paths are resolved with environment-variable overrides
//! in the same style for every binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use desktop::{AutomationSettings, DetectionSettings};
use engine::EngineSettings;
use serde::Deserialize;

/// Default relay listen address.
const DEFAULT_RELAY_ADDR: &str = "127.0.0.1:8123";

/// Directory under the platform config/data dirs.
const APP_DIR: &str = "kingsrow-bridge";

const CONFIG_FILE: &str = "config.json";
const CALIBRATION_FILE: &str = "checkerboard_calibration.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Engine executable, tried after `KINGSROW_PATH`.
    pub kingsrow_path: Option<PathBuf>,
    /// Milliseconds between playing a move on the desktop and reading the reply.
    pub auto_play_delay: u64,
    /// Milliseconds between detection passes.
    pub detection_interval: u64,
    /// Detection passes before giving up on a reply.
    pub detection_attempts: u32,
    pub debug_mode: bool,
    pub log_level: String,
    pub settle_delay_ms: u64,
    pub direct_timeout_secs: u64,
    pub file_timeout_secs: u64,
    pub calibration_path: Option<PathBuf>,
    /// Refuse to click when the board window cannot be found.
    pub require_window: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            kingsrow_path: None,
            auto_play_delay: 1000,
            detection_interval: 500,
            detection_attempts: 3,
            debug_mode: false,
            log_level: "info".to_string(),
            settle_delay_ms: 2000,
            direct_timeout_secs: 10,
            file_timeout_secs: 15,
            calibration_path: None,
            require_window: false,
        }
    }
}

impl BridgeConfig {
    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Like [`load`](Self::load), but an unreadable or malformed file falls
    /// back to the defaults. The error is handed back so it can be logged
    /// once logging is up.
    pub fn load_or_default(path: &Path) -> (Self, Option<ConfigError>) {
        match Self::load(path) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Filter directive for the log subscriber.
    pub fn log_filter(&self) -> String {
        if self.debug_mode {
            return "debug".to_string();
        }
        let level = self.log_level.trim().to_ascii_lowercase();
        match level.as_str() {
            "" => "info".to_string(),
            // Python-style level names from older installers.
            "warning" => "warn".to_string(),
            "critical" => "error".to_string(),
            _ => level,
        }
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            direct_timeout: Duration::from_secs(self.direct_timeout_secs),
            file_timeout: Duration::from_secs(self.file_timeout_secs),
            ..EngineSettings::default()
        }
    }

    pub fn automation_settings(&self) -> AutomationSettings {
        AutomationSettings {
            require_window: self.require_window,
            ..AutomationSettings::default()
        }
    }

    pub fn detection_settings(&self) -> DetectionSettings {
        DetectionSettings::default()
    }

    pub fn play_delay(&self) -> Duration {
        Duration::from_millis(self.auto_play_delay)
    }

    pub fn detection_interval(&self) -> Duration {
        Duration::from_millis(self.detection_interval)
    }
}

/// Get the config file path.
///
/// Priority:
/// 1. `KINGSROW_BRIDGE_CONFIG` env variable if set
/// 2. `<config dir>/kingsrow-bridge/config.json` if a config dir exists
/// 3. `./config.json` as fallback
pub fn get_config_path() -> PathBuf {
    if let Ok(path) = std::env::var("KINGSROW_BRIDGE_CONFIG") {
        return PathBuf::from(path);
    }

    if let Some(dir) = dirs::config_dir() {
        return dir.join(APP_DIR).join(CONFIG_FILE);
    }

    PathBuf::from(CONFIG_FILE)
}

/// Get the directory for rolling log files.
///
/// Priority:
/// 1. `KINGSROW_BRIDGE_LOG_DIR` env variable if set
/// 2. `<local data dir>/kingsrow-bridge/logs`
/// 3. `./logs` as fallback
pub fn get_log_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("KINGSROW_BRIDGE_LOG_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(dir) = dirs::data_local_dir() {
        return dir.join(APP_DIR).join("logs");
    }

    PathBuf::from("logs")
}

/// Get the calibration file path.
///
/// Priority:
/// 1. `KINGSROW_CALIBRATION` env variable if set
/// 2. `calibration_path` from the config file
/// 3. `./checkerboard_calibration.json` if it exists
/// 4. `<config dir>/kingsrow-bridge/checkerboard_calibration.json`
pub fn get_calibration_path(config: &BridgeConfig) -> PathBuf {
    if let Ok(path) = std::env::var("KINGSROW_CALIBRATION") {
        return PathBuf::from(path);
    }

    if let Some(path) = &config.calibration_path {
        return path.clone();
    }

    let local = PathBuf::from(CALIBRATION_FILE);
    if local.is_file() {
        return local;
    }

    match dirs::config_dir() {
        Some(dir) => dir.join(APP_DIR).join(CALIBRATION_FILE),
        None => local,
    }
}

/// Get the relay listen address.
///
/// Priority:
/// 1. `KINGSROW_RELAY_ADDR` env variable if set
/// 2. `127.0.0.1:8123` as fallback
pub fn get_relay_addr() -> String {
    if let Ok(addr) = std::env::var("KINGSROW_RELAY_ADDR") {
        return addr;
    }

    DEFAULT_RELAY_ADDR.to_string()
}
