//! Configuration loading and typed config structures for the world clock.
//!
//! The configuration lives in `worldclock-config.yaml` next to the binary's
//! working directory. Every field has a default, so an empty or missing file
//! yields a working setup with the nine built-in cities.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use worldclock_store::DEFAULT_NAMESPACE;
use worldclock_types::{EntryId, HexColor, TimezoneEntry};

/// Environment variable that overrides `storage.path`.
pub const STORAGE_PATH_ENV: &str = "WORLDCLOCK_STORAGE_PATH";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but holds an unusable value.
    #[error("invalid config: {reason}")]
    Invalid {
        /// Which value was rejected and why.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// Tick timing and the built-in city list.
    #[serde(default)]
    pub clock: ClockConfig,

    /// Where preferences are stored.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `WORLDCLOCK_STORAGE_PATH` overrides `storage.path` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is unusable.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse_yaml(&contents)?;
        config.storage.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Check values that parse but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a zero tick interval or an
    /// empty storage path.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.clock.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                reason: "clock.tick_interval_ms must be positive".to_owned(),
            });
        }
        if self.storage.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                reason: "storage.path must not be empty".to_owned(),
            });
        }
        Ok(())
    }

    /// Parse configuration from a YAML string, without env overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Self::parse_yaml(yaml)
    }

    fn parse_yaml(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yml maps an empty document to unit, not to an empty mapping.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// Tick timing and built-in entries.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClockConfig {
    /// Milliseconds between ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Built-in entries, fixed for the lifetime of the process.
    #[serde(default = "default_builtin_zones")]
    pub builtin_zones: Vec<TimezoneEntry>,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            builtin_zones: default_builtin_zones(),
        }
    }
}

/// Preference storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// Path of the JSON preference file.
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,

    /// Prefix for every preference key.
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl StorageConfig {
    /// Override the preference path with `WORLDCLOCK_STORAGE_PATH` when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(STORAGE_PATH_ENV) {
            self.path = PathBuf::from(val);
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            namespace: default_namespace(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

const fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("worldclock-prefs.json")
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_owned()
}

fn default_log_level() -> String {
    "info".to_owned()
}

/// The nine cities shown out of the box, in display order.
pub fn default_builtin_zones() -> Vec<TimezoneEntry> {
    const SEED: [(&str, &str, &str, &str, &str, &str); 9] = [
        ("new-york", "America/New_York", "\u{1f1fa}\u{1f1f8}", "New York", "USA", "#ff6b9d"),
        (
            "los-angeles",
            "America/Los_Angeles",
            "\u{1f1fa}\u{1f1f8}",
            "Los Angeles",
            "USA",
            "#c084fc",
        ),
        ("london", "Europe/London", "\u{1f1ec}\u{1f1e7}", "London", "UK", "#60a5fa"),
        ("paris", "Europe/Paris", "\u{1f1eb}\u{1f1f7}", "Paris", "France", "#34d399"),
        ("tokyo", "Asia/Tokyo", "\u{1f1ef}\u{1f1f5}", "Tokyo", "Japan", "#fbbf24"),
        ("dubai", "Asia/Dubai", "\u{1f1e6}\u{1f1ea}", "Dubai", "UAE", "#f87171"),
        ("sydney", "Australia/Sydney", "\u{1f1e6}\u{1f1fa}", "Sydney", "Australia", "#a78bfa"),
        (
            "sao-paulo",
            "America/Sao_Paulo",
            "\u{1f1e7}\u{1f1f7}",
            "S\u{e3}o Paulo",
            "Brazil",
            "#fb923c",
        ),
        ("shanghai", "Asia/Shanghai", "\u{1f1e8}\u{1f1f3}", "Shanghai", "China", "#22d3ee"),
    ];

    SEED.iter()
        .filter_map(|(id, zone, flag, city, country, color)| {
            let accent_color = HexColor::parse(color).ok()?;
            Some(TimezoneEntry {
                id: EntryId::from(*id),
                timezone_name: (*zone).to_owned(),
                display_flag: (*flag).to_owned(),
                city: (*city).to_owned(),
                country: (*country).to_owned(),
                accent_color,
            })
        })
        .collect()
}
