//! Configuration file handling.
//!
//! Settings live in an INI file at `~/.packmixer/config.ini`:
//!
//! ```ini
//! [paths]
//! mix_dir = /home/me/.packmixer/MixDir
//! output_dir = /home/me/.minecraft/resourcepacks/Mixed
//! cache_file = mix_map.bin
//! ; log_dir = /home/me/.packmixer/logs
//!
//! [scan]
//! parallel = true
//!
//! [logging]
//! level = info
//! ```
//!
//! A missing file yields defaults. Unknown keys are ignored.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::Ini;
use thiserror::Error;

use crate::index::DEFAULT_CACHE_FILE;

/// Configuration directory name under the home directory.
const CONFIG_DIR: &str = ".packmixer";

/// Configuration file name.
const CONFIG_FILE: &str = "config.ini";

/// Errors that can occur while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read or parsed.
    #[error("failed to read config {}: {reason}", .path.display())]
    Read { path: PathBuf, reason: String },

    /// The configuration file could not be written.
    #[error("failed to write config {}: {reason}", .path.display())]
    Write { path: PathBuf, reason: String },

    /// A value could not be parsed.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// The key is not a known `section.key` name.
    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),
}

/// Path settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathsSettings {
    /// Directory holding one folder per resource pack.
    pub mix_dir: PathBuf,

    /// Directory the game client reads the mixed textures from.
    pub output_dir: PathBuf,

    /// Cache file name, relative to `mix_dir`.
    pub cache_file: String,

    /// Optional directory for log files.
    pub log_dir: Option<PathBuf>,
}

/// Scan settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSettings {
    /// Scan packs concurrently.
    pub parallel: bool,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Default log level filter (e.g. `info`, `packmixer=debug`).
    pub level: String,
}

/// Contents of the configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub paths: PathsSettings,
    pub scan: ScanSettings,
    pub logging: LoggingSettings,
}

impl Default for ConfigFile {
    fn default() -> Self {
        let base = config_dir();
        Self {
            paths: PathsSettings {
                mix_dir: base.join("MixDir"),
                output_dir: base.join("OutDir"),
                cache_file: DEFAULT_CACHE_FILE.to_string(),
                log_dir: None,
            },
            scan: ScanSettings { parallel: true },
            logging: LoggingSettings {
                level: "info".to_string(),
            },
        }
    }
}

/// Get the configuration directory (`~/.packmixer`).
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
}

/// Get the configuration file path.
pub fn config_file_path() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}

impl ConfigFile {
    /// Load from the default location, falling back to defaults if absent.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from a specific file, falling back to defaults if absent.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Self::from_ini(&ini)
    }

    /// Build a configuration from parsed INI data.
    pub fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for key in ConfigKey::all() {
            if let Some(value) = ini
                .section(Some(key.section()))
                .and_then(|s| s.get(key.key_name()))
            {
                key.set(&mut config, value)?;
            }
        }

        Ok(config)
    }

    /// Convert to INI data.
    pub fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            let value = key.get(self);
            if !value.is_empty() {
                ini.with_section(Some(key.section()))
                    .set(key.key_name(), value);
            }
        }
        ini
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Save to a specific file, creating its directory.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_failed = |reason: String| ConfigError::Write {
            path: path.to_path_buf(),
            reason,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| write_failed(e.to_string()))?;
        }

        self.to_ini()
            .write_to_file(path)
            .map_err(|e| write_failed(e.to_string()))
    }

    /// Full path of the index cache file.
    pub fn cache_path(&self) -> PathBuf {
        self.paths.mix_dir.join(&self.paths.cache_file)
    }
}

/// A configuration setting addressable as `section.key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    MixDir,
    OutputDir,
    CacheFile,
    LogDir,
    ScanParallel,
    LoggingLevel,
}

impl ConfigKey {
    /// All keys, grouped by section.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::MixDir,
            ConfigKey::OutputDir,
            ConfigKey::CacheFile,
            ConfigKey::LogDir,
            ConfigKey::ScanParallel,
            ConfigKey::LoggingLevel,
        ]
    }

    /// INI section name.
    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::MixDir | ConfigKey::OutputDir | ConfigKey::CacheFile | ConfigKey::LogDir => {
                "paths"
            }
            ConfigKey::ScanParallel => "scan",
            ConfigKey::LoggingLevel => "logging",
        }
    }

    /// Key name within the section.
    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::MixDir => "mix_dir",
            ConfigKey::OutputDir => "output_dir",
            ConfigKey::CacheFile => "cache_file",
            ConfigKey::LogDir => "log_dir",
            ConfigKey::ScanParallel => "parallel",
            ConfigKey::LoggingLevel => "level",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Read the current value as a string (empty if unset).
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::MixDir => config.paths.mix_dir.display().to_string(),
            ConfigKey::OutputDir => config.paths.output_dir.display().to_string(),
            ConfigKey::CacheFile => config.paths.cache_file.clone(),
            ConfigKey::LogDir => config
                .paths
                .log_dir
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            ConfigKey::ScanParallel => config.scan.parallel.to_string(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
        }
    }

    /// Parse and store a value.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        let invalid = |reason: &str| ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.to_string(),
        };

        match self {
            ConfigKey::MixDir | ConfigKey::OutputDir => {
                if value.is_empty() {
                    return Err(invalid("path must not be empty"));
                }
                let path = expand_tilde(value);
                if *self == ConfigKey::MixDir {
                    config.paths.mix_dir = path;
                } else {
                    config.paths.output_dir = path;
                }
            }
            ConfigKey::CacheFile => {
                if value.is_empty() || value.contains(['/', '\\']) {
                    return Err(invalid("expected a plain file name"));
                }
                config.paths.cache_file = value.to_string();
            }
            ConfigKey::LogDir => {
                config.paths.log_dir = if value.is_empty() {
                    None
                } else {
                    Some(expand_tilde(value))
                };
            }
            ConfigKey::ScanParallel => {
                config.scan.parallel = parse_bool(value).ok_or_else(|| invalid("expected true or false"))?;
            }
            ConfigKey::LoggingLevel => {
                if value.is_empty() {
                    return Err(invalid("level must not be empty"));
                }
                config.logging.level = value.to_string();
            }
        }

        Ok(())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::all()
            .iter()
            .copied()
            .find(|k| k.name() == s)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn expand_tilde(value: &str) -> PathBuf {
    match value.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|h| h.join(rest))
            .unwrap_or_else(|| PathBuf::from(value)),
        None => PathBuf::from(value),
    }
}
