//! Optional ~/.vdm/config.yaml with generator and parser defaults.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dsl::vocab::{Ip, Unit, UnknownWord};
use crate::generator::SequenceGenerator;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file at {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("invalid value in config file at {path}: {source}")]
    Invalid { path: PathBuf, source: UnknownWord },

    #[error("failed to write config file at {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// Settings loaded from ~/.vdm/config.yaml. Every field is optional.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Interaction point generated trims target.
    #[serde(default = "Config::default_ip")]
    pub ip: String,
    /// Unit of generated trim amounts.
    #[serde(default = "Config::default_unit")]
    pub unit: String,
    /// Seconds between generated samples.
    #[serde(default = "Config::default_wait_time")]
    pub wait_time: f64,
    /// Number of samples taken from generator functions.
    #[serde(default = "Config::default_step_count")]
    pub step_count: usize,
    /// Treat input files as bare bodies and synthesize the header.
    #[serde(default)]
    pub header_mode: bool,
}

impl Config {
    fn default_ip() -> String {
        Ip::Ip1.to_string()
    }

    fn default_unit() -> String {
        Unit::Sigma.to_string()
    }

    fn default_wait_time() -> f64 {
        1.0
    }

    fn default_step_count() -> usize {
        10
    }

    /// Load from the standard path, falling back to defaults when the file
    /// or the home directory does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        match default_config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.generator().map_err(|source| ConfigError::Invalid {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config)
    }

    /// Write to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let yaml = serde_yaml::to_string(self).map_err(|e| write_err(io::Error::other(e)))?;
        std::fs::write(path, yaml).map_err(write_err)
    }

    /// Generator for the configured IP and unit.
    pub fn generator(&self) -> Result<SequenceGenerator, UnknownWord> {
        Ok(SequenceGenerator::new(self.ip.parse()?, self.unit.parse()?))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ip: Self::default_ip(),
            unit: Self::default_unit(),
            wait_time: Self::default_wait_time(),
            step_count: Self::default_step_count(),
            header_mode: false,
        }
    }
}

/// ~/.vdm/config.yaml, if a home directory is known.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".vdm").join("config.yaml"))
}
