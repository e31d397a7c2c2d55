// CLI configuration

use crate::file::WriteMode;
use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_DIR: &str = "todostore";

/// Settings read from `config.yaml`
///
/// Every key is optional; a missing file means all defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Location of the task file; a relative path is taken relative to the
    /// directory holding the config file
    pub data_file: PathBuf,
    /// Log filter used when RUST_LOG is not set
    pub log_level: String,
    /// Colored terminal output
    pub color: bool,
    /// Replace the task file via temp file + rename
    pub atomic_writes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            log_level: "warn".to_string(),
            color: true,
            atomic_writes: true,
        }
    }
}

impl Config {
    /// `<config_dir>/todostore/config.yaml`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.yaml"))
    }

    /// Load from an explicit path, or from the default location
    ///
    /// An explicit path must exist; the default location is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(eyre!("Config file not found: {:?}", path));
                }
                Self::load_from(path)
            }
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                _ => {
                    debug!("No config file, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).context(format!("Failed to read config file {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let mut config: Config =
            serde_yaml::from_str(&content).context(format!("Failed to parse config file {:?}", path))?;

        let base = path.parent().unwrap_or(Path::new(""));
        if config.data_file.is_relative() && config.data_file != default_data_file() {
            config.data_file = base.join(&config.data_file);
        }
        debug!(file = ?path, data_file = ?config.data_file, "Loaded config");

        Ok(config)
    }

    pub fn write_mode(&self) -> WriteMode {
        if self.atomic_writes {
            WriteMode::Atomic
        } else {
            WriteMode::Overwrite
        }
    }
}

fn default_data_file() -> PathBuf {
    match dirs::data_dir() {
        Some(dir) => dir.join(APP_DIR).join("tasks.json"),
        None => PathBuf::from("tasks.json"),
    }
}
