use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

const CONFIG_DIR: &str = ".invoicer";
const CONFIG_FILE: &str = "config";

/// Stored defaults for the invoice command. Absent fields are not written.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl Config {
    /// Overwrite the fields `updates` sets. Empty strings and zero numbers
    /// count as unset.
    pub fn merge(&mut self, updates: Config) {
        if let Some(vendor) = non_empty(updates.vendor) {
            self.vendor = Some(vendor);
        }
        if let Some(customer) = non_empty(updates.customer) {
            self.customer = Some(customer);
        }
        if let Some(rate) = non_zero(updates.rate) {
            self.rate = Some(rate);
        }
        if let Some(hours) = non_zero(updates.hours) {
            self.hours = Some(hours);
        }
        if let Some(pdf) = updates.pdf {
            self.pdf = Some(pdf);
        }
        if let Some(model) = non_empty(updates.model) {
            self.model = Some(model);
        }
    }
}

pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub fn non_zero(value: Option<Decimal>) -> Option<Decimal> {
    value.filter(|v| !v.is_zero())
}

/// ~/.invoicer/config
pub fn default_path() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
        .ok_or(ConfigError::NoHomeDir)
}

/// A missing file loads as an empty configuration.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            debug!("no config file at {}", path.display());
            return Ok(Config::default());
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_lexpr::from_reader(BufReader::new(file)).map_err(|source| {
        ConfigError::Format {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Merge `updates` into the stored configuration, creating the file and
/// its directory when missing. Returns the configuration as written.
pub fn save(path: &Path, updates: Config) -> Result<Config, ConfigError> {
    let mut config = load(path)?;
    config.merge(updates);

    let io_error = |source: io::Error| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(io_error)?;
    }

    let updated_path = path.with_extension("updated");
    let f = File::create(&updated_path).map_err(io_error)?;
    serde_lexpr::to_writer(f, &config).map_err(|source| {
        ConfigError::Format {
            path: path.to_path_buf(),
            source,
        }
    })?;
    fs::rename(&updated_path, path).map_err(io_error)?;

    debug!("wrote config to {}", path.display());
    Ok(config)
}
