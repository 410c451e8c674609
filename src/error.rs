use rust_decimal::Decimal;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OptionError {
    #[error("Invalid month: '{token}'")]
    InvalidMonth { token: String },

    #[error("Year out of range: {year}")]
    InvalidYear { year: i32 },

    #[error("Missing required option: --{name} (pass it or run `set config`)")]
    MissingRequiredOption { name: &'static str },

    #[error("Option --{name} must be positive, found {value}")]
    NonPositive { name: &'static str, value: Decimal },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine the home directory")]
    NoHomeDir,

    #[error("IO Error on config file {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("Error decoding config file {}: {source}", path.display())]
    Format {
        path: PathBuf,
        source: serde_lexpr::Error,
    },
}
