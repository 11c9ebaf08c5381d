//! INI configuration file.
//!
//! Settings live in `~/.orbitlayer/config.ini`. A missing file yields the
//! defaults; a present file only needs the keys it wants to override.
//!
//! ```ini
//! [catalog]
//! path = /data/minified.json
//!
//! [render]
//! globe_radius = 100
//! body_radius_km = 6371
//!
//! [pipeline]
//! parallel = true
//! parallel_threshold = 2048
//!
//! [clock]
//! time_scale = 60
//! tick_ms = 16
//!
//! [logging]
//! level = info
//! file = /tmp/orbitlayer.log
//! ```

mod file;

use std::path::PathBuf;

use thiserror::Error;

pub use file::{CatalogSettings, ClockSettings, ConfigFile, LoggingSettings, PipelineSettings, RenderSettings};

/// Directory name under the home directory.
pub const CONFIG_DIR_NAME: &str = ".orbitlayer";

/// Configuration file name inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Errors that can occur while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read or written.
    #[error("Config file I/O error for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid INI.
    #[error("Invalid config file syntax: {0}")]
    Parse(String),

    /// A key holds a value of the wrong type or outside its range.
    #[error("Invalid value '{value}' for [{section}] {key}: {reason}")]
    InvalidValue {
        section: &'static str,
        key: &'static str,
        value: String,
        reason: String,
    },

    /// The home directory could not be determined.
    #[error("Could not determine home directory")]
    NoHomeDirectory,
}

/// `~/.orbitlayer`.
pub fn config_directory() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(CONFIG_DIR_NAME))
        .ok_or(ConfigError::NoHomeDirectory)
}

/// `~/.orbitlayer/config.ini`.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_directory()?.join(CONFIG_FILE_NAME))
}
