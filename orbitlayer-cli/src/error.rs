//! CLI error type.

use std::fmt;

use orbitlayer::catalog::CatalogError;
use orbitlayer::config::ConfigError;
use orbitlayer::ephemeris::EphemerisError;
use orbitlayer::layer::LayerError;
use orbitlayer::logging::LoggingError;

/// Errors surfaced to the user by any command.
#[derive(Debug)]
pub enum CliError {
    /// Missing or inconsistent settings.
    Config(String),
    ConfigFile(ConfigError),
    Catalog(CatalogError),
    Ephemeris(EphemerisError),
    Layer(LayerError),
    Logging(LoggingError),
    /// The tokio runtime could not be created.
    Runtime(std::io::Error),
    /// A slot or query matched nothing.
    NotFound(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::Catalog(e) => write!(f, "{}", e),
            CliError::Ephemeris(e) => write!(f, "Cannot build interchange record: {}", e),
            CliError::Layer(e) => write!(f, "Pipeline error: {}", e),
            CliError::Logging(e) => write!(f, "{}", e),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::NotFound(what) => write!(f, "Not found: {}", what),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Catalog(e) => Some(e),
            CliError::Ephemeris(e) => Some(e),
            CliError::Layer(e) => Some(e),
            CliError::Logging(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            CliError::Config(_) | CliError::NotFound(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<CatalogError> for CliError {
    fn from(e: CatalogError) -> Self {
        CliError::Catalog(e)
    }
}

impl From<EphemerisError> for CliError {
    fn from(e: EphemerisError) -> Self {
        CliError::Ephemeris(e)
    }
}

impl From<LayerError> for CliError {
    fn from(e: LayerError) -> Self {
        CliError::Layer(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}
