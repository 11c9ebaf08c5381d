//! Shared command setup: configuration, logging and catalog resolution.

use std::path::{Path, PathBuf};

use orbitlayer::catalog::Catalog;
use orbitlayer::config::ConfigFile;
use orbitlayer::logging::{init_logging, WorkerGuard};
use tracing::info;

use crate::error::CliError;

/// Per-invocation state shared by every command.
pub struct CliRunner {
    config: ConfigFile,
    _log_guard: Option<WorkerGuard>,
}

impl CliRunner {
    /// Load configuration and install logging.
    ///
    /// `config_path` overrides `~/.orbitlayer/config.ini`; `verbose` forces
    /// debug-level logging.
    pub fn new(config_path: Option<&Path>, verbose: bool) -> Result<Self, CliError> {
        let mut config = match config_path {
            Some(path) => ConfigFile::load_from(path)?,
            None => ConfigFile::load()?,
        };
        if verbose {
            config.logging.level = "debug".to_string();
        }

        let log_guard = init_logging(&config.logging)?;
        Ok(Self {
            config,
            _log_guard: log_guard,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn log_startup(&self, command: &str) {
        info!(
            command,
            version = env!("CARGO_PKG_VERSION"),
            "OrbitLayer starting"
        );
    }

    /// Load the catalog named on the command line, else the configured one.
    pub fn load_catalog(&self, cli_path: Option<PathBuf>) -> Result<Catalog, CliError> {
        let path = resolve_catalog_path(cli_path, &self.config)?;
        Ok(Catalog::load(path)?)
    }
}

/// CLI takes precedence, then config.
pub fn resolve_catalog_path(cli_path: Option<PathBuf>, config: &ConfigFile) -> Result<PathBuf, CliError> {
    cli_path.or_else(|| config.catalog.path.clone()).ok_or_else(|| {
        CliError::Config(
            "No catalog specified. Use --catalog or set path in config.ini [catalog] section."
                .to_string(),
        )
    })
}
