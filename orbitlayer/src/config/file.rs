//! Typed view of `config.ini`.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ini::Ini;
use tracing::debug;

use super::{config_file_path, ConfigError};
use crate::clock::{SimulationClock, DEFAULT_TIME_SCALE};
use crate::propagation::{PropagationConfig, DEFAULT_PARALLEL_THRESHOLD};
use crate::render::{FrameMapper, DEFAULT_BODY_RADIUS_KM, DEFAULT_GLOBE_RADIUS};

/// `[catalog]`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogSettings {
    /// Compact JSON catalog to load at startup.
    pub path: Option<PathBuf>,
}

/// `[render]`
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub globe_radius: f32,
    pub body_radius_km: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            globe_radius: DEFAULT_GLOBE_RADIUS,
            body_radius_km: DEFAULT_BODY_RADIUS_KM,
        }
    }
}

/// `[pipeline]`
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub parallel: bool,
    pub parallel_threshold: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            parallel: true,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

/// `[clock]`
#[derive(Debug, Clone, PartialEq)]
pub struct ClockSettings {
    pub time_scale: f64,
    /// Interactive tick interval in milliseconds.
    pub tick_ms: u64,
}

impl Default for ClockSettings {
    fn default() -> Self {
        Self {
            time_scale: DEFAULT_TIME_SCALE,
            tick_ms: 16,
        }
    }
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
    /// Optional log file; stderr only when unset.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// The whole configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub catalog: CatalogSettings,
    pub render: RenderSettings,
    pub pipeline: PipelineSettings,
    pub clock: ClockSettings,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Load from `~/.orbitlayer/config.ini`, or defaults if it does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path()?)
    }

    /// Load from `path`, or defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_ini_str(&text)?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Parse INI text. Absent keys keep their defaults.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let mut config = Self::default();

        if let Some(path) = get(&ini, "catalog", "path") {
            config.catalog.path = Some(PathBuf::from(path));
        }

        if let Some(v) = parse(&ini, "render", "globe_radius")? {
            config.render.globe_radius = positive("render", "globe_radius", v)?;
        }
        if let Some(v) = parse(&ini, "render", "body_radius_km")? {
            config.render.body_radius_km = positive("render", "body_radius_km", v)?;
        }

        if let Some(v) = parse(&ini, "pipeline", "parallel")? {
            config.pipeline.parallel = v;
        }
        if let Some(v) = parse(&ini, "pipeline", "parallel_threshold")? {
            config.pipeline.parallel_threshold = v;
        }

        if let Some(v) = parse::<f64>(&ini, "clock", "time_scale")? {
            if !v.is_finite() || v < 0.0 {
                return Err(invalid("clock", "time_scale", v, "must be a non-negative number"));
            }
            config.clock.time_scale = v;
        }
        if let Some(v) = parse::<u64>(&ini, "clock", "tick_ms")? {
            if v == 0 {
                return Err(invalid("clock", "tick_ms", v, "must be at least 1"));
            }
            config.clock.tick_ms = v;
        }

        if let Some(level) = get(&ini, "logging", "level") {
            config.logging.level = level.to_string();
        }
        if let Some(file) = get(&ini, "logging", "file") {
            config.logging.file = Some(PathBuf::from(file));
        }

        Ok(config)
    }

    /// Write every setting to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |source: std::io::Error| ConfigError::Io {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let mut ini = Ini::new();
        if let Some(catalog) = &self.catalog.path {
            ini.with_section(Some("catalog"))
                .set("path", catalog.display().to_string());
        }
        ini.with_section(Some("render"))
            .set("globe_radius", self.render.globe_radius.to_string())
            .set("body_radius_km", self.render.body_radius_km.to_string());
        ini.with_section(Some("pipeline"))
            .set("parallel", self.pipeline.parallel.to_string())
            .set("parallel_threshold", self.pipeline.parallel_threshold.to_string());
        ini.with_section(Some("clock"))
            .set("time_scale", self.clock.time_scale.to_string())
            .set("tick_ms", self.clock.tick_ms.to_string());
        ini.with_section(Some("logging"))
            .set("level", self.logging.level.clone());
        if let Some(file) = &self.logging.file {
            ini.with_section(Some("logging"))
                .set("file", file.display().to_string());
        }

        ini.write_to_file(path).map_err(io_error)
    }

    pub fn propagation_config(&self) -> PropagationConfig {
        PropagationConfig {
            parallel: self.pipeline.parallel,
            parallel_threshold: self.pipeline.parallel_threshold,
        }
    }

    pub fn frame_mapper(&self) -> FrameMapper {
        FrameMapper::new(self.render.globe_radius, self.render.body_radius_km)
    }

    /// A clock starting at `start` with the configured time scale.
    pub fn clock(&self, start: chrono::DateTime<chrono::Utc>) -> SimulationClock {
        SimulationClock::new(start).with_time_scale(self.clock.time_scale)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.clock.tick_ms)
    }
}

fn get<'a>(ini: &'a Ini, section: &str, key: &str) -> Option<&'a str> {
    ini.section(Some(section))
        .and_then(|s| s.get(key))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn parse<T>(ini: &Ini, section: &'static str, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get(ini, section, key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| invalid(section, key, raw, e.to_string()))
        })
        .transpose()
}

fn positive(section: &'static str, key: &'static str, value: f32) -> Result<f32, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(invalid(section, key, value, "must be a positive number"))
    }
}

fn invalid(
    section: &'static str,
    key: &'static str,
    value: impl ToString,
    reason: impl Into<String>,
) -> ConfigError {
    ConfigError::InvalidValue {
        section,
        key,
        value: value.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ConfigFile::load_from(&dir.path().join("absent.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_partial_file_overrides_only_given_keys() {
        let config = ConfigFile::from_ini_str(
            "[pipeline]\nparallel = false\n\n[clock]\ntime_scale = 120\n",
        )
        .unwrap();
        assert!(!config.pipeline.parallel);
        assert_eq!(config.pipeline.parallel_threshold, DEFAULT_PARALLEL_THRESHOLD);
        assert_eq!(config.clock.time_scale, 120.0);
        assert_eq!(config.render, RenderSettings::default());
    }

    #[test]
    fn test_invalid_number_reported() {
        let err = ConfigFile::from_ini_str("[render]\nglobe_radius = big\n").unwrap_err();
        match err {
            ConfigError::InvalidValue { section, key, value, .. } => {
                assert_eq!(section, "render");
                assert_eq!(key, "globe_radius");
                assert_eq!(value, "big");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        assert!(ConfigFile::from_ini_str("[render]\nbody_radius_km = 0\n").is_err());
        assert!(ConfigFile::from_ini_str("[clock]\ntime_scale = -3\n").is_err());
        assert!(ConfigFile::from_ini_str("[clock]\ntick_ms = 0\n").is_err());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.catalog.path = Some(PathBuf::from("/data/minified.json"));
        config.pipeline.parallel_threshold = 10;
        config.logging.file = Some(PathBuf::from("/tmp/orbitlayer.log"));
        config.save_to(&path).unwrap();

        assert_eq!(ConfigFile::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_derived_settings() {
        let config = ConfigFile::from_ini_str("[render]\nglobe_radius = 200\nbody_radius_km = 100\n").unwrap();
        assert_eq!(config.frame_mapper().scale(), 2.0);
        assert_eq!(config.tick_interval(), Duration::from_millis(16));
    }
}
