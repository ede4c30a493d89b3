//! Runtime configuration
//!
//! Loading order:
//! 1. `CALIBRATOR_CONFIG` environment variable (path to TOML file)
//! 2. `calibrator.toml` in the current working directory
//! 3. Built-in defaults
//!
//! Only the outer surfaces are configurable. Engine targets and thresholds
//! are fixed constants in the crate root.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_ENV: &str = "CALIBRATOR_CONFIG";
pub const CONFIG_FILE: &str = "calibrator.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("CALIBRATOR_CONFIG points to a missing file ({})", .0.display())]
    Missing(PathBuf),
    #[error("config I/O error ({}): {1}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),
    #[error("config parse error ({}): {1}", .0.display())]
    Parse(PathBuf, #[source] toml::de::Error),
    #[error("config validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address for `--serve`
    pub addr: String,
    /// Per-session websocket backlog
    pub broadcast_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:3000".to_string(),
            broadcast_capacity: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, overridden by `RUST_LOG`
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: "warn,signal_calibrator=info".to_string() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibratorConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Result of the standard search: the config in effect, where it came from,
/// and every candidate file that was rejected on the way
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: CalibratorConfig,
    pub source: Option<PathBuf>,
    pub problems: Vec<ConfigError>,
}

impl CalibratorConfig {
    /// Standard search order, falling back to defaults on any problem.
    ///
    /// Nothing is logged here; the subscriber is not installed yet when the
    /// binary loads its config, so callers report `problems` themselves.
    pub fn load() -> LoadedConfig {
        let env_path = std::env::var(CONFIG_ENV).ok().map(PathBuf::from);
        Self::load_from(env_path, Path::new(CONFIG_FILE))
    }

    pub fn load_from(env_path: Option<PathBuf>, local: &Path) -> LoadedConfig {
        let mut problems = Vec::new();

        if let Some(path) = env_path {
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return LoadedConfig { config, source: Some(path), problems },
                    Err(e) => problems.push(e),
                }
            } else {
                problems.push(ConfigError::Missing(path));
            }
        }

        if local.exists() {
            match Self::load_from_file(local) {
                Ok(config) => {
                    return LoadedConfig { config, source: Some(local.to_path_buf()), problems }
                }
                Err(e) => problems.push(e),
            }
        }

        LoadedConfig { config: Self::default(), source: None, problems }
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.broadcast_capacity == 0 {
            return Err(ConfigError::Validation(
                "server.broadcast_capacity must be at least 1".to_string(),
            ));
        }
        if self.server.addr.trim().is_empty() {
            return Err(ConfigError::Validation("server.addr is empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_toml_is_default() {
        let config: CalibratorConfig = toml::from_str("").unwrap();
        assert_eq!(config, CalibratorConfig::default());
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config: CalibratorConfig = toml::from_str("[server]\naddr = \"0.0.0.0:8080\"\n").unwrap();
        assert_eq!(config.server.addr, "0.0.0.0:8080");
        assert_eq!(config.server.broadcast_capacity, 100);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let mut config = CalibratorConfig::default();
        config.server.broadcast_capacity = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = CalibratorConfig::load_from_file(Path::new("/nonexistent/calibrator.toml"));
        assert!(matches!(err, Err(ConfigError::Io(_, _))));
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("calibrator-config-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_invalid_local_file_is_reported() {
        let dir = scratch_dir("invalid");
        let local = dir.join(CONFIG_FILE);
        std::fs::write(&local, "[server]\nbroadcast_capacity = 0\n").unwrap();

        let loaded = CalibratorConfig::load_from(None, &local);
        assert_eq!(loaded.config, CalibratorConfig::default());
        assert_eq!(loaded.source, None);
        assert_eq!(loaded.problems.len(), 1);
        assert!(matches!(loaded.problems[0], ConfigError::Validation(_)));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_env_file_falls_through_to_local() {
        let dir = scratch_dir("fallthrough");
        let local = dir.join(CONFIG_FILE);
        std::fs::write(&local, "[server]\naddr = \"0.0.0.0:9000\"\n").unwrap();

        let loaded = CalibratorConfig::load_from(Some(dir.join("absent.toml")), &local);
        assert_eq!(loaded.config.server.addr, "0.0.0.0:9000");
        assert_eq!(loaded.source.as_deref(), Some(local.as_path()));
        assert!(matches!(loaded.problems.as_slice(), [ConfigError::Missing(_)]));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_no_files_is_quiet_default() {
        let dir = scratch_dir("none");
        let loaded = CalibratorConfig::load_from(None, &dir.join(CONFIG_FILE));
        assert_eq!(loaded.config, CalibratorConfig::default());
        assert!(loaded.problems.is_empty());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_from_file_roundtrip() {
        let dir = std::env::temp_dir().join(format!("calibrator-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE);
        std::fs::write(&path, "[logging]\nfilter = \"debug\"\n").unwrap();
        let config = CalibratorConfig::load_from_file(&path).unwrap();
        assert_eq!(config.logging.filter, "debug");
        std::fs::remove_dir_all(&dir).ok();
    }
}
