//! Application settings and paths.
//!
//! Settings are optional: a missing file means built-in defaults.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Application directory paths following the XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/portsweep)
    pub config_dir: PathBuf,
}

impl Paths {
    /// Locate the platform directories, if the home directory is known.
    pub fn discover() -> Option<Self> {
        let project = ProjectDirs::from("com", "portsweep", "portsweep")?;
        Some(Self {
            config_dir: project.config_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// Defaults applied when a flag is not given on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Default number of probe workers.
    pub default_workers: usize,
    /// Default host to scan.
    pub default_host: String,
    /// Default first port.
    pub default_start: u32,
    /// Default last port.
    pub default_end: u32,
    /// Default connect timeout in milliseconds, 0 for none.
    pub default_timeout_ms: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_workers: 10,
            default_host: "127.0.0.1".to_string(),
            default_start: 1,
            default_end: 65535,
            default_timeout_ms: 0,
        }
    }
}

impl AppSettings {
    /// Load settings from the platform config directory.
    pub fn load() -> ConfigResult<Self> {
        let Some(paths) = Paths::discover() else {
            return Ok(Self::default());
        };
        let file = paths.settings_file();

        if !file.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.default_workers, 10);
        assert_eq!(settings.default_host, "127.0.0.1");
        assert_eq!(settings.default_start, 1);
        assert_eq!(settings.default_end, 65535);
        assert_eq!(settings.default_timeout_ms, 0);
    }

    #[test]
    fn test_partial_settings_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"default_workers": 64, "default_host": "scanme.local"}}"#).unwrap();

        let settings = AppSettings::load_from(file.path()).unwrap();
        assert_eq!(settings.default_workers, 64);
        assert_eq!(settings.default_host, "scanme.local");
        assert_eq!(settings.default_end, 65535);
    }

    #[test]
    fn test_malformed_settings_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "workers = 5").unwrap();

        assert!(matches!(
            AppSettings::load_from(file.path()),
            Err(ConfigError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_missing_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            AppSettings::load_from(&dir.path().join("absent.json")),
            Err(ConfigError::ReadFailed { .. })
        ));
    }
}
