//! Application settings and paths.
//!
//! Settings live in `settings.json` under the XDG config directory
//! (`~/.config/portsweep` on Linux). A missing file means built-in defaults.

use crate::error::{ConfigError, ConfigResult};
use crate::output::OutputMode;
use crate::scanner::{PortScanner, TcpConnectProber};
use crate::types::PortSpec;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application directory paths following the XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/portsweep)
    pub config_dir: PathBuf,
}

impl Paths {
    /// Locate the configuration directory for the current user.
    pub fn discover() -> ConfigResult<Self> {
        let project =
            ProjectDirs::from("com", "portsweep", "portsweep").ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// Scan defaults that apply when neither the command line nor the
/// environment provides a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Port specification used when none is given.
    pub default_ports: String,
    /// Default concurrency level.
    pub default_concurrency: usize,
    /// Default per-port timeout in milliseconds.
    pub default_timeout_ms: u64,
    /// Default output mode.
    pub output: OutputMode,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_ports: PortSpec::default_range().to_string(),
            default_concurrency: PortScanner::DEFAULT_CONCURRENCY,
            default_timeout_ms: TcpConnectProber::DEFAULT_TIMEOUT.as_millis() as u64,
            output: OutputMode::Human,
        }
    }
}

impl AppSettings {
    /// Load settings from the default location, falling back to defaults
    /// when the file does not exist.
    pub fn load(paths: &Paths) -> ConfigResult<Self> {
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
