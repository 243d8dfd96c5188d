use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::WallpaperError;

pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_USER_AGENT: &str = "WallpaperApp/1.0";
/// Longest side, in pixels, handed to the wallpaper facility.
pub const DEFAULT_MAX_DIMENSION: u32 = 4096;
pub const DEFAULT_MAX_DOWNLOAD_BYTES: u64 = 64 * 1024 * 1024;

const CONFIG_FILE_NAME: &str = "config.json";

/// Tunables for image acquisition. Every field falls back to its default
/// when missing from the JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginConfig {
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub user_agent: String,
    pub max_dimension: u32,
    pub max_download_bytes: u64,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_dimension: DEFAULT_MAX_DIMENSION,
            max_download_bytes: DEFAULT_MAX_DOWNLOAD_BYTES,
        }
    }
}

impl PluginConfig {
    /// Loads the configuration from an explicit path, or from `config.json`
    /// in the project config directory when it exists. Falls back to
    /// defaults when no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self, WallpaperError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => {
                    log::debug!("No config file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        log::debug!("Loading plugin config from {}", path.display());
        let content = fs::read_to_string(&path)
            .map_err(|e| WallpaperError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, WallpaperError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), WallpaperError> {
        if self.connect_timeout_secs == 0 || self.read_timeout_secs == 0 {
            return Err(WallpaperError::Config("timeouts must be at least one second".to_string()));
        }
        if self.max_dimension == 0 {
            return Err(WallpaperError::Config("maxDimension must be positive".to_string()));
        }
        if self.max_download_bytes == 0 {
            return Err(WallpaperError::Config("maxDownloadBytes must be positive".to_string()));
        }
        Ok(())
    }

    #[must_use]
    pub const fn connect_timeout(&self) -> Duration { Duration::from_secs(self.connect_timeout_secs) }

    #[must_use]
    pub const fn read_timeout(&self) -> Duration { Duration::from_secs(self.read_timeout_secs) }
}

pub(crate) fn project_dirs() -> Option<ProjectDirs> { ProjectDirs::from("io", "wallbridge", "wallbridge") }

/// `config.json` inside the platform config directory, if one can be determined.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}
