//! Uploader configuration.
//!
//! Stored as JSON in the platform config directory
//! (`~/.config/clipvault/config.json` on Linux). Environment variables
//! override file values:
//! - `CLIPVAULT_CHUNK_SIZE`
//! - `CLIPVAULT_ENDPOINT`
//! - `CLIPVAULT_TOKEN`

use std::path::{Path, PathBuf};
use std::time::Duration;

use clipvault_transfer::{ChunkSize, DEFAULT_CHUNK_SIZE, TransferError};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const ENV_CHUNK_SIZE: &str = "CLIPVAULT_CHUNK_SIZE";
const ENV_ENDPOINT: &str = "CLIPVAULT_ENDPOINT";
const ENV_TOKEN: &str = "CLIPVAULT_TOKEN";

/// Uploader settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UploaderConfig {
    /// Maximum bytes per chunk. Must be positive.
    pub chunk_size: u64,
    /// Backend gateway base URL.
    pub endpoint: String,
    /// Bearer token sent with every backend request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Per-request timeout enforced by the transport.
    pub request_timeout_secs: u64,
    /// Default owner for uploads and listings.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user_id: String,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            endpoint: "http://localhost:8000".into(),
            access_token: None,
            request_timeout_secs: 120,
            user_id: String::new(),
        }
    }
}

impl UploaderConfig {
    /// Loads the config file from the default location, then applies
    /// environment overrides.
    ///
    /// A missing file yields defaults; an unparsable file is logged and
    /// replaced by defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&config_path())?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Loads the config file at `path` without environment overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str::<Self>(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config, using defaults"
                );
                Ok(Self::default())
            }
        }
    }

    /// Applies overrides from `lookup` (normally the process environment).
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(value) = lookup(ENV_CHUNK_SIZE) {
            self.chunk_size = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                key: ENV_CHUNK_SIZE,
                value,
            })?;
        }
        if let Some(endpoint) = lookup(ENV_ENDPOINT) {
            self.endpoint = endpoint;
        }
        if let Some(token) = lookup(ENV_TOKEN) {
            self.access_token = Some(token).filter(|t| !t.is_empty());
        }
        Ok(())
    }

    /// Writes the config to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        set_permissions_0600(path);
        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Validated chunk size.
    pub fn chunk_size(&self) -> Result<ChunkSize, TransferError> {
        ChunkSize::new(self.chunk_size)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn set_permissions_0600(path: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600));
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
}

/// Default config file location.
pub fn config_path() -> PathBuf {
    config_base_dir().join("clipvault").join("config.json")
}

fn config_base_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        PathBuf::from(appdata)
    }

    #[cfg(not(target_os = "windows"))]
    {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg);
        }
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        PathBuf::from(home).join(".config")
    }
}
