//! `synch.yaml` configuration.
//!
//! # Discovery order
//!
//! 1. an explicit path (`--config` / `SYNCH_CONFIG`), which must exist
//! 2. `synch.yaml` in the working directory, then in each ancestor
//! 3. `<config_dir>/synch/synch.yaml` (`~/.config/synch/synch.yaml` on Linux)
//!
//! # API pattern
//!
//! As with the rest of the workspace, functions that touch the process
//! environment have an `_at` twin taking every input explicitly. Tests must
//! only call the `_at` forms.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const CONFIG_FILE_NAME: &str = "synch.yaml";

/// Environment variable that overrides `oauth_token` from the file.
pub const TOKEN_ENV: &str = "SYNCH_OAUTH_TOKEN";

pub const DEFAULT_SYNCH_DELAY_SECS: u64 = 30;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_API_BASE_URL: &str = "https://cloud-api.yandex.net/v1/disk";

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Runtime configuration, passed explicitly to every component at startup.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Local directory whose regular files are mirrored.
    pub path_local_folder: PathBuf,
    /// Remote folder, e.g. `disk:/backup`.
    pub path_cloud_folder: String,
    #[serde(default, alias = "yandex_oauth_token")]
    pub oauth_token: String,
    /// Seconds between the end of one pass and the start of the next.
    #[serde(default = "default_synch_delay")]
    pub synch_delay: u64,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub log_format: LogFormat,
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_synch_delay() -> u64 {
    DEFAULT_SYNCH_DELAY_SECS
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("path_local_folder", &self.path_local_folder)
            .field("path_cloud_folder", &self.path_cloud_folder)
            .field("oauth_token", &"<redacted>")
            .field("synch_delay", &self.synch_delay)
            .field("api_base_url", &self.api_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("log_format", &self.log_format)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

impl Config {
    /// Delay between passes.
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.synch_delay)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Directory for the daemon log file; `<home>/.synch/logs` unless set.
    pub fn log_dir_or_default(&self, home: &Path) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| home.join(".synch").join("logs"))
    }

    /// Check the values serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path_local_folder.as_os_str().is_empty() {
            return Err(invalid("path_local_folder", "must not be empty"));
        }
        if self.path_cloud_folder.trim().is_empty() {
            return Err(invalid("path_cloud_folder", "must not be empty"));
        }
        if self.oauth_token.trim().is_empty() {
            return Err(invalid(
                "oauth_token",
                format!("must be set in the file or via ${TOKEN_ENV}"),
            ));
        }
        if self.synch_delay == 0 {
            return Err(invalid("synch_delay", "must be at least 1 second"));
        }
        if self.request_timeout_secs == 0 {
            return Err(invalid("request_timeout_secs", "must be at least 1 second"));
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            return Err(invalid("api_base_url", "must be an http(s) URL"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

// ---------------------------------------------------------------------------
// 1. Load
// ---------------------------------------------------------------------------

/// Parse and validate the configuration at `path`.
///
/// `token_override`, when non-empty, replaces `oauth_token` from the file.
/// A relative `path_local_folder` is resolved against the file's directory.
pub fn load_at(path: &Path, token_override: Option<String>) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config: Config =
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    if let Some(token) = token_override.filter(|t| !t.trim().is_empty()) {
        config.oauth_token = token;
    }

    if config.path_local_folder.is_relative() {
        if let Some(dir) = path.parent() {
            config.path_local_folder = dir.join(&config.path_local_folder);
        }
    }

    config.validate()?;
    Ok(config)
}

/// `load_at` with the token override read from `$SYNCH_OAUTH_TOKEN`.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    load_at(path, std::env::var(TOKEN_ENV).ok())
}

// ---------------------------------------------------------------------------
// 2. Discovery
// ---------------------------------------------------------------------------

/// Search `start` and its ancestors, then `config_dir/synch/`, for `synch.yaml`.
///
/// Returns `ConfigError::NotFound` listing every candidate that was checked.
pub fn discover_at(start: &Path, config_dir: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let mut searched = Vec::new();
    for dir in start.ancestors() {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Ok(candidate);
        }
        searched.push(candidate);
    }
    if let Some(config_dir) = config_dir {
        let candidate = config_dir.join("synch").join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Ok(candidate);
        }
        searched.push(candidate);
    }
    Err(ConfigError::NotFound { searched })
}

/// Resolve the configuration file path: explicit path first, then discovery.
pub fn resolve_path_at(
    explicit: Option<&Path>,
    start: &Path,
    config_dir: Option<&Path>,
) -> Result<PathBuf, ConfigError> {
    match explicit {
        Some(path) if path.is_file() => Ok(path.to_path_buf()),
        Some(path) => Err(ConfigError::NotFound {
            searched: vec![path.to_path_buf()],
        }),
        None => discover_at(start, config_dir),
    }
}

/// `resolve_path_at` from the working directory and the platform config dir,
/// followed by [`load`].
pub fn resolve(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|source| ConfigError::Io {
        path: PathBuf::from("."),
        source,
    })?;
    let config_dir = dirs::config_dir();
    let path = resolve_path_at(explicit, &cwd, config_dir.as_deref())?;
    load(&path)
}
