//! On-disk configuration for admon.
//!
//! One TOML file plus `ADMON_*` environment overrides, resolved through
//! figment and translated into `admon_core::AdmonConfig`. The core crate
//! never reads files itself; this crate is the only place that does.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use admon_core::AdmonConfig;
use admon_core::config::{DEFAULT_HOST, DEFAULT_PORT};

/// Prefix of environment overrides, e.g. `ADMON_HOST`.
pub const ENV_PREFIX: &str = "ADMON_";

/// Shortest poll interval accepted from configuration.
pub const MIN_POLL_INTERVAL_MS: u64 = 100;

/// Highest console verbosity (trace).
pub const MAX_LOG_LEVEL: u8 = 5;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config file already exists: {}", path.display())]
    AlreadyExists { path: PathBuf },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config ─────────────────────────────────────────────────────

/// Contents of `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Host running the admon daemon.
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP port of the admon daemon.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Delay between node list refreshes.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// 0/1 error, 2 warn, 3 info, 4 debug, 5 trace.
    #[serde(default = "default_log_level")]
    pub log_level: u8,

    /// Drop nodes the service stops reporting.
    #[serde(default)]
    pub prune_stale: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            poll_interval_ms: default_poll_interval_ms(),
            timeout_secs: default_timeout_secs(),
            log_level: default_log_level(),
            prune_stale: false,
        }
    }
}

fn default_host() -> String {
    DEFAULT_HOST.into()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_poll_interval_ms() -> u64 {
    4000
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_log_level() -> u8 {
    3
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(invalid("host", "must not be empty"));
        }
        if self.port == 0 {
            return Err(invalid("port", "must be between 1 and 65535"));
        }
        if self.poll_interval_ms < MIN_POLL_INTERVAL_MS {
            return Err(invalid(
                "poll_interval_ms",
                format!("must be at least {MIN_POLL_INTERVAL_MS}, got {}", self.poll_interval_ms),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(invalid("timeout_secs", "must be non-zero"));
        }
        if self.log_level > MAX_LOG_LEVEL {
            return Err(invalid(
                "log_level",
                format!("must be 0-{MAX_LOG_LEVEL}, got {}", self.log_level),
            ));
        }
        Ok(())
    }

    /// Plain runtime values for the core crate.
    pub fn to_admon_config(&self) -> AdmonConfig {
        AdmonConfig {
            host: self.host.clone(),
            port: self.port,
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            timeout: Duration::from_secs(self.timeout_secs),
            log_level: self.log_level,
            prune_stale: self.prune_stale,
        }
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "admon", "admon").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("admon");
    p
}

// ── Loading ─────────────────────────────────────────────────────────

fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX))
}

/// Load and validate the config at `path` (or the platform default),
/// layered under `ADMON_*` environment overrides. A missing file is not
/// an error.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    let config: Config = figment(&path).extract()?;
    config.validate()?;
    Ok(config)
}

// ── Saving ──────────────────────────────────────────────────────────

/// Serialize `cfg` to TOML at `path`, creating parent directories.
pub fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// Write a default config to `path`. Refuses to overwrite unless `force`.
pub fn init_config(path: &Path, force: bool) -> Result<Config, ConfigError> {
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists {
            path: path.to_path_buf(),
        });
    }
    let cfg = Config::default();
    save_config(&cfg, path)?;
    Ok(cfg)
}
