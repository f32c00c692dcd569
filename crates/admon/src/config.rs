//! CLI configuration: thin wrapper around `admon_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--config, --host, --port, --timeout).

use std::path::PathBuf;

use admon_core::AdmonConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use admon_config::Config;

/// Config file in effect: `--config` (or `ADMON_CONFIG`), else the
/// platform default.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(admon_config::config_path)
}

/// Load file + environment, then apply flag overrides and validate.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let path = config_path(global);
    let mut cfg = admon_config::load_config(Some(&path))?;

    if let Some(ref host) = global.host {
        cfg.host.clone_from(host);
    }
    if let Some(port) = global.port {
        cfg.port = port;
    }
    if let Some(timeout) = global.timeout {
        cfg.timeout_secs = timeout;
    }

    cfg.validate()?;
    Ok(cfg)
}

/// Runtime settings for the core crate.
pub fn resolve(global: &GlobalOpts) -> Result<AdmonConfig, CliError> {
    Ok(load(global)?.to_admon_config())
}
