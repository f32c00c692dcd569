// ── Runtime connection configuration ──
//
// Describes *how* to reach the admon service and how often to poll it.
// Never touches disk: the CLI resolves files and environment, then hands
// an `AdmonConfig` in.

use std::time::Duration;

use admon_api::{AdmonClient, TransportConfig};
use url::Url;

use crate::error::CoreError;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(4000);

/// Resolved settings for one admon service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmonConfig {
    pub host: String,
    pub port: u16,
    /// Delay between poll cycles.
    pub poll_interval: Duration,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Console verbosity, 0 (errors only) through 5 (trace).
    pub log_level: u8,
    /// Remove nodes that vanish from the node list after a successful cycle.
    pub prune_stale: bool,
}

impl Default for AdmonConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: Duration::from_secs(30),
            log_level: 3,
            prune_stale: false,
        }
    }
}

impl AdmonConfig {
    /// `http://{host}:{port}/`
    pub fn base_url(&self) -> Result<Url, CoreError> {
        Url::parse(&format!("http://{}:{}/", self.host, self.port)).map_err(|e| {
            CoreError::Config {
                message: format!("invalid admon address {}:{}: {e}", self.host, self.port),
            }
        })
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig::default().with_timeout(self.timeout)
    }

    /// Build an HTTP client for this service.
    pub fn client(&self) -> Result<AdmonClient, CoreError> {
        Ok(AdmonClient::new(self.base_url()?, &self.transport())?)
    }
}
