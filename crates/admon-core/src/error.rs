// ── Core error types ──
//
// User-facing errors from admon-core. Consumers never see HTTP status
// codes or XML parse failures directly; the `From<admon_api::Error>` impl
// translates transport-layer errors into domain-appropriate variants.
//
// Registry mutations do not use this type: they report rejection through
// `bool` / `BulkOutcome` and never fail.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to admon service at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Admon service request timed out")]
    Timeout,

    #[error("Communication error: {message}")]
    Communication { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Node not found: {identifier}")]
    NodeNotFound { identifier: String },

    #[error("Group not found: {name}")]
    GroupNotFound { name: String },

    #[error("Invalid typed node ID: {value}")]
    InvalidNodeId { value: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Whether the error came from talking to the admon service.
    pub fn is_communication(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::Timeout | Self::Communication { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<admon_api::Error> for CoreError {
    fn from(err: admon_api::Error) -> Self {
        match err {
            admon_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Communication {
                        message: e.to_string(),
                    }
                }
            }
            admon_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            admon_api::Error::UnknownName { kind, value } => CoreError::Config {
                message: format!("Unknown {kind}: {value}"),
            },
            other @ (admon_api::Error::Status { .. }
            | admon_api::Error::Xml { .. }
            | admon_api::Error::Server { .. }
            | admon_api::Error::MissingElement { .. }
            | admon_api::Error::Communication { .. }
            | admon_api::Error::Pending) => CoreError::Communication {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_errors_become_communication_errors() {
        let err = CoreError::from(admon_api::Error::Server {
            message: "busy".into(),
        });
        assert!(err.is_communication());
        assert_eq!(err.to_string(), "Communication error: Service reported an error: busy");
    }

    #[test]
    fn unknown_name_is_a_config_error() {
        let err = CoreError::from(admon_api::Error::UnknownName {
            kind: "log service",
            value: "x".into(),
        });
        assert!(matches!(err, CoreError::Config { .. }));
        assert!(!err.is_communication());
    }
}
