use thiserror::Error;

/// Top-level error type for the `admon-api` crate.
///
/// Every variant is a communication failure from the caller's point of
/// view: the remote document could not be obtained or understood.
/// `admon-core` maps these into domain diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The service answered with a non-success HTTP status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    // ── Document ────────────────────────────────────────────────────
    /// The response body was not well-formed XML.
    #[error("Malformed XML document: {message}")]
    Xml { message: String },

    /// The service returned an `<error>` element instead of data.
    #[error("Service reported an error: {message}")]
    Server { message: String },

    /// A required element was absent from an otherwise valid document.
    #[error("Element <{name}> missing from response")]
    MissingElement { name: String },

    /// A name (node category, log service) the service does not know.
    #[error("Unknown {kind}: {value}")]
    UnknownName { kind: &'static str, value: String },

    // ── Background requests ─────────────────────────────────────────
    /// The last background fetch failed; the original error was logged.
    #[error("Communication error: {message}")]
    Communication { message: String },

    /// A background request has not produced a document yet.
    #[error("Request still pending")]
    Pending,
}

impl Error {
    /// Every variant means the remote document could not be obtained or
    /// understood, except a caller passing an unknown name.
    pub fn is_communication(&self) -> bool {
        !matches!(self, Self::UnknownName { .. })
    }

    /// Returns `true` if the failure happened on the wire (as opposed to
    /// the service answering with an error document).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { .. })
    }

    /// Returns `true` if this is a transient error worth retrying on the
    /// next poll cycle.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => *status >= 500,
            Self::Communication { .. } | Self::Pending => true,
            _ => false,
        }
    }

    /// Returns `true` if the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Self::Xml {
            message: err.to_string(),
        }
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml {
            message: err.to_string(),
        }
    }
}
