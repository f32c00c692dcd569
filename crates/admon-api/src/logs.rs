// Log file endpoints
//
// Remote daemon logs are relayed by the admon service; its own log has a
// dedicated document. Both answer with `<data><log>...</log></data>`.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::client::AdmonClient;
use crate::error::Error;
use crate::xml::XmlDocument;

/// Path of the relayed daemon log document.
pub const REMOTE_LOG_PATH: &str = "/XML_RemoteLogFile";

/// Path of the admon daemon's own log document.
pub const ADMON_LOG_PATH: &str = "/XML_LogFile";

const LOG_ELEMENT: &str = "log";

/// Daemon whose log is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogService {
    Mgmtd,
    Meta,
    Storage,
    Admon,
    Client,
}

impl LogService {
    pub const ALL: [Self; 5] = [
        Self::Mgmtd,
        Self::Meta,
        Self::Storage,
        Self::Admon,
        Self::Client,
    ];

    /// Value of the `service` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mgmtd => "mgmtd",
            Self::Meta => "meta",
            Self::Storage => "storage",
            Self::Admon => "admon",
            Self::Client => "client",
        }
    }
}

impl fmt::Display for LogService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogService {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|svc| svc.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownName {
                kind: "log service",
                value: s.to_owned(),
            })
    }
}

fn log_text(doc: &XmlDocument) -> Result<String, Error> {
    doc.value(LOG_ELEMENT)
        .map(str::to_owned)
        .ok_or_else(|| Error::MissingElement {
            name: LOG_ELEMENT.into(),
        })
}

impl AdmonClient {
    /// Fetch the tail of a daemon's log file.
    ///
    /// `GET /XML_RemoteLogFile?service={service}&node={node}&nodeNumID={id}&lines={lines}`
    pub async fn remote_log_file(
        &self,
        service: LogService,
        node: &str,
        node_num_id: u16,
        lines: u32,
    ) -> Result<String, Error> {
        let num_id = node_num_id.to_string();
        let lines = lines.to_string();
        let url = self.endpoint_url(
            REMOTE_LOG_PATH,
            &[
                ("service", service.as_str()),
                ("node", node),
                ("nodeNumID", &num_id),
                ("lines", &lines),
            ],
        )?;
        debug!(%service, node, node_num_id, "fetching remote log");
        log_text(&self.fetch(url).await?)
    }

    /// Fetch the admon daemon's own log file.
    ///
    /// `GET /XML_LogFile`
    pub async fn admon_log_file(&self) -> Result<String, Error> {
        let url = self.endpoint_url(ADMON_LOG_PATH, &[])?;
        log_text(&self.fetch(url).await?)
    }
}
