// Admon HTTP client
//
// Wraps `reqwest::Client` with admon URL construction and XML document
// parsing. Endpoint modules (nodes, logs) are implemented as inherent
// methods in separate files to keep this module focused on transport
// mechanics.

use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;
use crate::xml::XmlDocument;

/// Raw HTTP client for the admon service.
///
/// Every response is an XML document; `<error>` replies are turned into
/// [`Error::Server`] before the caller sees them.
#[derive(Debug, Clone)]
pub struct AdmonClient {
    http: reqwest::Client,
    base_url: Url,
}

impl AdmonClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the service root, e.g. `http://localhost:8000`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// Convenience constructor from a URL string, used by tests.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self::with_client(http, Url::parse(base_url)?))
    }

    /// The service base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}{path}?k=v&...`.
    ///
    /// Query values are percent-encoded, so node IDs containing spaces or
    /// reserved characters survive the trip.
    pub fn endpoint_url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, Error> {
        let mut url = self.base_url.join(path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and parse the XML document.
    pub async fn fetch(&self, url: Url) -> Result<XmlDocument, Error> {
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        XmlDocument::parse(&body)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> AdmonClient {
        AdmonClient::from_reqwest(base, reqwest::Client::new()).unwrap()
    }

    #[test]
    fn endpoint_url_without_query() {
        let url = client("http://localhost:8000")
            .endpoint_url("/XML_NodeList", &[])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/XML_NodeList");
    }

    #[test]
    fn endpoint_url_encodes_query_values() {
        let url = client("http://admon.example:8000/")
            .endpoint_url(
                "/XML_RemoteLogFile",
                &[("service", "meta"), ("node", "node 01&x"), ("lines", "50")],
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://admon.example:8000/XML_RemoteLogFile?service=meta&node=node+01%26x&lines=50"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            AdmonClient::from_reqwest("not a url", reqwest::Client::new()),
            Err(Error::InvalidUrl(_))
        ));
    }
}
