// Node list endpoint
//
// One request returns every node category the service knows about, each
// as a section of `<node group=".." nodeNumID="..">nodeID</node>` rows.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::client::AdmonClient;
use crate::error::Error;
use crate::xml::{Row, XmlDocument};

/// Path of the node list document.
pub const NODE_LIST_PATH: &str = "/XML_NodeList";

/// Row attribute holding the failover group name.
pub const GROUP_ATTR: &str = "group";

/// Row attribute holding the numeric node ID.
pub const NODE_NUM_ID_ATTR: &str = "nodeNumID";

/// Section of the node list document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeCategory {
    Mgmtd,
    Meta,
    Storage,
    Client,
    Admon,
}

impl NodeCategory {
    pub const ALL: [Self; 5] = [
        Self::Mgmtd,
        Self::Meta,
        Self::Storage,
        Self::Client,
        Self::Admon,
    ];

    /// Element name of the section in the node list document.
    pub fn element(self) -> &'static str {
        match self {
            Self::Mgmtd => "mgmtd",
            Self::Meta => "meta",
            Self::Storage => "storage",
            Self::Client => "client",
            Self::Admon => "admon",
        }
    }
}

impl fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element())
    }
}

impl FromStr for NodeCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.element().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownName {
                kind: "node category",
                value: s.to_owned(),
            })
    }
}

/// Optional sections of the node list.
///
/// Management, metadata and storage daemons are always listed; clients and
/// the admon daemon itself only on request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeListOptions {
    pub clients: bool,
    pub admon: bool,
}

impl NodeListOptions {
    pub fn with_clients(mut self) -> Self {
        self.clients = true;
        self
    }

    pub fn with_admon(mut self) -> Self {
        self.admon = true;
        self
    }

    fn query(self) -> Vec<(&'static str, &'static str)> {
        let mut query = Vec::new();
        if self.clients {
            query.push(("clients", "true"));
        }
        if self.admon {
            query.push(("admon", "true"));
        }
        query
    }
}

impl AdmonClient {
    /// Fetch the full node list document.
    ///
    /// `GET /XML_NodeList[?clients=true][&admon=true]`
    pub async fn node_list(&self, options: NodeListOptions) -> Result<XmlDocument, Error> {
        let url = self.endpoint_url(NODE_LIST_PATH, &options.query())?;
        self.fetch(url).await
    }

    /// Fetch the rows of one node category.
    ///
    /// Requests the optional sections when the category needs them, and
    /// fails with [`Error::MissingElement`] if the service omits the
    /// section entirely.
    pub async fn list_nodes(&self, category: NodeCategory) -> Result<Vec<Row>, Error> {
        let options = match category {
            NodeCategory::Client => NodeListOptions::default().with_clients(),
            NodeCategory::Admon => NodeListOptions::default().with_admon(),
            _ => NodeListOptions::default(),
        };
        let doc = self.node_list(options).await?;
        let rows = doc.rows(category.element())?.to_vec();
        debug!(%category, count = rows.len(), "fetched node rows");
        Ok(rows)
    }
}
