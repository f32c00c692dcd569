//! Shared helpers for command handlers.

use std::sync::Arc;

use admon_core::{AdmonConfig, Node, NodeHandle, NodeRegistry, NodeType, Poller};
use tabled::Tabled;

use crate::error::CliError;

/// Fetch the node list once into a fresh registry.
///
/// Any category that fails to load fails the command: a partial listing
/// would silently hide nodes.
pub async fn load_registry(config: &AdmonConfig) -> Result<Arc<NodeRegistry>, CliError> {
    let registry = Arc::new(NodeRegistry::new());
    let poller = Poller::from_config(config, Arc::clone(&registry))?;

    let report = poller.poll_once().await;
    if let Some((_, err)) = report.failed.into_iter().next() {
        return Err(err.into());
    }
    Ok(registry)
}

/// Resolve a node by numeric ID, typed ID (`"<id> [ID: <num>]"`), or
/// string ID, in that order.
pub fn resolve_node(
    registry: &NodeRegistry,
    identifier: &str,
    node_type: NodeType,
) -> Result<NodeHandle, CliError> {
    Ok(registry.find_node(identifier, node_type)?)
}

// ── Node table row ──────────────────────────────────────────────────

#[derive(Tabled)]
pub struct NodeRow {
    #[tabled(rename = "Type")]
    node_type: String,
    #[tabled(rename = "Num ID")]
    num_id: u16,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Group")]
    group: String,
}

impl From<&Node> for NodeRow {
    fn from(n: &Node) -> Self {
        Self {
            node_type: n.node_type.to_string(),
            num_id: n.num_id,
            id: n.id.clone(),
            group: n.group.clone(),
        }
    }
}
