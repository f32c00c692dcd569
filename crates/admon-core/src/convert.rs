// ── Row-to-domain conversions ──
//
// Bridges the attribute rows of the node list document into `Node` values.
// A row is `{group, nodeNumID, value}`; the element text is the string ID.

use admon_api::Row;
use admon_api::nodes::{GROUP_ATTR, NODE_NUM_ID_ATTR};
use admon_api::xml::ROW_VALUE_KEY;
use tracing::warn;

use crate::error::CoreError;
use crate::model::{DEFAULT_GROUP, Node, NodeType};
use crate::store::Groups;

/// Build one node from a node list row.
///
/// A row without a `group` attribute lands in the default group. A row
/// without a string ID or with a numeric ID outside `u16` is rejected.
pub fn node_from_row(row: &Row, node_type: NodeType) -> Result<Node, CoreError> {
    let id = row
        .get(ROW_VALUE_KEY)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CoreError::InvalidNodeId {
            value: format!("{row:?}"),
        })?;

    let raw_num_id = row.get(NODE_NUM_ID_ATTR).map_or("", String::as_str);
    let num_id = raw_num_id
        .trim()
        .parse::<u16>()
        .map_err(|_| CoreError::InvalidNodeId {
            value: format!("{id}: nodeNumID {raw_num_id:?}"),
        })?;

    let group = row.get(GROUP_ATTR).map_or(DEFAULT_GROUP, String::as_str);

    Ok(Node::new(num_id, id, group, node_type))
}

/// Group every well-formed row by failover group. Malformed rows are
/// logged and skipped so one bad entry never blocks the rest of a cycle.
pub fn groups_from_rows(rows: &[Row], node_type: NodeType) -> Groups {
    rows.iter()
        .filter_map(|row| match node_from_row(row, node_type) {
            Ok(node) => Some(node),
            Err(e) => {
                warn!(%node_type, error = %e, "skipping malformed node row");
                None
            }
        })
        .collect()
}
