// ── Domain model ──

mod node;

pub use node::{DEFAULT_GROUP, Node, NodeHandle, NodeKey, NodeType, TypedNodeId, parse_typed_node_id};
