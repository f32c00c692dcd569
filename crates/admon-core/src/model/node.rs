// ── Node domain types ──

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use admon_api::NodeCategory;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::CoreError;

/// Group the service reports for nodes outside any failover group.
pub const DEFAULT_GROUP: &str = "Default";

/// Role of a registry node.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    #[strum(to_string = "meta", serialize = "metadata")]
    #[serde(rename = "meta", alias = "metadata")]
    Metadata,
    #[strum(to_string = "storage")]
    Storage,
}

impl NodeType {
    /// Section of the node list this role is read from.
    pub fn category(self) -> NodeCategory {
        match self {
            Self::Metadata => NodeCategory::Meta,
            Self::Storage => NodeCategory::Storage,
        }
    }
}

/// Registry identity: two nodes with the same numeric ID but different
/// roles are different entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeKey {
    pub num_id: u16,
    pub node_type: NodeType,
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.node_type, self.num_id)
    }
}

// ── Node ────────────────────────────────────────────────────────────

/// One cluster member as reported by the service.
///
/// `PartialEq` compares every field; registry identity is [`NodeKey`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub num_id: u16,
    pub id: String,
    pub group: String,
    pub node_type: NodeType,
}

impl Node {
    pub fn new(
        num_id: u16,
        id: impl Into<String>,
        group: impl Into<String>,
        node_type: NodeType,
    ) -> Self {
        Self {
            num_id,
            id: id.into(),
            group: group.into(),
            node_type,
        }
    }

    /// Build a node from its `"<id> [ID: <num>]"` label, in the default
    /// group.
    pub fn from_typed_id(typed_id: &str, node_type: NodeType) -> Result<Self, CoreError> {
        let TypedNodeId { id, num_id } = typed_id.parse()?;
        Ok(Self::new(num_id, id, DEFAULT_GROUP, node_type))
    }

    pub fn key(&self) -> NodeKey {
        NodeKey {
            num_id: self.num_id,
            node_type: self.node_type,
        }
    }

    /// Display label combining both IDs, e.g. `"meta01 [ID: 1]"`.
    pub fn typed_id(&self) -> String {
        TypedNodeId::new(self.id.clone(), self.num_id).to_string()
    }
}

// ── Typed node ID ───────────────────────────────────────────────────

const TYPED_ID_OPEN: &str = " [ID: ";

/// The `"<id> [ID: <num>]"` label used in menus and log requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypedNodeId {
    pub id: String,
    pub num_id: u16,
}

impl TypedNodeId {
    pub fn new(id: impl Into<String>, num_id: u16) -> Self {
        Self {
            id: id.into(),
            num_id,
        }
    }
}

impl fmt::Display for TypedNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{TYPED_ID_OPEN}{}]", self.id, self.num_id)
    }
}

impl FromStr for TypedNodeId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidNodeId {
            value: s.to_owned(),
        };
        let (id, num) = s
            .strip_suffix(']')
            .and_then(|rest| rest.rsplit_once(TYPED_ID_OPEN))
            .ok_or_else(invalid)?;
        if id.is_empty() {
            return Err(invalid());
        }
        let num_id = num.trim().parse::<u16>().map_err(|_| invalid())?;
        Ok(Self::new(id, num_id))
    }
}

/// Split a typed node ID into its string and numeric parts.
pub fn parse_typed_node_id(typed_id: &str) -> Result<TypedNodeId, CoreError> {
    typed_id.parse()
}

// ── Shared handle ───────────────────────────────────────────────────

/// A stored node, shared between the collection that owns it and any
/// caller that looked it up. Merges overwrite the fields in place, so a
/// handle obtained earlier observes later updates.
#[derive(Debug, Clone)]
pub struct NodeHandle(Arc<RwLock<Node>>);

impl NodeHandle {
    pub fn new(node: Node) -> Self {
        Self(Arc::new(RwLock::new(node)))
    }

    fn read(&self) -> RwLockReadGuard<'_, Node> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current field values.
    pub fn snapshot(&self) -> Node {
        self.read().clone()
    }

    pub fn key(&self) -> NodeKey {
        self.read().key()
    }

    pub fn num_id(&self) -> u16 {
        self.read().num_id
    }

    pub fn id(&self) -> String {
        self.read().id.clone()
    }

    pub fn group(&self) -> String {
        self.read().group.clone()
    }

    pub fn node_type(&self) -> NodeType {
        self.read().node_type
    }

    pub fn typed_id(&self) -> String {
        self.read().typed_id()
    }

    pub(crate) fn in_group(&self, group: &str) -> bool {
        self.read().group == group
    }

    /// Overwrite every field from `node`.
    pub(crate) fn update_from(&self, node: &Node) {
        let mut stored = self.0.write().unwrap_or_else(PoisonError::into_inner);
        stored.id.clone_from(&node.id);
        stored.num_id = node.num_id;
        stored.group.clone_from(&node.group);
        stored.node_type = node.node_type;
    }

    /// Whether both handles point at the same stored node.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<Node> for NodeHandle {
    fn from(node: Node) -> Self {
        Self::new(node)
    }
}
