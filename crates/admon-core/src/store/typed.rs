use crate::model::{NodeHandle, NodeType};

use super::nodes::{NodeCollection, Nodes};

/// A node collection restricted to one role. Every mutation carrying a
/// node of another role returns `false` and leaves the collection as it
/// was.
#[derive(Debug, Clone)]
pub struct TypedNodes {
    node_type: NodeType,
    nodes: Nodes,
}

impl TypedNodes {
    pub fn new(node_type: NodeType) -> Self {
        Self {
            node_type,
            nodes: Nodes::new(),
        }
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    /// Whether a node with this numeric ID is stored.
    pub fn has(&self, num_id: u16) -> bool {
        self.contains_num_id(num_id, self.node_type)
    }

    pub fn get(&self, num_id: u16) -> Option<NodeHandle> {
        self.get_node(num_id, self.node_type)
    }

    pub fn get_by_id(&self, id: &str) -> Option<NodeHandle> {
        self.get_node_by_id(id, self.node_type)
    }

    /// Members of `group`.
    pub fn group(&self, group: &str) -> Nodes {
        self.get_nodes(group, self.node_type)
    }

    pub fn as_nodes(&self) -> &Nodes {
        &self.nodes
    }
}

impl NodeCollection for TypedNodes {
    fn storage(&self) -> &Nodes {
        &self.nodes
    }

    fn storage_mut(&mut self) -> &mut Nodes {
        &mut self.nodes
    }

    fn accepts(&self, node_type: NodeType) -> bool {
        node_type == self.node_type
    }
}
