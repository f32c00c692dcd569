// ── Failover groups ──
//
// Transient aggregation built from one node list response: each node is
// filed under the group it names, so a group key always matches the
// `.group` of every node beneath it.

use std::collections::BTreeMap;

use crate::model::{Node, NodeHandle};

use super::nodes::{NodeCollection, Nodes};

#[derive(Debug, Clone, Default)]
pub struct Groups {
    groups: BTreeMap<String, Nodes>,
}

impl Groups {
    pub fn new() -> Self {
        Self::default()
    }

    /// File `node` under its own group.
    pub fn add(&mut self, node: Node) -> bool {
        self.groups.entry(node.group.clone()).or_default().add(node)
    }

    /// Group names in sorted order.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn group(&self, name: &str) -> Option<&Nodes> {
        self.groups.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Nodes)> {
        self.groups.iter().map(|(name, nodes)| (name.as_str(), nodes))
    }

    /// Every node in every group, group by group.
    pub fn nodes(&self) -> impl Iterator<Item = Node> + '_ {
        self.groups
            .values()
            .flat_map(|nodes| nodes.iter().map(NodeHandle::snapshot))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of nodes across groups.
    pub fn node_count(&self) -> usize {
        self.groups.values().map(<Nodes as NodeCollection>::len).sum()
    }
}

impl FromIterator<Node> for Groups {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        let mut groups = Self::new();
        for node in iter {
            groups.add(node);
        }
        groups
    }
}
