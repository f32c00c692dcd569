// ── Node collections ──
//
// `Nodes` is an insertion-ordered map keyed by `(num_id, type)`. The
// `NodeCollection` trait carries every operation; implementors only
// decide which nodes they accept, which is how `TypedNodes` restricts
// itself to one role without duplicating the logic.

use indexmap::IndexMap;

use crate::model::{Node, NodeHandle, NodeKey, NodeType};

// ── Bulk outcome ────────────────────────────────────────────────────

/// Result of a bulk add, merge or removal. Nothing is rolled back: the
/// items that succeeded stay applied even when others were rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkOutcome {
    /// Items that succeeded.
    pub applied: usize,
    /// Items that failed, in input order.
    pub rejected: Vec<Node>,
}

impl BulkOutcome {
    pub(crate) fn record(&mut self, ok: bool, node: Node) {
        if ok {
            self.applied += 1;
        } else {
            self.rejected.push(node);
        }
    }

    /// Fold another outcome into this one.
    pub(crate) fn absorb(&mut self, other: BulkOutcome) {
        self.applied += other.applied;
        self.rejected.extend(other.rejected);
    }

    pub fn processed(&self) -> usize {
        self.applied + self.rejected.len()
    }

    /// `true` iff at least one item was processed and none failed.
    pub fn is_success(&self) -> bool {
        self.processed() > 0 && self.rejected.is_empty()
    }
}

// ── Storage ─────────────────────────────────────────────────────────

/// A set of nodes with unique `(num_id, type)` keys.
#[derive(Debug, Clone, Default)]
pub struct Nodes {
    entries: IndexMap<NodeKey, NodeHandle>,
}

impl Nodes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &NodeHandle> {
        self.entries.values()
    }

    /// Copies of every node's current fields, in insertion order.
    pub fn to_vec(&self) -> Vec<Node> {
        self.iter().map(NodeHandle::snapshot).collect()
    }

    pub fn keys(&self) -> impl Iterator<Item = &NodeKey> {
        self.entries.keys()
    }

    /// Deep copy: every entry gets a fresh handle, so writes to the copy
    /// never reach this collection.
    pub fn detached(&self) -> Nodes {
        let mut out = Nodes::new();
        for handle in self.iter() {
            out.insert_copy(handle);
        }
        out
    }

    pub(crate) fn insert_copy(&mut self, handle: &NodeHandle) {
        let copy = NodeHandle::new(handle.snapshot());
        self.entries.insert(copy.key(), copy);
    }
}

impl FromIterator<Node> for Nodes {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        let mut nodes = Self::new();
        for node in iter {
            nodes.add(node);
        }
        nodes
    }
}

impl<'a> IntoIterator for &'a Nodes {
    type Item = &'a NodeHandle;
    type IntoIter = indexmap::map::Values<'a, NodeKey, NodeHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}

impl NodeCollection for Nodes {
    fn storage(&self) -> &Nodes {
        self
    }

    fn storage_mut(&mut self) -> &mut Nodes {
        self
    }

    fn accepts(&self, _node_type: NodeType) -> bool {
        true
    }
}

// ── Operations ──────────────────────────────────────────────────────

/// Lookup, idempotent insert and merge over a node collection.
///
/// Mutators return `false` instead of failing; a node of a role the
/// collection does not accept is rejected without touching it.
pub trait NodeCollection {
    fn storage(&self) -> &Nodes;

    fn storage_mut(&mut self) -> &mut Nodes;

    /// Whether nodes of `node_type` may be stored here.
    fn accepts(&self, node_type: NodeType) -> bool;

    fn len(&self) -> usize {
        self.storage().entries.len()
    }

    fn is_empty(&self) -> bool {
        self.storage().entries.is_empty()
    }

    // ── Lookup ──

    fn contains(&self, node: &Node) -> bool {
        self.storage().entries.contains_key(&node.key())
    }

    fn contains_num_id(&self, num_id: u16, node_type: NodeType) -> bool {
        self.storage()
            .entries
            .contains_key(&NodeKey { num_id, node_type })
    }

    fn contains_id(&self, id: &str, node_type: NodeType) -> bool {
        self.get_node_by_id(id, node_type).is_some()
    }

    /// The stored node with this key. Later merges are visible through
    /// the returned handle.
    fn get_node(&self, num_id: u16, node_type: NodeType) -> Option<NodeHandle> {
        self.storage()
            .entries
            .get(&NodeKey { num_id, node_type })
            .cloned()
    }

    /// First stored node of `node_type` whose string ID is `id`.
    fn get_node_by_id(&self, id: &str, node_type: NodeType) -> Option<NodeHandle> {
        self.storage()
            .iter()
            .find(|h| h.node_type() == node_type && h.id() == id)
            .cloned()
    }

    /// Detached copy of the current members of `group` with role
    /// `node_type`. Neither membership nor fields follow later writes.
    fn get_nodes(&self, group: &str, node_type: NodeType) -> Nodes {
        let mut out = Nodes::new();
        for handle in self.storage().iter() {
            if handle.node_type() == node_type && handle.in_group(group) {
                out.insert_copy(handle);
            }
        }
        out
    }

    /// Like [`get_nodes`](Self::get_nodes) for every role.
    fn get_group_nodes(&self, group: &str) -> Nodes {
        let mut out = Nodes::new();
        for handle in self.storage().iter() {
            if handle.in_group(group) {
                out.insert_copy(handle);
            }
        }
        out
    }

    // ── Single-node mutation ──

    /// Insert `node` unless an entry with its key exists. `true` when the
    /// key is present afterwards.
    fn add(&mut self, node: Node) -> bool {
        if !self.accepts(node.node_type) {
            return false;
        }
        let entries = &mut self.storage_mut().entries;
        entries
            .entry(node.key())
            .or_insert_with(|| NodeHandle::new(node));
        true
    }

    /// Overwrite the fields of the entry with `node`'s key in place, or
    /// insert it.
    fn add_or_update_node(&mut self, node: Node) -> bool {
        if !self.accepts(node.node_type) {
            return false;
        }
        match self.storage().entries.get(&node.key()) {
            Some(existing) => {
                existing.update_from(&node);
                true
            }
            None => self.add(node),
        }
    }

    fn remove(&mut self, node: &Node) -> bool {
        self.remove_num_id(node.num_id, node.node_type)
    }

    fn remove_num_id(&mut self, num_id: u16, node_type: NodeType) -> bool {
        if !self.accepts(node_type) {
            return false;
        }
        self.storage_mut()
            .entries
            .shift_remove(&NodeKey { num_id, node_type })
            .is_some()
    }

    fn remove_id(&mut self, id: &str, node_type: NodeType) -> bool {
        match self.get_node_by_id(id, node_type) {
            Some(handle) => {
                let key = handle.key();
                self.remove_num_id(key.num_id, key.node_type)
            }
            None => false,
        }
    }

    fn clear(&mut self) {
        self.storage_mut().entries.clear();
    }

    // ── Bulk mutation ──

    fn add_nodes<I>(&mut self, nodes: I) -> BulkOutcome
    where
        I: IntoIterator<Item = Node>,
        Self: Sized,
    {
        let mut outcome = BulkOutcome::default();
        for node in nodes {
            let ok = self.add(node.clone());
            outcome.record(ok, node);
        }
        outcome
    }

    fn add_or_update_nodes<I>(&mut self, nodes: I) -> BulkOutcome
    where
        I: IntoIterator<Item = Node>,
        Self: Sized,
    {
        let mut outcome = BulkOutcome::default();
        for node in nodes {
            let ok = self.add_or_update_node(node.clone());
            outcome.record(ok, node);
        }
        outcome
    }

    /// Remove each listed node; misses are reported as rejected.
    fn remove_nodes<I>(&mut self, nodes: I) -> BulkOutcome
    where
        I: IntoIterator<Item = Node>,
        Self: Sized,
    {
        let mut outcome = BulkOutcome::default();
        for node in nodes {
            let ok = self.remove(&node);
            outcome.record(ok, node);
        }
        outcome
    }

    /// Remove every member of `group`. Fails when the group had no
    /// members.
    fn remove_group(&mut self, group: &str) -> BulkOutcome
    where
        Self: Sized,
    {
        let members = self.get_group_nodes(group).to_vec();
        self.remove_nodes(members)
    }
}
