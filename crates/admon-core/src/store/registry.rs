// ── Node registry ──
//
// The long-lived, UI-visible set of known nodes. One `RwLock` guards both
// role collections: a merge holds the write lock for its whole batch, so
// readers see the registry either before or after a cycle, never in
// between. Change notification goes through `watch` channels.

use std::collections::{BTreeSet, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::debug;

use super::groups::Groups;
use super::nodes::{BulkOutcome, NodeCollection, Nodes};
use super::typed::TypedNodes;
use crate::error::CoreError;
use crate::model::{Node, NodeHandle, NodeKey, NodeType, parse_typed_node_id};

#[derive(Debug)]
struct RegistryState {
    meta: TypedNodes,
    storage: TypedNodes,
}

impl RegistryState {
    fn typed(&self, node_type: NodeType) -> &TypedNodes {
        match node_type {
            NodeType::Metadata => &self.meta,
            NodeType::Storage => &self.storage,
        }
    }

    fn typed_mut(&mut self, node_type: NodeType) -> &mut TypedNodes {
        match node_type {
            NodeType::Metadata => &mut self.meta,
            NodeType::Storage => &mut self.storage,
        }
    }

    fn all(&self) -> impl Iterator<Item = &NodeHandle> {
        self.meta.storage().iter().chain(self.storage.storage().iter())
    }
}

/// What one merge did to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    pub node_type: NodeType,
    pub outcome: BulkOutcome,
    /// Nodes removed because the response no longer listed them.
    pub pruned: Vec<Node>,
}

/// Registry of metadata and storage nodes.
#[derive(Debug)]
pub struct NodeRegistry {
    state: RwLock<RegistryState>,
    version: watch::Sender<u64>,
    last_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeRegistry {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0);
        let (last_refresh, _) = watch::channel(None);
        Self {
            state: RwLock::new(RegistryState {
                meta: TypedNodes::new(NodeType::Metadata),
                storage: TypedNodes::new(NodeType::Storage),
            }),
            version,
            last_refresh,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn bump_version(&self) {
        self.version.send_modify(|v| *v += 1);
    }

    // ── Merge ────────────────────────────────────────────────────────

    /// Merge one fetched category into the registry.
    ///
    /// Every node is applied with `add_or_update_node` against the
    /// collection for `node_type`; nodes of another role are rejected.
    /// With `prune`, entries of that role missing from `groups` are
    /// removed afterwards. The whole batch runs under one write lock.
    pub fn merge_groups(&self, node_type: NodeType, groups: &Groups, prune: bool) -> MergeReport {
        let mut pruned = Vec::new();
        let outcome = {
            let mut state = self.write();
            let typed = state.typed_mut(node_type);
            let outcome = typed.add_or_update_nodes(groups.nodes());

            if prune {
                let incoming: HashSet<NodeKey> = groups.nodes().map(|n| n.key()).collect();
                let stale: Vec<Node> = typed
                    .storage()
                    .iter()
                    .filter(|h| !incoming.contains(&h.key()))
                    .map(NodeHandle::snapshot)
                    .collect();
                for node in stale {
                    if typed.remove(&node) {
                        pruned.push(node);
                    }
                }
            }
            outcome
        };

        self.bump_version();
        self.last_refresh.send_replace(Some(Utc::now()));
        debug!(
            %node_type,
            applied = outcome.applied,
            rejected = outcome.rejected.len(),
            pruned = pruned.len(),
            "merged node list"
        );

        MergeReport {
            node_type,
            outcome,
            pruned,
        }
    }

    // ── Single-node mutation ─────────────────────────────────────────

    pub fn add(&self, node: Node) -> bool {
        let ok = self.write().typed_mut(node.node_type).add(node);
        self.bump_version();
        ok
    }

    pub fn add_or_update_node(&self, node: Node) -> bool {
        let ok = self
            .write()
            .typed_mut(node.node_type)
            .add_or_update_node(node);
        self.bump_version();
        ok
    }

    /// Merge a batch under one write lock.
    pub fn add_or_update_nodes<I>(&self, nodes: I) -> BulkOutcome
    where
        I: IntoIterator<Item = Node>,
    {
        let mut outcome = BulkOutcome::default();
        {
            let mut state = self.write();
            for node in nodes {
                let ok = state
                    .typed_mut(node.node_type)
                    .add_or_update_node(node.clone());
                outcome.record(ok, node);
            }
        }
        self.bump_version();
        outcome
    }

    pub fn remove(&self, num_id: u16, node_type: NodeType) -> bool {
        let removed = self.write().typed_mut(node_type).remove_num_id(num_id, node_type);
        if removed {
            self.bump_version();
        }
        removed
    }

    /// Remove every node, of either role, in `group`.
    pub fn remove_group(&self, group: &str) -> BulkOutcome {
        let outcome = {
            let mut state = self.write();
            let mut outcome = state.meta.remove_group(group);
            outcome.absorb(state.storage.remove_group(group));
            outcome
        };
        if outcome.applied > 0 {
            self.bump_version();
        }
        outcome
    }

    pub fn clear(&self) {
        {
            let mut state = self.write();
            state.meta.clear();
            state.storage.clear();
        }
        self.bump_version();
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn get_node(&self, num_id: u16, node_type: NodeType) -> Option<NodeHandle> {
        self.read().typed(node_type).get(num_id)
    }

    pub fn get_node_by_id(&self, id: &str, node_type: NodeType) -> Option<NodeHandle> {
        self.read().typed(node_type).get_by_id(id)
    }

    /// Look a node up by numeric ID, typed ID (`"<id> [ID: <num>]"`) or
    /// string ID, in that order.
    pub fn find_node(
        &self,
        identifier: &str,
        node_type: NodeType,
    ) -> Result<NodeHandle, CoreError> {
        let found = if let Ok(num_id) = identifier.trim().parse::<u16>() {
            self.get_node(num_id, node_type)
        } else if let Ok(typed) = parse_typed_node_id(identifier) {
            self.get_node(typed.num_id, node_type)
        } else {
            self.get_node_by_id(identifier, node_type)
        };
        found.ok_or_else(|| CoreError::NodeNotFound {
            identifier: format!("{identifier} ({node_type})"),
        })
    }

    pub fn contains(&self, num_id: u16, node_type: NodeType) -> bool {
        self.read().typed(node_type).has(num_id)
    }

    /// Detached copy of the members of `group` with role `node_type`.
    /// Use [`get_node`](Self::get_node) for a handle that follows merges.
    pub fn get_nodes(&self, group: &str, node_type: NodeType) -> Nodes {
        self.read().typed(node_type).group(group)
    }

    /// Detached copy of the members of `group` of either role, metadata
    /// first.
    pub fn group(&self, name: &str) -> Nodes {
        let state = self.read();
        let mut nodes = Nodes::new();
        for handle in state.all().filter(|h| h.in_group(name)) {
            nodes.insert_copy(handle);
        }
        nodes
    }

    /// Like [`group`](Self::group), but a group without members is an
    /// error.
    pub fn group_members(&self, name: &str) -> Result<Nodes, CoreError> {
        let members = self.group(name);
        if members.is_empty() {
            return Err(CoreError::GroupNotFound {
                name: name.to_owned(),
            });
        }
        Ok(members)
    }

    /// Sorted names of every group with at least one node.
    pub fn group_names(&self) -> Vec<String> {
        let state = self.read();
        let names: BTreeSet<String> = state.all().map(NodeHandle::group).collect();
        names.into_iter().collect()
    }

    /// Detached copy of every node of one role.
    pub fn nodes(&self, node_type: NodeType) -> Nodes {
        self.read().typed(node_type).as_nodes().detached()
    }

    /// Copies of every node, metadata first.
    pub fn all_nodes(&self) -> Vec<Node> {
        self.read().all().map(NodeHandle::snapshot).collect()
    }

    pub fn len(&self) -> usize {
        let state = self.read();
        state.meta.len() + state.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len_of(&self, node_type: NodeType) -> usize {
        self.read().typed(node_type).len()
    }

    // ── Change notification ──────────────────────────────────────────

    /// Counter bumped after every write.
    pub fn version(&self) -> u64 {
        *self.version.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    /// Time of the last merge from the service.
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }

    pub fn subscribe_last_refresh(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.last_refresh.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::DEFAULT_GROUP;
    use pretty_assertions::assert_eq;

    fn meta(num_id: u16, group: &str) -> Node {
        Node::new(num_id, format!("meta{num_id:02}"), group, NodeType::Metadata)
    }

    fn storage(num_id: u16, group: &str) -> Node {
        Node::new(num_id, format!("stor{num_id:02}"), group, NodeType::Storage)
    }

    fn groups(nodes: impl IntoIterator<Item = Node>) -> Groups {
        nodes.into_iter().collect()
    }

    #[test]
    fn merge_is_idempotent() {
        let registry = NodeRegistry::new();
        let batch = groups([meta(1, "a"), meta(2, "b")]);

        registry.merge_groups(NodeType::Metadata, &batch, false);
        let report = registry.merge_groups(NodeType::Metadata, &batch, false);

        assert!(report.outcome.is_success());
        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.get_node(1, NodeType::Metadata).unwrap().snapshot(),
            meta(1, "a")
        );
    }

    #[test]
    fn merge_updates_held_handles() {
        let registry = NodeRegistry::new();
        registry.merge_groups(NodeType::Storage, &groups([storage(3, "a")]), false);
        let held = registry.get_node(3, NodeType::Storage).unwrap();

        let mut moved = storage(3, "b");
        moved.id = "stor03-renamed".into();
        registry.merge_groups(NodeType::Storage, &groups([moved]), false);

        assert_eq!(held.group(), "b");
        assert_eq!(held.id(), "stor03-renamed");
    }

    #[test]
    fn merge_rejects_nodes_of_the_other_role() {
        let registry = NodeRegistry::new();
        let report = registry.merge_groups(
            NodeType::Metadata,
            &groups([meta(1, DEFAULT_GROUP), storage(2, DEFAULT_GROUP)]),
            false,
        );

        assert!(!report.outcome.is_success());
        assert_eq!(report.outcome.rejected, vec![storage(2, DEFAULT_GROUP)]);
        assert!(registry.contains(1, NodeType::Metadata));
        assert!(!registry.contains(2, NodeType::Storage));
    }

    #[test]
    fn merge_without_prune_keeps_vanished_nodes() {
        let registry = NodeRegistry::new();
        registry.merge_groups(NodeType::Metadata, &groups([meta(1, "a"), meta(2, "a")]), false);
        registry.merge_groups(NodeType::Metadata, &groups([meta(1, "a")]), false);
        assert_eq!(registry.len_of(NodeType::Metadata), 2);
    }

    #[test]
    fn merge_with_prune_drops_vanished_nodes_of_that_role_only() {
        let registry = NodeRegistry::new();
        registry.merge_groups(NodeType::Metadata, &groups([meta(1, "a"), meta(2, "a")]), true);
        registry.merge_groups(NodeType::Storage, &groups([storage(1, "a")]), true);

        let report = registry.merge_groups(NodeType::Metadata, &groups([meta(2, "a")]), true);

        assert_eq!(report.pruned, vec![meta(1, "a")]);
        assert!(!registry.contains(1, NodeType::Metadata));
        assert!(registry.contains(1, NodeType::Storage));
    }

    #[test]
    fn group_queries() {
        let registry = NodeRegistry::new();
        registry.add_or_update_nodes([meta(1, "rack-b"), meta(2, "Default"), storage(1, "rack-b")]);

        assert_eq!(registry.group_names(), vec!["Default", "rack-b"]);
        assert_eq!(registry.group("rack-b").len(), 2);
        assert_eq!(
            registry.get_nodes("rack-b", NodeType::Storage).to_vec(),
            vec![storage(1, "rack-b")]
        );
        assert!(registry.group("nope").is_empty());
    }

    #[test]
    fn collection_queries_cannot_write_into_the_registry() {
        let registry = NodeRegistry::new();
        registry.add(meta(1, "a"));
        let version = registry.version();
        let intruder = Node::new(1, "hijacked", "z", NodeType::Metadata);

        let mut by_group = registry.get_nodes("a", NodeType::Metadata);
        assert!(by_group.add_or_update_node(intruder.clone()));
        let mut whole_group = registry.group("a");
        assert!(whole_group.add_or_update_node(intruder.clone()));
        let mut by_role = registry.nodes(NodeType::Metadata);
        assert!(by_role.add_or_update_node(intruder));

        assert_eq!(
            registry.get_node(1, NodeType::Metadata).unwrap().snapshot(),
            meta(1, "a")
        );
        assert_eq!(registry.version(), version);
    }

    #[test]
    fn collection_queries_do_not_follow_later_merges() {
        let registry = NodeRegistry::new();
        registry.add(meta(1, "a"));
        let before = registry.get_nodes("a", NodeType::Metadata);

        registry.add_or_update_node(meta(1, "b"));

        assert_eq!(before.to_vec(), vec![meta(1, "a")]);
        assert!(registry.get_nodes("a", NodeType::Metadata).is_empty());
    }

    #[test]
    fn lookup_by_string_id_and_removal() {
        let registry = NodeRegistry::new();
        registry.add(meta(5, "a"));

        assert_eq!(
            registry.get_node_by_id("meta05", NodeType::Metadata).unwrap().num_id(),
            5
        );
        assert!(registry.remove(5, NodeType::Metadata));
        assert!(!registry.remove(5, NodeType::Metadata));
        assert!(registry.is_empty());
    }

    #[test]
    fn find_node_accepts_every_identifier_form() {
        let registry = NodeRegistry::new();
        registry.add_or_update_nodes([meta(1, "a"), storage(7, "a")]);

        for id in ["1", " 1 ", "meta01", "meta01 [ID: 1]"] {
            assert_eq!(registry.find_node(id, NodeType::Metadata).unwrap().num_id(), 1);
        }
        assert_eq!(
            registry.find_node("whatever [ID: 7]", NodeType::Storage).unwrap().id(),
            "stor07"
        );

        let err = registry.find_node("7", NodeType::Metadata).unwrap_err();
        assert!(matches!(
            err,
            CoreError::NodeNotFound { ref identifier } if identifier == "7 (meta)"
        ));
    }

    #[test]
    fn group_members_requires_a_known_group() {
        let registry = NodeRegistry::new();
        registry.add_or_update_nodes([meta(1, "a"), storage(1, "a")]);

        assert_eq!(registry.group_members("a").unwrap().len(), 2);
        assert!(matches!(
            registry.group_members("b"),
            Err(CoreError::GroupNotFound { ref name }) if name == "b"
        ));
    }

    #[test]
    fn remove_group_spans_roles() {
        let registry = NodeRegistry::new();
        registry.add_or_update_nodes([meta(1, "a"), storage(1, "a"), meta(2, "b")]);

        let outcome = registry.remove_group("a");
        assert_eq!(outcome.applied, 2);
        assert_eq!(registry.all_nodes(), vec![meta(2, "b")]);

        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn writes_bump_version_and_merges_stamp_refresh_time() {
        let registry = NodeRegistry::new();
        let rx = registry.subscribe();
        assert_eq!(registry.version(), 0);
        assert!(registry.last_refresh().is_none());

        registry.merge_groups(NodeType::Metadata, &groups([meta(1, "a")]), false);

        assert_eq!(registry.version(), 1);
        assert!(rx.has_changed().unwrap());
        assert!(registry.last_refresh().is_some());
    }

    #[test]
    fn readers_never_see_a_partial_merge() {
        const BATCH: u16 = 64;
        let registry = NodeRegistry::new();
        let low = groups((0..BATCH).map(|i| meta(i, "low")));
        let high = groups((BATCH..2 * BATCH).map(|i| meta(i, "high")));
        registry.merge_groups(NodeType::Metadata, &low, true);

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for round in 0..200 {
                    let batch = if round % 2 == 0 { &high } else { &low };
                    registry.merge_groups(NodeType::Metadata, batch, true);
                }
            });

            for _ in 0..500 {
                let nodes = registry.nodes(NodeType::Metadata).to_vec();
                assert_eq!(nodes.len(), usize::from(BATCH));
                let first_group = nodes[0].group.clone();
                assert!(nodes.iter().all(|n| n.group == first_group));
            }
        });
    }

    #[test]
    fn readers_never_see_a_partial_in_place_update() {
        const BATCH: u16 = 64;
        let version_of = |tag: &str| -> Vec<Node> {
            (0..BATCH)
                .map(|i| Node::new(i, format!("{tag}-{i}"), tag, NodeType::Storage))
                .collect()
        };
        let registry = NodeRegistry::new();
        registry.add_or_update_nodes(version_of("x"));

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for round in 0..200 {
                    let tag = if round % 2 == 0 { "y" } else { "x" };
                    let outcome = registry.add_or_update_nodes(version_of(tag));
                    assert_eq!(outcome.applied, usize::from(BATCH));
                }
            });

            for round in 0..500 {
                // A single lookup never mixes fields from two writes.
                let node = registry
                    .get_node(round % BATCH, NodeType::Storage)
                    .unwrap()
                    .snapshot();
                assert_eq!(node.id, format!("{}-{}", node.group, node.num_id));

                // A collection query sees the batch entirely applied or not at all.
                let nodes = registry.nodes(NodeType::Storage).to_vec();
                assert_eq!(nodes.len(), usize::from(BATCH));
                let first_group = nodes[0].group.clone();
                assert!(nodes.iter().all(|n| n.group == first_group));
            }
        });
    }
}
