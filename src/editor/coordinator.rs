// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Graph State Coordinator.
//!
//! Sole owner of the live graph for one open profile. It applies edits,
//! reverse-converts after structural changes (immediately) or drags (after a
//! quiescence window), reconciles reloads, and publishes the canonical profile
//! to listeners. It knows nothing about rendering, timers or channels: time is
//! passed in explicitly by the caller.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::config::{EditorConfig, LayoutConfig};
use crate::editor::events::{GraphEdit, NodePatch};
use crate::editor::pending::{PendingSync, SyncState};
use crate::engine::decode::decode_profile_str;
use crate::engine::forward::forward_convert_with_layout;
use crate::engine::reverse::reverse_convert;
use crate::engine_core::errors::GraphError;
use crate::engine_core::graph::{
    EdgeId, GraphEdge, GraphNode, InterceptorGraph, NodeId, NodeKind, Position,
};
use crate::engine_core::models::{GuardProfile, InterceptorKind};
use crate::utils::fingerprint::{content_digest, ProfileIdentity};
use crate::utils::graph_validator::GraphValidator;

/// Receives the canonical profile after every completed reverse pass
pub trait ProfileListener: Send {
    fn on_change(&mut self, profile: &GuardProfile);
}

impl<F> ProfileListener for F
where
    F: FnMut(&GuardProfile) + Send,
{
    fn on_change(&mut self, profile: &GuardProfile) {
        self(profile)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// New identity: graph rebuilt, that identity's expanded flags restored
    Rebuilt,
    /// Same identity, new content: graph rebuilt, cosmetic state kept
    Refreshed,
    /// Same identity and content (e.g. our own emission echoed back)
    Unchanged,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub nodes: BTreeSet<NodeId>,
    pub edges: BTreeSet<EdgeId>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

pub struct GraphCoordinator {
    layout: LayoutConfig,
    identity: Option<ProfileIdentity>,
    graph: InterceptorGraph,
    selection: Selection,
    /// Expanded node ids per profile identity; survives switching profiles
    expanded: HashMap<Option<ProfileIdentity>, HashSet<NodeId>>,
    profile: GuardProfile,
    pending: PendingSync,
    listeners: Vec<Box<dyn ProfileListener>>,
    last_error: Option<GraphError>,
}

impl GraphCoordinator {
    pub fn new(config: &EditorConfig) -> Self {
        let layout = config.layout;
        Self {
            layout,
            identity: None,
            graph: Self::sentinels_only(&layout),
            selection: Selection::default(),
            expanded: HashMap::new(),
            profile: GuardProfile::default(),
            pending: PendingSync::new(config.drag_quiescence),
            listeners: Vec::new(),
            last_error: None,
        }
    }

    pub fn subscribe(&mut self, listener: impl ProfileListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    // --- Accessors ---

    pub fn graph(&self) -> &InterceptorGraph {
        &self.graph
    }

    /// Last successfully reverse-converted (or loaded) profile
    pub fn profile(&self) -> &GuardProfile {
        &self.profile
    }

    pub fn identity(&self) -> Option<&ProfileIdentity> {
        self.identity.as_ref()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn is_expanded(&self, id: &NodeId) -> bool {
        self.expanded
            .get(&self.identity)
            .is_some_and(|flags| flags.contains(id))
    }

    /// Failure of the most recent reverse pass, cleared by the next success
    pub fn last_error(&self) -> Option<&GraphError> {
        self.last_error.as_ref()
    }

    pub fn sync_state(&self) -> SyncState {
        self.pending.state()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.deadline()
    }

    // --- Loading ---

    /// Open `profile` under `key`. Never notifies listeners.
    pub fn load_profile(&mut self, key: &str, profile: GuardProfile) -> ReloadOutcome {
        let identity = ProfileIdentity::of(key, &profile);

        if self.identity.as_ref() == Some(&identity) {
            if profile == self.profile {
                trace!(identity = %identity, "Reload skipped; profile unchanged");
                return ReloadOutcome::Unchanged;
            }

            debug!(identity = %identity, "Refreshing graph for same profile");
            self.rebuild(profile);
            self.prune_expanded();
            self.selection.nodes.retain(|id| self.graph.contains_node(id));
            self.selection
                .edges
                .retain(|id| self.graph.edges.iter().any(|e| &e.id == id));
            return ReloadOutcome::Refreshed;
        }

        info!(identity = %identity, key = key, "Loading profile");
        self.identity = Some(identity);
        self.selection = Selection::default();
        self.rebuild(profile);
        self.prune_expanded();
        ReloadOutcome::Rebuilt
    }

    /// Companion text view. The graph changes only if `text` parses.
    pub fn load_json(&mut self, key: &str, text: &str) -> Result<ReloadOutcome, GraphError> {
        let decoded = decode_profile_str(text)?;
        if !decoded.is_clean() {
            warn!(
                issues = decoded.issues.len(),
                "Profile text contained unknown interceptors; defaults substituted"
            );
        }
        Ok(self.load_profile(key, decoded.profile))
    }

    fn rebuild(&mut self, profile: GuardProfile) {
        self.graph = forward_convert_with_layout(&profile, &self.layout);
        self.profile = profile;
        self.pending.reset();
        self.last_error = None;
    }

    fn sentinels_only(layout: &LayoutConfig) -> InterceptorGraph {
        InterceptorGraph {
            nodes: vec![
                GraphNode::input(Position::new(layout.origin_x, layout.origin_y)),
                GraphNode::output(Position::new(
                    layout.origin_x,
                    layout.origin_y + layout.step_y,
                )),
            ],
            edges: Vec::new(),
        }
    }

    // --- Mutation ---

    /// Public mutation entry point. A rejected edit leaves all state untouched.
    pub fn apply(&mut self, edit: GraphEdit, now: Instant) -> Result<(), GraphError> {
        let structural = edit.is_structural();

        match edit {
            GraphEdit::AddNodes(nodes) => self.add_nodes(nodes)?,
            GraphEdit::RemoveNodes(ids) => self.remove_nodes(&ids),
            GraphEdit::AddEdge { source, target } => self.add_edge(source, target)?,
            GraphEdit::RemoveEdges(ids) => self.remove_edges(&ids),
            GraphEdit::MoveNode {
                id,
                position,
                dragging,
            } => {
                let node = self
                    .graph
                    .node_mut(&id)
                    .ok_or_else(|| GraphError::UnknownNode(id.clone()))?;
                node.position = position;
                if dragging {
                    self.pending.mark_dirty();
                } else {
                    self.pending.schedule(now);
                }
            }
            GraphEdit::NodeEdited { id, patch } => self.edit_node(&id, patch)?,
            GraphEdit::PaletteAdd { kind, position } => self.palette_add(kind, position),
            GraphEdit::Select { nodes, edges } => self.select(nodes, edges),
            GraphEdit::DeleteSelection => {
                let selection = std::mem::take(&mut self.selection);
                let nodes: Vec<NodeId> = selection.nodes.into_iter().collect();
                let edges: Vec<EdgeId> = selection.edges.into_iter().collect();
                self.remove_edges(&edges);
                self.remove_nodes(&nodes);
            }
            GraphEdit::ToggleExpanded(id) => {
                if !self.graph.contains_node(&id) {
                    return Err(GraphError::UnknownNode(id));
                }
                let flags = self.expanded.entry(self.identity.clone()).or_default();
                if !flags.remove(&id) {
                    flags.insert(id);
                }
            }
        }

        if structural {
            self.pending.settle();
            self.run_pass();
        }
        Ok(())
    }

    /// Run the deferred drag pass if its deadline has passed
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.pending.poll(now) {
            debug!("Quiescence window elapsed; syncing positional edits");
            self.run_pass();
            true
        } else {
            false
        }
    }

    /// Run any pending pass immediately; true if one ran
    pub fn flush(&mut self) -> bool {
        if !self.pending.is_pending() {
            return false;
        }
        self.pending.settle();
        self.run_pass();
        true
    }

    fn add_nodes(&mut self, nodes: Vec<GraphNode>) -> Result<(), GraphError> {
        let mut incoming = HashSet::new();
        for node in &nodes {
            if node.is_sentinel() {
                return Err(GraphError::SentinelViolation(format!(
                    "cannot add another {:?} node",
                    node.kind
                )));
            }
            if self.graph.contains_node(&node.id) || !incoming.insert(&node.id) {
                return Err(GraphError::DuplicateNode(node.id.clone()));
            }
            if let Some(config) = &node.data {
                if node.kind.interceptor_kind() != Some(config.kind()) {
                    return Err(GraphError::InvalidPatch {
                        node: node.id.clone(),
                        reason: format!(
                            "node kind {:?} does not match its {} data",
                            node.kind,
                            config.kind()
                        ),
                    });
                }
            }
        }

        debug!(count = nodes.len(), "Adding nodes");
        self.graph.nodes.extend(nodes);
        Ok(())
    }

    fn remove_nodes(&mut self, ids: &[NodeId]) {
        let doomed: HashSet<&NodeId> = ids
            .iter()
            .filter(|id| match self.graph.node(id) {
                Some(node) if node.is_sentinel() => {
                    debug!(node = %id, "Ignoring request to delete a sentinel");
                    false
                }
                Some(_) => true,
                None => false,
            })
            .collect();

        if doomed.is_empty() {
            return;
        }

        debug!(count = doomed.len(), "Removing nodes");
        let attached: Vec<EdgeId> = doomed
            .iter()
            .flat_map(|id| self.graph.edges_connected_to(id))
            .collect();
        self.graph.nodes.retain(|n| !doomed.contains(&n.id));
        self.selection.nodes.retain(|id| !doomed.contains(id));
        self.remove_edges(&attached);
        self.prune_expanded();
    }

    fn add_edge(&mut self, source: NodeId, target: NodeId) -> Result<(), GraphError> {
        let source_node = self
            .graph
            .node(&source)
            .ok_or_else(|| GraphError::UnknownNode(source.clone()))?;
        let target_node = self
            .graph
            .node(&target)
            .ok_or_else(|| GraphError::UnknownNode(target.clone()))?;

        if source == target {
            return Err(GraphError::InvalidEdge(format!(
                "'{}' cannot connect to itself",
                source
            )));
        }
        if source_node.kind == NodeKind::Output {
            return Err(GraphError::InvalidEdge(
                "Output has no outgoing connections".to_string(),
            ));
        }
        if target_node.kind == NodeKind::Input {
            return Err(GraphError::InvalidEdge(
                "Input has no incoming connections".to_string(),
            ));
        }
        if self.graph.has_edge_between(&source, &target) {
            debug!(source = %source, target = %target, "Connection already exists");
            return Ok(());
        }

        debug!(source = %source, target = %target, "Connecting nodes");
        self.graph
            .edges
            .push(GraphEdge::new(EdgeId::generate(), source, target));
        Ok(())
    }

    fn remove_edges(&mut self, ids: &[EdgeId]) {
        if ids.is_empty() {
            return;
        }
        self.graph.edges.retain(|e| !ids.contains(&e.id));
        self.prune_edge_selection();
    }

    fn edit_node(&mut self, id: &NodeId, patch: NodePatch) -> Result<(), GraphError> {
        let node = self
            .graph
            .node_mut(id)
            .ok_or_else(|| GraphError::UnknownNode(id.clone()))?;
        if node.is_sentinel() {
            return Err(GraphError::SentinelViolation(format!(
                "{:?} has no editable properties",
                node.kind
            )));
        }

        let mut config = node.to_interceptor();
        patch.apply_to(id, &mut config)?;
        debug!(node = %id, kind = %config.kind(), "Node edited");
        node.data = Some(config);
        Ok(())
    }

    fn palette_add(&mut self, kind: InterceptorKind, position: Position) {
        let node = GraphNode::interceptor(NodeId::generate(kind), position, kind.default_config());
        info!(node = %node.id, kind = %kind, "Palette add; starting a fresh profile");

        let input = NodeId::input();
        let output = NodeId::output();
        self.graph.nodes.retain(|n| n.is_sentinel());
        self.graph.edges = vec![
            GraphEdge::linking(&input, &node.id),
            GraphEdge::linking(&node.id, &output),
        ];
        self.graph.nodes.push(node);

        self.selection = Selection::default();
        self.prune_expanded();
    }

    fn select(&mut self, nodes: Vec<NodeId>, edges: Vec<EdgeId>) {
        let graph = &self.graph;
        self.selection = Selection {
            nodes: nodes
                .into_iter()
                .filter(|id| graph.contains_node(id))
                .collect(),
            edges: edges
                .into_iter()
                .filter(|id| graph.edges.iter().any(|e| &e.id == id))
                .collect(),
        };
    }

    /// Drop expanded flags of the open profile whose nodes are gone
    fn prune_expanded(&mut self) {
        let graph = &self.graph;
        if let Some(flags) = self.expanded.get_mut(&self.identity) {
            flags.retain(|id| graph.contains_node(id));
        }
    }

    fn prune_edge_selection(&mut self) {
        let edges = &self.graph.edges;
        self.selection
            .edges
            .retain(|id| edges.iter().any(|e| &e.id == id));
    }

    // --- Sync ---

    fn run_pass(&mut self) {
        let profile = match reverse_convert(&self.graph) {
            Ok(profile) => profile,
            Err(e) => {
                warn!(error = %e, "Reverse conversion failed; keeping previous profile");
                self.last_error = Some(e);
                return;
            }
        };
        self.last_error = None;

        if tracing::enabled!(tracing::Level::DEBUG) {
            match GraphValidator::validate(&self.graph) {
                Ok(warnings) => {
                    for warning in warnings {
                        debug!(%warning, "Graph shape");
                    }
                }
                Err(e) => debug!(error = %e, "Graph shape invalid"),
            }
        }

        self.refresh_container(&profile);
        self.publish(profile);
    }

    /// Keep the chain container's data in step with the walked chain
    fn refresh_container(&mut self, profile: &GuardProfile) {
        if !profile.primary().is_chain() {
            return;
        }
        if let Some(container) = self.graph.nodes.iter_mut().find(|n| n.is_chain()) {
            container.data = Some(profile.primary().clone());
        }
    }

    fn publish(&mut self, profile: GuardProfile) {
        if profile != self.profile {
            debug!(digest = %content_digest(&profile), "Canonical profile changed");
        }
        self.profile = profile;
        for listener in &mut self.listeners {
            listener.on_change(&self.profile);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_core::models::MessageInterceptorConfig;

    #[test]
    fn test_initial_state_has_sentinels_only() {
        let coordinator = GraphCoordinator::new(&EditorConfig::default());
        assert_eq!(coordinator.graph().nodes.len(), 2);
        assert!(coordinator.graph().edges.is_empty());
        assert_eq!(coordinator.profile(), &GuardProfile::default());
        assert!(coordinator.identity().is_none());
    }

    #[test]
    fn test_rejected_edit_leaves_state_untouched() {
        let mut coordinator = GraphCoordinator::new(&EditorConfig::default());
        coordinator.load_profile(
            "p",
            GuardProfile::new(MessageInterceptorConfig::ManualApproval),
        );
        let before = coordinator.graph().clone();

        let result = coordinator.apply(
            GraphEdit::AddNodes(vec![
                GraphNode::interceptor(
                    NodeId::new("fresh"),
                    Position::default(),
                    MessageInterceptorConfig::ManualApproval,
                ),
                GraphNode::interceptor(
                    NodeId::new("primary"),
                    Position::default(),
                    MessageInterceptorConfig::ManualApproval,
                ),
            ]),
            Instant::now(),
        );

        assert!(matches!(result, Err(GraphError::DuplicateNode(_))));
        assert_eq!(coordinator.graph(), &before);
    }
}
