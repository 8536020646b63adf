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

//! Graph model mirroring a Guard Profile for visual editing.
//!
//! Nodes and edges are kept in insertion order. Edge order is significant:
//! the reverse converter follows the first outgoing edge of each node.

use crate::engine_core::constants::node_ids;
use crate::engine_core::models::{InterceptorKind, MessageInterceptorConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Newtype wrapper for type-safe node identification
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn input() -> Self {
        Self::new(node_ids::INPUT)
    }

    pub fn output() -> Self {
        Self::new(node_ids::OUTPUT)
    }

    /// Positional id of the `index`-th chain element
    pub fn chain_element(index: usize) -> Self {
        Self(format!("{}{}", node_ids::CHAIN_ELEMENT_PREFIX, index))
    }

    /// Random id for an interactively created node, e.g. `messagelog-3f2a...`
    pub fn generate(kind: InterceptorKind) -> Self {
        Self(format!(
            "{}-{}",
            kind.as_str().to_lowercase(),
            Uuid::new_v4().simple()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(String);

impl EdgeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Deterministic id used by the forward converter
    pub fn between(source: &NodeId, target: &NodeId) -> Self {
        Self(format!("{}{}-{}", node_ids::EDGE_PREFIX, source, target))
    }

    pub fn generate() -> Self {
        Self(format!("{}{}", node_ids::EDGE_PREFIX, Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EdgeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Input,
    Output,
    ManualApproval,
    MessageLog,
    Filter,
    Chain,
}

impl NodeKind {
    pub fn is_sentinel(&self) -> bool {
        matches!(self, NodeKind::Input | NodeKind::Output)
    }

    pub fn interceptor_kind(&self) -> Option<InterceptorKind> {
        match self {
            NodeKind::Input | NodeKind::Output => None,
            NodeKind::ManualApproval => Some(InterceptorKind::ManualApproval),
            NodeKind::MessageLog => Some(InterceptorKind::MessageLog),
            NodeKind::Filter => Some(InterceptorKind::Filter),
            NodeKind::Chain => Some(InterceptorKind::Chain),
        }
    }
}

impl From<InterceptorKind> for NodeKind {
    fn from(kind: InterceptorKind) -> Self {
        match kind {
            InterceptorKind::ManualApproval => NodeKind::ManualApproval,
            InterceptorKind::MessageLog => NodeKind::MessageLog,
            InterceptorKind::Filter => NodeKind::Filter,
            InterceptorKind::Chain => NodeKind::Chain,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub position: Position,
    /// Full interceptor fields; `None` for sentinels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<MessageInterceptorConfig>,
}

impl GraphNode {
    pub fn input(position: Position) -> Self {
        Self {
            id: NodeId::input(),
            kind: NodeKind::Input,
            position,
            data: None,
        }
    }

    pub fn output(position: Position) -> Self {
        Self {
            id: NodeId::output(),
            kind: NodeKind::Output,
            position,
            data: None,
        }
    }

    /// Interceptor node whose kind is derived from `config`
    pub fn interceptor(id: NodeId, position: Position, config: MessageInterceptorConfig) -> Self {
        Self {
            id,
            kind: config.kind().into(),
            position,
            data: Some(config),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.kind.is_sentinel()
    }

    pub fn is_chain(&self) -> bool {
        self.kind == NodeKind::Chain
    }

    /// Interceptor carried by this node. A node whose data went missing falls
    /// back to its kind's default, and to the Info log leaf if even that is unknown.
    pub fn to_interceptor(&self) -> MessageInterceptorConfig {
        match (&self.data, self.kind.interceptor_kind()) {
            (Some(config), _) => config.clone(),
            (None, Some(kind)) => kind.default_config(),
            (None, None) => MessageInterceptorConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
}

impl GraphEdge {
    pub fn new(id: EdgeId, source: NodeId, target: NodeId) -> Self {
        Self { id, source, target }
    }

    /// Edge with the deterministic `edge-<source>-<target>` id
    pub fn linking(source: &NodeId, target: &NodeId) -> Self {
        Self {
            id: EdgeId::between(source, target),
            source: source.clone(),
            target: target.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InterceptorGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl InterceptorGraph {
    pub fn node(&self, id: &NodeId) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut GraphNode> {
        self.nodes.iter_mut().find(|n| &n.id == id)
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.nodes.iter().any(|n| &n.id == id)
    }

    /// Non-sentinel nodes in insertion order
    pub fn interceptor_nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter().filter(|n| !n.is_sentinel())
    }

    pub fn count_kind(&self, kind: NodeKind) -> usize {
        self.nodes.iter().filter(|n| n.kind == kind).count()
    }

    /// Check if an edge with the given direction already exists
    pub fn has_edge_between(&self, source: &NodeId, target: &NodeId) -> bool {
        self.edges
            .iter()
            .any(|e| &e.source == source && &e.target == target)
    }

    /// Find all edges touching a node
    pub fn edges_connected_to(&self, id: &NodeId) -> Vec<EdgeId> {
        self.edges
            .iter()
            .filter(|e| &e.source == id || &e.target == id)
            .map(|e| e.id.clone())
            .collect()
    }

    /// Outgoing targets of `id` in edge insertion order
    pub fn successors<'a>(&'a self, id: &'a NodeId) -> impl Iterator<Item = &'a NodeId> + 'a {
        self.edges
            .iter()
            .filter(move |e| &e.source == id)
            .map(|e| &e.target)
    }
}
