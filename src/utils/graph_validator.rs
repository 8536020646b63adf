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

// Structural graph validation - hard errors for broken invariants, warnings for
// shapes the reverse converter resolves through its fallback rules

use crate::engine::reverse::walk_chain;
use crate::engine_core::errors::GraphError;
use crate::engine_core::graph::{EdgeId, InterceptorGraph, NodeId, NodeKind};
use crate::engine_core::models::{FilterAction, FilterLogic, MessageInterceptorConfig};
use std::collections::{HashSet, VecDeque};
use std::fmt;

/// A shape the editor tolerates but the user should know about
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ShapeWarning {
    /// Edge references a node that does not exist
    DanglingEdge { edge: EdgeId },
    /// Only the first chain container is converted
    MultipleChainContainers { used: NodeId, ignored: Vec<NodeId> },
    /// Only the first outgoing edge is followed
    Branching { node: NodeId, ignored: Vec<NodeId> },
    /// Not reachable from Input
    DisconnectedNode { node: NodeId },
    /// Several interceptors without a chain container; all but the first are dropped
    AmbiguousPrimary { kept: NodeId, dropped: Vec<NodeId> },
    /// `and`/`or` with no operands
    EmptyFilterGroup { node: NodeId },
    EmptyRequestMethod { node: NodeId },
}

impl fmt::Display for ShapeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeWarning::DanglingEdge { edge } => {
                write!(f, "edge '{}' points at a missing node", edge)
            }
            ShapeWarning::MultipleChainContainers { used, ignored } => write!(
                f,
                "several chain containers; using '{}', ignoring {:?}",
                used, ignored
            ),
            ShapeWarning::Branching { node, ignored } => write!(
                f,
                "node '{}' branches; only the first connection is used, ignoring {:?}",
                node, ignored
            ),
            ShapeWarning::DisconnectedNode { node } => {
                write!(f, "node '{}' is not reachable from Input", node)
            }
            ShapeWarning::AmbiguousPrimary { kept, dropped } => write!(
                f,
                "no chain container; keeping '{}' as primary, dropping {:?}",
                kept, dropped
            ),
            ShapeWarning::EmptyFilterGroup { node } => {
                write!(f, "filter on '{}' has an empty and/or group", node)
            }
            ShapeWarning::EmptyRequestMethod { node } => {
                write!(f, "filter on '{}' matches an empty request method", node)
            }
        }
    }
}

/// Validates interceptor graphs for structural correctness
pub struct GraphValidator;

impl GraphValidator {
    /// Validate a graph; Ok carries the non-fatal findings
    pub fn validate(graph: &InterceptorGraph) -> Result<Vec<ShapeWarning>, GraphError> {
        Self::validate_sentinels(graph)?;
        Self::validate_unique_ids(graph)?;

        let mut warnings = Vec::new();
        Self::check_edges(graph, &mut warnings);
        Self::check_containers(graph, &mut warnings)?;
        Self::check_reachability(graph, &mut warnings);

        for node in graph.interceptor_nodes() {
            if let Some(config) = &node.data {
                Self::check_interceptor(config, &node.id, &mut warnings);
            }
        }

        Ok(warnings)
    }

    /// Exactly one Input and one Output
    fn validate_sentinels(graph: &InterceptorGraph) -> Result<(), GraphError> {
        for kind in [NodeKind::Input, NodeKind::Output] {
            let count = graph.count_kind(kind);
            if count != 1 {
                return Err(GraphError::SentinelViolation(format!(
                    "expected exactly one {:?} node, found {}",
                    kind, count
                )));
            }
        }
        Ok(())
    }

    fn validate_unique_ids(graph: &InterceptorGraph) -> Result<(), GraphError> {
        let mut seen = HashSet::new();
        for node in &graph.nodes {
            if !seen.insert(&node.id) {
                return Err(GraphError::DuplicateNode(node.id.clone()));
            }
        }
        Ok(())
    }

    fn check_edges(graph: &InterceptorGraph, warnings: &mut Vec<ShapeWarning>) {
        for edge in &graph.edges {
            if !graph.contains_node(&edge.source) || !graph.contains_node(&edge.target) {
                warnings.push(ShapeWarning::DanglingEdge {
                    edge: edge.id.clone(),
                });
            }
        }

        for node in &graph.nodes {
            let mut targets = graph.successors(&node.id);
            if targets.next().is_some() {
                let ignored: Vec<NodeId> = targets.cloned().collect();
                if !ignored.is_empty() {
                    warnings.push(ShapeWarning::Branching {
                        node: node.id.clone(),
                        ignored,
                    });
                }
            }
        }
    }

    /// Container checks, including the cycle guard on the walked path
    fn check_containers(
        graph: &InterceptorGraph,
        warnings: &mut Vec<ShapeWarning>,
    ) -> Result<(), GraphError> {
        let containers: Vec<&NodeId> = graph
            .interceptor_nodes()
            .filter(|n| n.is_chain())
            .map(|n| &n.id)
            .collect();

        match containers.split_first() {
            Some((used, rest)) => {
                if !rest.is_empty() {
                    warnings.push(ShapeWarning::MultipleChainContainers {
                        used: (*used).clone(),
                        ignored: rest.iter().map(|id| (*id).clone()).collect(),
                    });
                }
                walk_chain(graph, used)?;
            }
            None => {
                let mut leaves = graph.interceptor_nodes().map(|n| n.id.clone());
                if let Some(kept) = leaves.next() {
                    let dropped: Vec<NodeId> = leaves.collect();
                    if !dropped.is_empty() {
                        warnings.push(ShapeWarning::AmbiguousPrimary { kept, dropped });
                    }
                }
            }
        }
        Ok(())
    }

    fn check_reachability(graph: &InterceptorGraph, warnings: &mut Vec<ShapeWarning>) {
        let input = NodeId::input();
        let mut reached: HashSet<&NodeId> = HashSet::new();
        let mut queue = VecDeque::from([&input]);

        while let Some(current) = queue.pop_front() {
            for next in graph.successors(current) {
                if reached.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        for node in graph.interceptor_nodes() {
            if !reached.contains(&node.id) {
                warnings.push(ShapeWarning::DisconnectedNode {
                    node: node.id.clone(),
                });
            }
        }
    }

    /// Recursive content checks on one interceptor
    fn check_interceptor(
        config: &MessageInterceptorConfig,
        node: &NodeId,
        warnings: &mut Vec<ShapeWarning>,
    ) {
        match config {
            MessageInterceptorConfig::Filter {
                filter_logic,
                match_action,
                non_match_action,
            } => {
                Self::check_logic(filter_logic, node, warnings);
                for action in [match_action, non_match_action] {
                    if let FilterAction::Intercept(inner) = action {
                        Self::check_interceptor(inner, node, warnings);
                    }
                }
            }
            MessageInterceptorConfig::Chain { chain } => {
                for inner in chain {
                    Self::check_interceptor(inner, node, warnings);
                }
            }
            MessageInterceptorConfig::ManualApproval
            | MessageInterceptorConfig::MessageLog { .. } => {}
        }
    }

    fn check_logic(logic: &FilterLogic, node: &NodeId, warnings: &mut Vec<ShapeWarning>) {
        match logic {
            FilterLogic::And(items) | FilterLogic::Or(items) => {
                if items.is_empty() {
                    warnings.push(ShapeWarning::EmptyFilterGroup { node: node.clone() });
                }
                for item in items {
                    Self::check_logic(item, node, warnings);
                }
            }
            FilterLogic::Not(inner) => Self::check_logic(inner, node, warnings),
            FilterLogic::RequestMethod(method) if method.trim().is_empty() => {
                warnings.push(ShapeWarning::EmptyRequestMethod { node: node.clone() });
            }
            FilterLogic::Direction(_)
            | FilterLogic::MessageType(_)
            | FilterLogic::RequestMethod(_) => {}
        }
    }
}
