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

//! Reverse converter: interceptor graph -> Guard Profile.
//!
//! Only linear shapes are modelled. Anything else degrades through fixed
//! fallback rules instead of failing:
//! - no interceptor nodes: the default Info log profile
//! - several interceptors but no chain container: the first one wins
//! - a node with several outgoing edges: only the first edge is followed
//!
//! The one hard failure is a cycle on the walked path.

use crate::engine_core::errors::GraphError;
use crate::engine_core::graph::{GraphNode, InterceptorGraph, NodeId, NodeKind};
use crate::engine_core::models::{GuardProfile, MessageInterceptorConfig};
use std::collections::{HashMap, HashSet};
use tracing::debug;

pub fn reverse_convert(graph: &InterceptorGraph) -> Result<GuardProfile, GraphError> {
    // 1. Drop sentinels
    let interceptors: Vec<&GraphNode> = graph.interceptor_nodes().collect();

    // 2. Nothing left
    if interceptors.is_empty() {
        return Ok(GuardProfile::default());
    }

    // 3. Single leaf
    if interceptors.len() == 1 && !interceptors[0].is_chain() {
        return Ok(GuardProfile::new(interceptors[0].to_interceptor()));
    }

    // 4. Chain container, or first-node fallback
    let Some(container) = interceptors.iter().find(|n| n.is_chain()) else {
        debug!(
            kept = %interceptors[0].id,
            dropped = interceptors.len() - 1,
            "No chain container; keeping first interceptor as primary"
        );
        return Ok(GuardProfile::new(interceptors[0].to_interceptor()));
    };

    let chain = walk_chain(graph, &container.id)?;
    Ok(GuardProfile::new(MessageInterceptorConfig::Chain { chain }))
}

/// Follow first outgoing edges from `start`, collecting every interceptor after it.
pub fn walk_chain(
    graph: &InterceptorGraph,
    start: &NodeId,
) -> Result<Vec<MessageInterceptorConfig>, GraphError> {
    // 5. Adjacency in edge insertion order
    let mut adjacency: HashMap<&NodeId, Vec<&NodeId>> = HashMap::new();
    for edge in &graph.edges {
        adjacency.entry(&edge.source).or_default().push(&edge.target);
    }

    // 6. Walk
    let mut chain = Vec::new();
    let mut visited: HashSet<&NodeId> = HashSet::new();
    visited.insert(start);
    let mut current = start;

    while let Some(next_id) = adjacency.get(current).and_then(|targets| targets.first()) {
        let Some(next) = graph.node(next_id) else {
            debug!(target_node = %next_id, "Edge points at a missing node; chain ends here");
            break;
        };
        if next.kind == NodeKind::Output {
            break;
        }
        if !visited.insert(&next.id) {
            return Err(GraphError::CycleDetected {
                node: next.id.clone(),
            });
        }
        // Nested chains are elements in their own right and carry their own data
        if !next.is_sentinel() {
            chain.push(next.to_interceptor());
        }
        current = &next.id;
    }

    Ok(chain)
}
