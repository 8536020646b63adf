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

//! Forward converter: Guard Profile -> interceptor graph.
//!
//! Output is a pure function of the input profile and layout, so converting the
//! same profile twice yields identical node and edge ids.

use crate::config::LayoutConfig;
use crate::engine_core::constants::node_ids;
use crate::engine_core::graph::{GraphEdge, GraphNode, InterceptorGraph, NodeId, Position};
use crate::engine_core::models::{GuardProfile, MessageInterceptorConfig};

pub fn forward_convert(profile: &GuardProfile) -> InterceptorGraph {
    forward_convert_with_layout(profile, &LayoutConfig::default())
}

pub fn forward_convert_with_layout(
    profile: &GuardProfile,
    layout: &LayoutConfig,
) -> InterceptorGraph {
    let row = |i: usize| layout.origin_y + layout.step_y * i as f64;

    let input = GraphNode::input(Position::new(layout.origin_x, row(0)));

    match profile.primary() {
        MessageInterceptorConfig::Chain { chain } => {
            let container = GraphNode::interceptor(
                NodeId::new(node_ids::CHAIN),
                Position::new(layout.origin_x, row(1)),
                profile.primary().clone(),
            );

            let elements: Vec<GraphNode> = chain
                .iter()
                .enumerate()
                .map(|(i, config)| {
                    GraphNode::interceptor(
                        NodeId::chain_element(i),
                        Position::new(layout.origin_x + layout.chain_indent_x, row(i + 2)),
                        config.clone(),
                    )
                })
                .collect();

            let output = GraphNode::output(Position::new(layout.origin_x, row(chain.len() + 2)));

            let mut edges = vec![GraphEdge::linking(&input.id, &container.id)];
            let mut previous = &container.id;
            for element in &elements {
                edges.push(GraphEdge::linking(previous, &element.id));
                previous = &element.id;
            }
            edges.push(GraphEdge::linking(previous, &output.id));

            let mut nodes = Vec::with_capacity(elements.len() + 3);
            nodes.push(input);
            nodes.push(container);
            nodes.extend(elements);
            nodes.push(output);

            InterceptorGraph { nodes, edges }
        }
        single => {
            let primary = GraphNode::interceptor(
                NodeId::new(node_ids::PRIMARY),
                Position::new(layout.origin_x, row(1)),
                single.clone(),
            );
            let output = GraphNode::output(Position::new(layout.origin_x, row(2)));

            let edges = vec![
                GraphEdge::linking(&input.id, &primary.id),
                GraphEdge::linking(&primary.id, &output.id),
            ];

            InterceptorGraph {
                nodes: vec![input, primary, output],
                edges,
            }
        }
    }
}
