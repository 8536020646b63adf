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

//! Graph edit messages.
//!
//! Every mutation a renderer can request goes through [`GraphEdit`] and the
//! coordinator's public API. Nodes never reach into shared state directly.

use crate::engine_core::errors::GraphError;
use crate::engine_core::graph::{EdgeId, GraphNode, NodeId, Position};
use crate::engine_core::models::{
    FilterAction, FilterLogic, InterceptorKind, LogLevel, MessageInterceptorConfig,
};
use serde::{Deserialize, Serialize};

/// One user action against the live graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GraphEdit {
    AddNodes(Vec<GraphNode>),
    /// Sentinels in the list are silently skipped
    RemoveNodes(Vec<NodeId>),
    AddEdge {
        source: NodeId,
        target: NodeId,
    },
    RemoveEdges(Vec<EdgeId>),
    /// `dragging` is true while the pointer is still held
    MoveNode {
        id: NodeId,
        position: Position,
        dragging: bool,
    },
    NodeEdited {
        id: NodeId,
        patch: NodePatch,
    },
    /// Start a fresh single-interceptor profile
    PaletteAdd {
        kind: InterceptorKind,
        position: Position,
    },
    Select {
        nodes: Vec<NodeId>,
        edges: Vec<EdgeId>,
    },
    DeleteSelection,
    ToggleExpanded(NodeId),
}

impl GraphEdit {
    /// Structural edits trigger an immediate reverse pass
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            GraphEdit::AddNodes(_)
                | GraphEdit::RemoveNodes(_)
                | GraphEdit::AddEdge { .. }
                | GraphEdit::RemoveEdges(_)
                | GraphEdit::NodeEdited { .. }
                | GraphEdit::PaletteAdd { .. }
                | GraphEdit::DeleteSelection
        )
    }
}

/// Property change on a single interceptor node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodePatch {
    /// Replace all fields; the interceptor kind must stay the same
    Replace(MessageInterceptorConfig),
    LogLevel(LogLevel),
    FilterLogic(FilterLogic),
    MatchAction(FilterAction),
    NonMatchAction(FilterAction),
}

impl NodePatch {
    /// Apply to `config` in place, rejecting patches that do not fit its kind.
    pub fn apply_to(
        self,
        node: &NodeId,
        config: &mut MessageInterceptorConfig,
    ) -> Result<(), GraphError> {
        let reject = |reason: String| GraphError::InvalidPatch {
            node: node.clone(),
            reason,
        };

        match (self, config) {
            (NodePatch::Replace(replacement), current) => {
                if replacement.kind() != current.kind() {
                    return Err(reject(format!(
                        "cannot turn a {} into a {}",
                        current.kind(),
                        replacement.kind()
                    )));
                }
                *current = replacement;
            }
            (NodePatch::LogLevel(level), MessageInterceptorConfig::MessageLog { log_level }) => {
                *log_level = level;
            }
            (
                NodePatch::FilterLogic(logic),
                MessageInterceptorConfig::Filter { filter_logic, .. },
            ) => {
                *filter_logic = logic;
            }
            (
                NodePatch::MatchAction(action),
                MessageInterceptorConfig::Filter { match_action, .. },
            ) => {
                *match_action = action;
            }
            (
                NodePatch::NonMatchAction(action),
                MessageInterceptorConfig::Filter {
                    non_match_action, ..
                },
            ) => {
                *non_match_action = action;
            }
            (patch, current) => {
                return Err(reject(format!(
                    "{} does not apply to a {}",
                    patch.name(),
                    current.kind()
                )));
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        match self {
            NodePatch::Replace(_) => "Replace",
            NodePatch::LogLevel(_) => "LogLevel",
            NodePatch::FilterLogic(_) => "FilterLogic",
            NodePatch::MatchAction(_) => "MatchAction",
            NodePatch::NonMatchAction(_) => "NonMatchAction",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_core::models::MessageDirection;

    #[test]
    fn test_log_level_patch() {
        let mut config = MessageInterceptorConfig::default();
        NodePatch::LogLevel(LogLevel::Error)
            .apply_to(&NodeId::new("n"), &mut config)
            .unwrap();
        assert_eq!(
            config,
            MessageInterceptorConfig::MessageLog {
                log_level: LogLevel::Error
            }
        );
    }

    #[test]
    fn test_patch_kind_mismatch_is_rejected() {
        let mut config = MessageInterceptorConfig::ManualApproval;
        let result = NodePatch::FilterLogic(FilterLogic::Direction(MessageDirection::Inbound))
            .apply_to(&NodeId::new("n"), &mut config);
        assert!(matches!(result, Err(GraphError::InvalidPatch { .. })));
        assert_eq!(config, MessageInterceptorConfig::ManualApproval);

        let result = NodePatch::Replace(MessageInterceptorConfig::ManualApproval)
            .apply_to(&NodeId::new("n"), &mut MessageInterceptorConfig::default());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("cannot turn a MessageLog into a ManualApproval"));
    }
}
