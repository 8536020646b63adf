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

// Domain error types for graph editing and conversion

use crate::engine_core::graph::NodeId;
use thiserror::Error;

/// Main error type for the graph engine
#[derive(Error, Debug)]
pub enum GraphError {
    /// Profile text is not valid JSON
    #[error("Profile parse error: {0}")]
    ProfileParse(#[from] serde_json::Error),

    /// Profile file is not valid YAML
    #[error("Profile YAML error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("Duplicate node id: {0}")]
    DuplicateNode(NodeId),

    /// Attempt to add, patch or break the Input/Output sentinels
    #[error("Sentinel violation: {0}")]
    SentinelViolation(String),

    #[error("Invalid patch for node {node}: {reason}")]
    InvalidPatch { node: NodeId, reason: String },

    #[error("Invalid edge: {0}")]
    InvalidEdge(String),

    /// The chain walk returned to a node it already visited
    #[error("Cycle detected at node {node}")]
    CycleDetected { node: NodeId },

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The editor session task is gone
    #[error("Editor session closed")]
    SessionClosed,

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl GraphError {
    /// Get editor-facing error message.
    pub fn user_message(&self) -> String {
        match self {
            GraphError::ProfileParse(e) => format!("The profile JSON is invalid: {}", e),
            GraphError::YamlParse(e) => format!("The profile YAML is invalid: {}", e),
            GraphError::UnknownNode(id) => format!("Node '{}' no longer exists", id),
            GraphError::DuplicateNode(id) => format!("A node named '{}' already exists", id),
            GraphError::SentinelViolation(_) => {
                "Input and Output nodes cannot be changed".to_string()
            }
            GraphError::InvalidPatch { reason, .. } => format!("Edit rejected: {}", reason),
            GraphError::InvalidEdge(reason) => format!("Connection rejected: {}", reason),
            GraphError::CycleDetected { node } => format!(
                "The chain loops back to '{}'. Remove a connection to break the cycle.",
                node
            ),
            GraphError::ConfigurationError(_) => "Internal error".to_string(),
            GraphError::SessionClosed => "The editor session has ended".to_string(),
            GraphError::IoError(_) => "Internal system error".to_string(),
        }
    }
}
