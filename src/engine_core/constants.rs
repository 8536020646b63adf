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

//! guard-graph Constants - Single source of truth for ids, layout and configuration values.
//!
//! This module centralizes all magic numbers and well-known identifiers so that
//! both converters and the coordinator agree on them.

/// Well-known node identifiers produced by the forward converter
pub mod node_ids {
    /// The Input sentinel
    pub const INPUT: &str = "input";
    /// The Output sentinel
    pub const OUTPUT: &str = "output";
    /// The single interceptor of a non-chain profile
    pub const PRIMARY: &str = "primary";
    /// The chain container of a chain profile
    pub const CHAIN: &str = "chain";
    /// Prefix for positional chain elements (`node-0`, `node-1`, ...)
    pub const CHAIN_ELEMENT_PREFIX: &str = "node-";
    /// Prefix for edge identifiers
    pub const EDGE_PREFIX: &str = "edge-";
}

/// Default layout of a freshly converted graph (vertical column)
pub mod layout {
    pub const ORIGIN_X: f64 = 250.0;
    pub const ORIGIN_Y: f64 = 0.0;
    /// Vertical distance between consecutive nodes
    pub const STEP_Y: f64 = 150.0;
    /// Horizontal indent of chain elements relative to the container
    pub const CHAIN_INDENT_X: f64 = 50.0;
}

/// Timing of the coordinator
pub mod timing {
    /// Quiescence window before a drag-only change is reverse-converted
    pub const DEFAULT_DRAG_QUIESCENCE_MS: u64 = 300;
}

/// Configuration Environment Variables
pub mod config {
    pub const ENV_DRAG_QUIESCENCE_MS: &str = "GUARD_GRAPH_DRAG_QUIESCENCE_MS";
    pub const ENV_LAYOUT_STEP: &str = "GUARD_GRAPH_LAYOUT_STEP";
    pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
    pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";
}

/// Editor session channel sizing
pub mod session {
    /// Capacity of the inbound command channel
    pub const COMMAND_CHANNEL_CAPACITY: usize = 64;
}
