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

//! Config model for Guard Profiles.
//!
//! This module contains the canonical, declarative representation of a Guard
//! Profile: a tree of message interceptors. The serde attributes pin the wire
//! shape expected by the backend store, so changes here are breaking changes.

use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(feature = "schema")]
use schemars::JsonSchema;

/// Root of a Guard Profile
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct GuardProfile {
    pub primary_message_interceptor: MessageInterceptorConfig,
}

impl GuardProfile {
    pub fn new(primary: MessageInterceptorConfig) -> Self {
        Self {
            primary_message_interceptor: primary,
        }
    }

    pub fn primary(&self) -> &MessageInterceptorConfig {
        &self.primary_message_interceptor
    }
}

/// A single policy unit, or an ordered chain of them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(tag = "type")]
pub enum MessageInterceptorConfig {
    /// Hold the message until a human approves it
    ManualApproval,
    MessageLog {
        log_level: LogLevel,
    },
    Filter {
        filter_logic: FilterLogic,
        match_action: FilterAction,
        non_match_action: FilterAction,
    },
    Chain {
        chain: Vec<MessageInterceptorConfig>,
    },
}

/// The most conservative leaf: log at Info and let the message through.
impl Default for MessageInterceptorConfig {
    fn default() -> Self {
        MessageInterceptorConfig::MessageLog {
            log_level: LogLevel::Info,
        }
    }
}

impl MessageInterceptorConfig {
    pub fn kind(&self) -> InterceptorKind {
        match self {
            Self::ManualApproval => InterceptorKind::ManualApproval,
            Self::MessageLog { .. } => InterceptorKind::MessageLog,
            Self::Filter { .. } => InterceptorKind::Filter,
            Self::Chain { .. } => InterceptorKind::Chain,
        }
    }

    /// The `type` discriminant as it appears on the wire
    pub fn type_tag(&self) -> &'static str {
        self.kind().as_str()
    }

    pub fn is_chain(&self) -> bool {
        matches!(self, Self::Chain { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

/// What a Filter does with a message on one of its two branches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum FilterAction {
    Send,
    Drop,
    Intercept(Box<MessageInterceptorConfig>),
}

/// Predicate over a message, composable with and/or/not
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum FilterLogic {
    Direction(MessageDirection),
    MessageType(MessageType),
    RequestMethod(String),
    And(Vec<FilterLogic>),
    Or(Vec<FilterLogic>),
    Not(Box<FilterLogic>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum MessageDirection {
    Inbound,
    Outbound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub enum MessageType {
    Request,
    Response,
    ResponseSuccess,
    ResponseFailure,
    Notification,
    Unknown,
}

/// Interceptor type tag without its fields, as offered by a palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub enum InterceptorKind {
    ManualApproval,
    MessageLog,
    Filter,
    Chain,
}

impl InterceptorKind {
    pub const ALL: [InterceptorKind; 4] = [
        InterceptorKind::ManualApproval,
        InterceptorKind::MessageLog,
        InterceptorKind::Filter,
        InterceptorKind::Chain,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ManualApproval => "ManualApproval",
            Self::MessageLog => "MessageLog",
            Self::Filter => "Filter",
            Self::Chain => "Chain",
        }
    }

    /// Fresh interceptor for a palette drop
    pub fn default_config(&self) -> MessageInterceptorConfig {
        match self {
            Self::ManualApproval => MessageInterceptorConfig::ManualApproval,
            Self::MessageLog => MessageInterceptorConfig::default(),
            Self::Filter => MessageInterceptorConfig::Filter {
                filter_logic: FilterLogic::MessageType(MessageType::Request),
                match_action: FilterAction::Send,
                non_match_action: FilterAction::Send,
            },
            Self::Chain => MessageInterceptorConfig::Chain { chain: Vec::new() },
        }
    }
}

impl fmt::Display for InterceptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
