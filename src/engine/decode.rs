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

//! Lenient profile decoding.
//!
//! The editor must always be able to render something, so an interceptor with
//! an unknown or missing `type` is replaced by the default Info log leaf at the
//! same position. Every substitution is reported as a [`DecodeIssue`]; sibling
//! chain elements and the fields of a Filter decode independently.

use crate::engine_core::models::{
    FilterAction, FilterLogic, GuardProfile, InterceptorKind, MessageInterceptorConfig,
    MessageType,
};
use crate::engine_core::errors::GraphError;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::warn;

const PRIMARY_FIELD: &str = "primary_message_interceptor";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeIssue {
    /// JSONPath-like location, e.g. `$.primary_message_interceptor.chain[2]`
    pub path: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedProfile {
    pub profile: GuardProfile,
    pub issues: Vec<DecodeIssue>,
}

impl DecodedProfile {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

pub fn decode_profile(value: &Value) -> DecodedProfile {
    let mut issues = Vec::new();
    let root = format!("$.{}", PRIMARY_FIELD);

    let primary = match value.get(PRIMARY_FIELD) {
        Some(raw) => decode_interceptor(raw, &root, &mut issues),
        None => {
            issues.push(DecodeIssue {
                path: "$".to_string(),
                reason: format!("missing '{}'", PRIMARY_FIELD),
            });
            MessageInterceptorConfig::default()
        }
    };

    for issue in &issues {
        warn!(path = %issue.path, reason = %issue.reason, "Substituted default interceptor");
    }

    DecodedProfile {
        profile: GuardProfile::new(primary),
        issues,
    }
}

/// Parse profile text (JSON) leniently. Only syntax errors are fatal.
pub fn decode_profile_str(text: &str) -> Result<DecodedProfile, serde_json::Error> {
    let value: Value = serde_json::from_str(text)?;
    Ok(decode_profile(&value))
}

/// Read a profile file leniently; `.yaml`/`.yml` parse as YAML, anything else as JSON.
pub fn decode_profile_file(path: &Path) -> Result<DecodedProfile, GraphError> {
    let content = fs::read_to_string(path)?;
    let value: Value = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml_ng::from_str(&content)?,
        _ => serde_json::from_str(&content)?,
    };
    Ok(decode_profile(&value))
}

fn decode_interceptor(
    value: &Value,
    path: &str,
    issues: &mut Vec<DecodeIssue>,
) -> MessageInterceptorConfig {
    match value.get("type").and_then(Value::as_str) {
        Some("Chain") => {
            let Some(elements) = value.get("chain").and_then(Value::as_array) else {
                issues.push(DecodeIssue {
                    path: path.to_string(),
                    reason: "Chain without a 'chain' array".to_string(),
                });
                return MessageInterceptorConfig::Chain { chain: Vec::new() };
            };
            let chain = elements
                .iter()
                .enumerate()
                .map(|(i, element)| {
                    decode_interceptor(element, &format!("{}.chain[{}]", path, i), issues)
                })
                .collect();
            MessageInterceptorConfig::Chain { chain }
        }
        Some("Filter") => decode_filter(value, path, issues),
        Some(tag) => match serde_json::from_value::<MessageInterceptorConfig>(value.clone()) {
            Ok(config) => config,
            Err(e) => {
                issues.push(DecodeIssue {
                    path: path.to_string(),
                    reason: format!("cannot decode '{}': {}", tag, e),
                });
                MessageInterceptorConfig::default()
            }
        },
        None => {
            issues.push(DecodeIssue {
                path: path.to_string(),
                reason: "missing 'type' discriminant".to_string(),
            });
            MessageInterceptorConfig::default()
        }
    }
}

/// Filter fields decode independently; `intercept` targets recurse.
fn decode_filter(
    value: &Value,
    path: &str,
    issues: &mut Vec<DecodeIssue>,
) -> MessageInterceptorConfig {
    let filter_path = format!("{}.filter_logic", path);
    let filter_logic = match value.get("filter_logic") {
        Some(raw) => match serde_json::from_value::<FilterLogic>(raw.clone()) {
            Ok(logic) => logic,
            Err(e) => {
                issues.push(DecodeIssue {
                    path: filter_path,
                    reason: format!("cannot decode filter logic: {}", e),
                });
                default_filter_logic()
            }
        },
        None => {
            issues.push(DecodeIssue {
                path: filter_path,
                reason: "missing 'filter_logic'".to_string(),
            });
            default_filter_logic()
        }
    };

    MessageInterceptorConfig::Filter {
        filter_logic,
        match_action: decode_action(value, "match_action", path, issues),
        non_match_action: decode_action(value, "non_match_action", path, issues),
    }
}

fn decode_action(
    filter: &Value,
    field: &str,
    path: &str,
    issues: &mut Vec<DecodeIssue>,
) -> FilterAction {
    let action_path = format!("{}.{}", path, field);
    let Some(raw) = filter.get(field) else {
        issues.push(DecodeIssue {
            path: action_path,
            reason: format!("missing '{}'", field),
        });
        return FilterAction::Send;
    };

    if let Some(target) = raw.get("intercept") {
        let inner = decode_interceptor(target, &format!("{}.intercept", action_path), issues);
        return FilterAction::Intercept(Box::new(inner));
    }

    match serde_json::from_value::<FilterAction>(raw.clone()) {
        Ok(action) => action,
        Err(e) => {
            issues.push(DecodeIssue {
                path: action_path,
                reason: format!("cannot decode filter action: {}", e),
            });
            FilterAction::Send
        }
    }
}

fn default_filter_logic() -> FilterLogic {
    match InterceptorKind::Filter.default_config() {
        MessageInterceptorConfig::Filter { filter_logic, .. } => filter_logic,
        _ => FilterLogic::MessageType(MessageType::Request),
    }
}
