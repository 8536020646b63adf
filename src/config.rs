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

use crate::engine_core::constants::{config as env_names, layout, timing};
use crate::engine_core::errors::GraphError;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Placement of nodes produced by the forward converter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub origin_x: f64,
    pub origin_y: f64,
    pub step_y: f64,
    pub chain_indent_x: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            origin_x: layout::ORIGIN_X,
            origin_y: layout::ORIGIN_Y,
            step_y: layout::STEP_Y,
            chain_indent_x: layout::CHAIN_INDENT_X,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Quiescence window before a drag-only change is reverse-converted
    pub drag_quiescence: Duration,
    pub layout: LayoutConfig,
    pub log_level: String,
    pub log_format: String, // "json" or "text"
}

impl EditorConfig {
    pub fn from_env() -> Result<Self, GraphError> {
        let defaults = Self::default();

        let drag_quiescence = match env::var(env_names::ENV_DRAG_QUIESCENCE_MS) {
            Ok(raw) => Duration::from_millis(raw.trim().parse::<u64>().map_err(|e| {
                GraphError::ConfigurationError(format!(
                    "{} must be a whole number of milliseconds, got '{}': {}",
                    env_names::ENV_DRAG_QUIESCENCE_MS,
                    raw,
                    e
                ))
            })?),
            Err(_) => defaults.drag_quiescence,
        };

        let mut layout = defaults.layout;
        if let Ok(raw) = env::var(env_names::ENV_LAYOUT_STEP) {
            let step = raw.trim().parse::<f64>().map_err(|e| {
                GraphError::ConfigurationError(format!(
                    "{} must be a number, got '{}': {}",
                    env_names::ENV_LAYOUT_STEP,
                    raw,
                    e
                ))
            })?;
            if !step.is_finite() || step <= 0.0 {
                return Err(GraphError::ConfigurationError(format!(
                    "{} must be positive, got {}",
                    env_names::ENV_LAYOUT_STEP,
                    step
                )));
            }
            layout.step_y = step;
        }

        Ok(Self {
            drag_quiescence,
            layout,
            log_level: env::var(env_names::ENV_LOG_LEVEL).unwrap_or(defaults.log_level),
            log_format: env::var(env_names::ENV_LOG_FORMAT).unwrap_or(defaults.log_format),
        })
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            drag_quiescence: Duration::from_millis(timing::DEFAULT_DRAG_QUIESCENCE_MS),
            layout: LayoutConfig::default(),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}
