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

// Main entry point for the guard-graph converter CLI
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use guard_graph::config::EditorConfig;
use guard_graph::engine::{decode_profile_file, forward_convert_with_layout, reverse_convert};
use guard_graph::engine_core::graph::InterceptorGraph;
use guard_graph::engine_core::models::GuardProfile;
use guard_graph::utils::graph_validator::GraphValidator;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Convert Guard Profiles to and from interceptor graphs",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the graph for a profile file (JSON, or YAML by extension)
    ToGraph { profile: PathBuf },
    /// Print the canonical profile for a graph JSON file
    ToProfile { graph: PathBuf },
    /// Validate the shape of a graph JSON file
    Check { graph: PathBuf },
    /// Convert a profile to a graph and back, and compare
    Roundtrip { profile: PathBuf },
    /// Print the JSON Schema of a Guard Profile
    #[cfg(feature = "schema")]
    Schema,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    install_panic_hook();

    let config = EditorConfig::from_env().unwrap_or_else(|e| {
        eprintln!(
            "Warning: Failed to load config from env, using defaults: {}",
            e
        );
        EditorConfig::default()
    });

    if let Err(e) = init_tracing(&config) {
        eprintln!("Failed to init tracing: {}", e);
    }

    match cli.command {
        Command::ToGraph { profile } => {
            let profile = read_profile(&profile)?;
            let graph = forward_convert_with_layout(&profile, &config.layout);
            info!(
                nodes = graph.nodes.len(),
                edges = graph.edges.len(),
                "Profile converted"
            );
            println!("{}", serde_json::to_string_pretty(&graph)?);
        }
        Command::ToProfile { graph } => {
            let graph = read_graph(&graph)?;
            let profile =
                reverse_convert(&graph).map_err(|e| anyhow::anyhow!(e.user_message()))?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        Command::Check { graph } => {
            let graph = read_graph(&graph)?;
            let warnings =
                GraphValidator::validate(&graph).map_err(|e| anyhow::anyhow!(e.user_message()))?;
            if warnings.is_empty() {
                println!("OK");
            } else {
                for warning in &warnings {
                    println!("warning: {}", warning);
                }
            }
        }
        Command::Roundtrip { profile } => {
            let original = read_profile(&profile)?;
            let graph = forward_convert_with_layout(&original, &config.layout);
            let restored = reverse_convert(&graph)?;
            if restored == original {
                println!("roundtrip: identical");
            } else {
                bail!(
                    "roundtrip: profile changed\n  before: {}\n  after:  {}",
                    serde_json::to_string(&original)?,
                    serde_json::to_string(&restored)?
                );
            }
        }
        #[cfg(feature = "schema")]
        Command::Schema => {
            let schema = schemars::schema_for!(GuardProfile);
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }

    Ok(())
}

/// Lenient read: unknown interceptor types become the default log leaf
fn read_profile(path: &Path) -> anyhow::Result<GuardProfile> {
    let decoded = decode_profile_file(path)
        .with_context(|| format!("Failed to read profile {}", path.display()))?;
    if !decoded.is_clean() {
        warn!(
            file = %path.display(),
            issues = decoded.issues.len(),
            "Profile contained interceptors that could not be decoded"
        );
    }
    debug!(file = %path.display(), "Profile loaded");
    Ok(decoded.profile)
}

fn read_graph(path: &Path) -> anyhow::Result<InterceptorGraph> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read graph {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid graph JSON in {}", path.display()))
}

fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());

        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("PANIC: {} at {}", message, location);
    }));
}

fn init_tracing(config: &EditorConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("guard_graph=debug,info"));

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    if config.log_format == "json" {
        subscriber.json().try_init()?;
    } else {
        subscriber.try_init()?;
    }

    Ok(())
}
