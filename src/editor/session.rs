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

//! Editor session: an async task that drives a [`GraphCoordinator`] from a
//! command channel and fires the drag quiescence timer.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::config::EditorConfig;
use crate::editor::coordinator::{GraphCoordinator, ReloadOutcome};
use crate::editor::events::GraphEdit;
use crate::engine_core::constants::session::COMMAND_CHANNEL_CAPACITY;
use crate::engine_core::errors::GraphError;
use crate::engine_core::models::GuardProfile;

/// Requests from the host application to the editor task
#[derive(Debug)]
pub enum EditorCommand {
    Load { key: String, profile: GuardProfile },
    /// Text from the companion JSON view
    LoadJson { key: String, text: String },
    Edit(GraphEdit),
    /// Run any pending drag sync now
    Flush,
    Shutdown,
}

/// Notifications from the editor task
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A reverse pass completed; this is the canonical profile
    ProfileChanged(GuardProfile),
    Reloaded(ReloadOutcome),
    /// The command was refused; graph state is unchanged
    Rejected { reason: String },
    /// The graph no longer converts (e.g. a cycle); the last good profile stands
    SyncFailed { reason: String },
}

pub struct EditorHandle {
    commands: mpsc::Sender<EditorCommand>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
}

impl EditorHandle {
    pub async fn send(&self, command: EditorCommand) -> Result<(), GraphError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| GraphError::SessionClosed)
    }

    pub async fn load(
        &self,
        key: impl Into<String>,
        profile: GuardProfile,
    ) -> Result<(), GraphError> {
        self.send(EditorCommand::Load {
            key: key.into(),
            profile,
        })
        .await
    }

    pub async fn edit(&self, edit: GraphEdit) -> Result<(), GraphError> {
        self.send(EditorCommand::Edit(edit)).await
    }

    pub async fn shutdown(&self) -> Result<(), GraphError> {
        self.send(EditorCommand::Shutdown).await
    }

    /// `None` once the session has stopped and all events are drained
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events.recv().await
    }

    pub fn try_next_event(&mut self) -> Option<SessionEvent> {
        self.events.try_recv().ok()
    }
}

/// Async driver around a [`GraphCoordinator`]: owns the quiescence timer
/// and turns coordinator callbacks into [`SessionEvent`]s.
pub struct EditorSession {
    coordinator: GraphCoordinator,
    commands: mpsc::Receiver<EditorCommand>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl EditorSession {
    /// Spawn the session task. The join handle yields the coordinator on shutdown.
    pub fn spawn(config: &EditorConfig) -> (EditorHandle, JoinHandle<GraphCoordinator>) {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let mut coordinator = GraphCoordinator::new(config);
        let listener_tx = event_tx.clone();
        coordinator.subscribe(move |profile: &GuardProfile| {
            let _ = listener_tx.send(SessionEvent::ProfileChanged(profile.clone()));
        });

        let session = Self {
            coordinator,
            commands: cmd_rx,
            events: event_tx,
        };
        let task = tokio::spawn(session.run());

        (
            EditorHandle {
                commands: cmd_tx,
                events: event_rx,
            },
            task,
        )
    }

    async fn run(mut self) -> GraphCoordinator {
        info!("Editor session started");

        loop {
            let deadline = self.coordinator.next_deadline().map(Instant::from_std);

            tokio::select! {
                command = self.commands.recv() => {
                    match command {
                        Some(EditorCommand::Shutdown) | None => break,
                        Some(command) => self.handle(command),
                    }
                }
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if self.coordinator.poll(Instant::now().into_std()) {
                        self.report_sync_failure();
                    }
                }
            }
        }

        if self.coordinator.flush() {
            debug!("Flushed pending sync before shutdown");
            self.report_sync_failure();
        }
        info!("Editor session stopped");
        self.coordinator
    }

    fn handle(&mut self, command: EditorCommand) {
        match command {
            EditorCommand::Load { key, profile } => {
                let outcome = self.coordinator.load_profile(&key, profile);
                self.emit(SessionEvent::Reloaded(outcome));
            }
            EditorCommand::LoadJson { key, text } => {
                match self.coordinator.load_json(&key, &text) {
                    Ok(outcome) => self.emit(SessionEvent::Reloaded(outcome)),
                    Err(e) => self.reject(e),
                }
            }
            EditorCommand::Edit(edit) => {
                let structural = edit.is_structural();
                match self.coordinator.apply(edit, Instant::now().into_std()) {
                    Ok(()) if structural => self.report_sync_failure(),
                    Ok(()) => {}
                    Err(e) => self.reject(e),
                }
            }
            EditorCommand::Flush => {
                if self.coordinator.flush() {
                    self.report_sync_failure();
                }
            }
            EditorCommand::Shutdown => {}
        }
    }

    fn reject(&self, error: GraphError) {
        warn!(error = %error, "Command rejected");
        self.emit(SessionEvent::Rejected {
            reason: error.user_message(),
        });
    }

    fn report_sync_failure(&self) {
        if let Some(error) = self.coordinator.last_error() {
            self.emit(SessionEvent::SyncFailed {
                reason: error.user_message(),
            });
        }
    }

    fn emit(&self, event: SessionEvent) {
        // Receiver gone means the host stopped listening; keep running until Shutdown
        let _ = self.events.send(event);
    }
}
