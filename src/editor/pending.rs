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

//! Pending-sync state machine for positional edits.
//!
//! ```text
//! Idle ──drag──► Dirty ──release──► Scheduled{deadline} ──poll(now >= deadline)──► Applied
//!                  ▲                      │ move re-arms deadline                     │
//!                  └──────────────────────┴────────────── drag ◄──────────────────────┘
//! ```
//!
//! A structural pass settles any pending state to `Applied`; a reload resets to `Idle`.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    /// Positions changed, drag still in progress
    Dirty,
    Scheduled {
        deadline: Instant,
    },
    Applied,
}

#[derive(Debug, Clone)]
pub struct PendingSync {
    state: SyncState,
    window: Duration,
}

impl PendingSync {
    pub fn new(window: Duration) -> Self {
        Self {
            state: SyncState::Idle,
            window,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, SyncState::Dirty | SyncState::Scheduled { .. })
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            SyncState::Scheduled { deadline } => Some(deadline),
            _ => None,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.state = SyncState::Dirty;
    }

    /// Arm (or re-arm) the quiescence deadline from `now`
    pub fn schedule(&mut self, now: Instant) {
        self.state = SyncState::Scheduled {
            deadline: now + self.window,
        };
    }

    /// True exactly once per elapsed deadline; the caller then runs the pass.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.state {
            SyncState::Scheduled { deadline } if deadline <= now => {
                self.state = SyncState::Applied;
                true
            }
            _ => false,
        }
    }

    /// A pass ran for another reason; nothing is pending any more.
    pub fn settle(&mut self) {
        if self.state != SyncState::Idle {
            self.state = SyncState::Applied;
        }
    }

    pub fn reset(&mut self) {
        self.state = SyncState::Idle;
    }
}
