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

//! Profile identity fingerprints.
//!
//! The coordinator rebuilds its graph only when the identity of the open
//! profile changes. Identity covers the profile key and the primary
//! interceptor's type tag, but not the rest of the content, so in-place edits
//! keep the identity stable.

use crate::engine_core::models::GuardProfile;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileIdentity(String);

impl ProfileIdentity {
    pub fn of(key: &str, profile: &GuardProfile) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        hasher.update([0u8]);
        hasher.update(profile.primary().type_tag().as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProfileIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form is enough for logs
        f.write_str(&self.0[..self.0.len().min(12)])
    }
}

/// Full-content digest, used to tell a genuine change from an echo
pub fn content_digest(profile: &GuardProfile) -> String {
    let canonical = serde_json::to_vec(profile).unwrap_or_default();
    hex::encode(Sha256::digest(&canonical))
}
