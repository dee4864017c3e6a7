// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource identifiers and staleness snapshots

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wall-clock instant used for edit and regeneration times
pub type Timestamp = DateTime<Utc>;

/// Unique identifier for a resource (a session or a workspace)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ResourceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The two timestamps needed to decide whether a resource is stale
///
/// For a workspace, `last_edit_at` is already the max across all of its
/// sessions; aggregation is the probe's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StalenessSnapshot {
    pub last_edit_at: Timestamp,
    pub last_regenerated_at: Timestamp,
}

impl StalenessSnapshot {
    pub fn new(last_edit_at: Timestamp, last_regenerated_at: Timestamp) -> Self {
        Self {
            last_edit_at,
            last_regenerated_at,
        }
    }

    /// An artifact is stale when the resource was edited after it was produced
    pub fn is_stale(&self) -> bool {
        self.last_edit_at > self.last_regenerated_at
    }
}

#[cfg(test)]
#[path = "resource_tests.rs"]
mod tests;
