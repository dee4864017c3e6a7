// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake staleness probe for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ProbeError, StalenessProbe};
use async_trait::async_trait;
use regen_core::{ResourceId, StalenessSnapshot, Timestamp};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct FakeProbeState {
    snapshots: HashMap<ResourceId, StalenessSnapshot>,
    failures: VecDeque<ProbeError>,
    calls: Vec<ResourceId>,
}

/// In-memory probe with scripted snapshots and failures
#[derive(Clone, Debug, Default)]
pub struct FakeProbe {
    inner: Arc<Mutex<FakeProbeState>>,
}

impl FakeProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot reported for `id`
    pub fn set(&self, id: impl Into<ResourceId>, snapshot: StalenessSnapshot) {
        self.state().snapshots.insert(id.into(), snapshot);
    }

    /// Record an edit at `at`
    pub fn edit(&self, id: impl Into<ResourceId>, at: Timestamp) {
        let mut state = self.state();
        let snapshot = state
            .snapshots
            .entry(id.into())
            .or_insert_with(|| StalenessSnapshot::new(at, at));
        snapshot.last_edit_at = at;
    }

    /// Record a regeneration at `at`
    pub fn regenerated(&self, id: &ResourceId, at: Timestamp) {
        let mut state = self.state();
        let snapshot = state
            .snapshots
            .entry(id.clone())
            .or_insert_with(|| StalenessSnapshot::new(at, at));
        snapshot.last_regenerated_at = at;
    }

    /// Fail the next fetch (any resource) with `error`
    pub fn fail_next(&self, error: ProbeError) {
        self.state().failures.push_back(error);
    }

    pub fn snapshot(&self, id: &ResourceId) -> Option<StalenessSnapshot> {
        self.state().snapshots.get(id).copied()
    }

    /// Get all recorded fetches
    pub fn calls(&self) -> Vec<ResourceId> {
        self.state().calls.clone()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeProbeState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl StalenessProbe for FakeProbe {
    async fn fetch(&self, id: &ResourceId) -> Result<StalenessSnapshot, ProbeError> {
        let mut state = self.state();
        state.calls.push(id.clone());
        if let Some(error) = state.failures.pop_front() {
            return Err(error);
        }
        state
            .snapshots
            .get(id)
            .copied()
            .ok_or_else(|| ProbeError::UnknownResource(id.clone()))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
