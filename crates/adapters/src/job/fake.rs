// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake regeneration job for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{JobError, RegenerationJob};
use async_trait::async_trait;
use regen_core::ResourceId;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

/// Recorded job invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobCall {
    pub id: ResourceId,
}

#[derive(Debug, Default)]
struct FakeJobState {
    calls: Vec<JobCall>,
    outcomes: VecDeque<Result<(), JobError>>,
    active: usize,
    max_active: usize,
}

type SuccessHook = Arc<dyn Fn(&ResourceId) + Send + Sync>;

/// Fake job with scripted outcomes
///
/// A held job blocks every run until [`FakeJob::release`] hands out a permit,
/// which lets tests observe the scheduler while a job is in flight.
#[derive(Clone)]
pub struct FakeJob {
    state: Arc<Mutex<FakeJobState>>,
    gate: Option<Arc<Semaphore>>,
    on_success: Option<SuccessHook>,
}

impl Default for FakeJob {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeJob {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeJobState::default())),
            gate: None,
            on_success: None,
        }
    }

    /// Block each run until released
    pub fn held() -> Self {
        Self {
            gate: Some(Arc::new(Semaphore::new(0))),
            ..Self::new()
        }
    }

    /// Call `hook` after every successful run, e.g. to advance a fake probe
    pub fn on_success(mut self, hook: impl Fn(&ResourceId) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Arc::new(hook));
        self
    }

    /// Let `runs` held runs finish
    pub fn release(&self, runs: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(runs);
        }
    }

    /// Fail the next run with `reason`
    pub fn fail_next(&self, reason: impl Into<String>) {
        self.state()
            .outcomes
            .push_back(Err(JobError::Failed(reason.into())));
    }

    /// Get all recorded runs
    pub fn calls(&self) -> Vec<JobCall> {
        self.state().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state().calls.len()
    }

    /// Runs currently in flight
    pub fn active(&self) -> usize {
        self.state().active
    }

    /// Highest number of runs ever in flight at once
    pub fn max_concurrent(&self) -> usize {
        self.state().max_active
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeJobState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl RegenerationJob for FakeJob {
    async fn run(&self, id: &ResourceId) -> Result<(), JobError> {
        {
            let mut state = self.state();
            state.calls.push(JobCall { id: id.clone() });
            state.active += 1;
            state.max_active = state.max_active.max(state.active);
        }

        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        let outcome = {
            let mut state = self.state();
            state.active -= 1;
            state.outcomes.pop_front().unwrap_or(Ok(()))
        };

        if outcome.is_ok() {
            if let Some(hook) = &self.on_success {
                hook(id);
            }
        }
        outcome
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
