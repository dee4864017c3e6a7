// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource scheduler state machine
//!
//! One scheduler per resource decides when its derived artifact must be
//! regenerated. Edits are coalesced into a debounce window that ends
//! `debounce` after the newest edit; at most one job is ever in flight; edits
//! that land while a job runs are remembered and re-armed once it completes.
//!
//! The machine is pure: [`ResourceScheduler::transition`] returns the next
//! state plus the [`Effect`]s the caller must carry out (arm/cancel a timer,
//! start the job, emit an event).

use crate::clock::Clock;
use crate::config::SchedulerConfig;
use crate::effect::{Effect, SchedulerEvent};
use crate::resource::{ResourceId, StalenessSnapshot, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Where a resource's regeneration currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Artifact reflects the latest edit
    UpToDate,
    /// Debounce timer armed, regeneration not started
    Pending,
    /// Regeneration job in flight
    Running,
    /// Known or assumed stale with no timer armed
    Outdated,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::UpToDate => "up_to_date",
            Phase::Pending => "pending",
            Phase::Running => "running",
            Phase::Outdated => "outdated",
        };
        write!(f, "{}", s)
    }
}

/// Inputs that drive scheduler transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerInput {
    /// A fresh staleness snapshot was reported
    Observe(StalenessSnapshot),
    /// The probe could not be read; phase is held
    ProbeFailed { reason: String },
    /// A debounce timer fired
    TimerFired { generation: u64 },
    /// Run immediately, bypassing debounce
    RunNow,
    /// The job succeeded; `snapshot` was fetched after it finished
    JobSucceeded { snapshot: StalenessSnapshot },
    /// The job failed
    JobFailed { reason: String },
    /// The job succeeded but the follow-up snapshot could not be read
    RecheckFailed { reason: String },
    /// Disarm the debounce timer (resource deleted)
    CancelPending,
}

/// Immutable view of a scheduler handed to observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub phase: Phase,
    pub pending: bool,
    pub running: bool,
    /// The last run for `last_observed_edit_at` failed
    pub failed: bool,
    pub last_error: Option<String>,
    pub last_observed_edit_at: Option<Timestamp>,
    pub running_since: Option<Timestamp>,
}

impl Status {
    /// Status of a resource nobody has reported on yet
    pub fn unobserved() -> Self {
        Self {
            phase: Phase::Outdated,
            pending: false,
            running: false,
            failed: false,
            last_error: None,
            last_observed_edit_at: None,
            running_since: None,
        }
    }

    /// Short human-readable summary for display next to the artifact
    pub fn describe(&self) -> &'static str {
        match (self.phase, self.failed) {
            (Phase::UpToDate, _) => "up to date",
            (Phase::Pending, _) => "regeneration scheduled",
            (Phase::Running, _) => "regenerating",
            (Phase::Outdated, true) => "regeneration failed, will retry on next edit",
            (Phase::Outdated, false) => "outdated",
        }
    }
}

/// Per-resource scheduling state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceScheduler {
    pub id: ResourceId,
    pub phase: Phase,
    /// Newest edit a timer has been armed for
    pub last_observed_edit_at: Option<Timestamp>,
    pub running_since: Option<Timestamp>,
    /// Probe or job error, whichever came last
    pub last_error: Option<String>,
    /// Set by a failed run, cleared by a successful one or a current snapshot
    job_failed: bool,
    debounce: Duration,
    min_delay: Duration,
    /// Generation of the armed timer, if any
    armed_timer: Option<u64>,
    generation: u64,
    /// `last_observed_edit_at` when the current run started
    run_base_edit_at: Option<Timestamp>,
    /// Newest edit reported while running
    edited_during_run: Option<Timestamp>,
}

impl ResourceScheduler {
    /// Create a scheduler in the initial `Outdated` phase
    pub fn new(id: impl Into<ResourceId>, config: &SchedulerConfig) -> Self {
        Self {
            id: id.into(),
            phase: Phase::Outdated,
            last_observed_edit_at: None,
            running_since: None,
            last_error: None,
            job_failed: false,
            debounce: config.debounce,
            min_delay: config.min_delay,
            armed_timer: None,
            generation: 0,
            run_base_edit_at: None,
            edited_during_run: None,
        }
    }

    pub fn status(&self) -> Status {
        Status {
            phase: self.phase,
            pending: self.phase == Phase::Pending,
            running: self.phase == Phase::Running,
            failed: self.job_failed,
            last_error: self.last_error.clone(),
            last_observed_edit_at: self.last_observed_edit_at,
            running_since: self.running_since,
        }
    }

    /// Generation of the currently armed timer
    pub fn armed_timer(&self) -> Option<u64> {
        self.armed_timer
    }

    /// Nothing armed and nothing running: safe to drop and recreate later
    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::UpToDate | Phase::Outdated) && self.armed_timer.is_none()
    }

    /// Delay until `edit_at + debounce`, clamped to at least `min_delay`
    ///
    /// A deadline already in the past (clock skew, edits made before a
    /// restart) yields `min_delay`.
    pub fn debounce_delay(&self, edit_at: Timestamp, now: Timestamp) -> Duration {
        let fire_at = chrono::Duration::from_std(self.debounce)
            .ok()
            .and_then(|debounce| edit_at.checked_add_signed(debounce));
        let remaining = fire_at
            .and_then(|fire_at| (fire_at - now).to_std().ok())
            .unwrap_or(Duration::ZERO);
        remaining.max(self.min_delay)
    }

    /// Pure transition function - returns new state and effects
    pub fn transition(
        &self,
        input: SchedulerInput,
        clock: &impl Clock,
    ) -> (ResourceScheduler, Vec<Effect>) {
        let mut next = self.clone();
        let mut effects = Vec::new();
        let now = clock.utc_now();

        match input {
            SchedulerInput::Observe(snapshot) => next.observe(snapshot, now, &mut effects),

            SchedulerInput::ProbeFailed { reason } => {
                next.last_error = Some(reason);
            }

            SchedulerInput::TimerFired { generation } => {
                // A fire for a superseded timer, or one that lost a race with
                // run_now, is ignored.
                if self.phase == Phase::Pending && self.armed_timer == Some(generation) {
                    next.armed_timer = None;
                    next.start_run(now, &mut effects);
                }
            }

            SchedulerInput::RunNow => {
                if self.phase != Phase::Running {
                    if next.armed_timer.take().is_some() {
                        effects.push(Effect::CancelTimer);
                    }
                    next.start_run(now, &mut effects);
                }
            }

            SchedulerInput::JobSucceeded { snapshot } => {
                if self.phase == Phase::Running {
                    next.complete(snapshot, &mut effects);
                }
            }

            SchedulerInput::JobFailed { reason } | SchedulerInput::RecheckFailed { reason } => {
                if self.phase == Phase::Running {
                    next.finish_run();
                    next.phase = Phase::Outdated;
                    next.job_failed = true;
                    next.last_error = Some(reason.clone());
                    effects.push(Effect::Emit(SchedulerEvent::RegenerationFailed {
                        id: self.id.clone(),
                        reason,
                    }));
                }
            }

            SchedulerInput::CancelPending => {
                if self.phase == Phase::Pending {
                    next.armed_timer = None;
                    next.phase = Phase::Outdated;
                    effects.push(Effect::CancelTimer);
                    effects.push(Effect::Emit(SchedulerEvent::RegenerationCancelled {
                        id: self.id.clone(),
                    }));
                }
            }
        }

        (next, effects)
    }

    fn observe(
        &mut self,
        snapshot: StalenessSnapshot,
        now: Timestamp,
        effects: &mut Vec<Effect>,
    ) {
        let edit_at = snapshot.last_edit_at;

        if self.phase == Phase::Running {
            // Completion re-check decides; only remember newer edits.
            if snapshot.is_stale() && self.edited_during_run.map_or(true, |seen| edit_at > seen) {
                self.edited_during_run = Some(edit_at);
            }
            return;
        }

        if !snapshot.is_stale() {
            if self.armed_timer.take().is_some() {
                effects.push(Effect::CancelTimer);
            }
            if self.phase != Phase::UpToDate {
                effects.push(Effect::Emit(SchedulerEvent::UpToDate {
                    id: self.id.clone(),
                }));
            }
            self.phase = Phase::UpToDate;
            self.job_failed = false;
            self.last_error = None;
            self.last_observed_edit_at = Some(self.newest_edit(edit_at));
            return;
        }

        // The probe answered, so a probe error is stale now.
        if !self.job_failed {
            self.last_error = None;
        }

        // Pending for this edit already, or a run for it already failed and
        // only a newer edit may retry.
        let seen = self.last_observed_edit_at.is_some_and(|seen| edit_at <= seen);
        let failed = self.phase == Phase::Outdated && self.job_failed;
        if seen && (self.phase == Phase::Pending || failed) {
            return;
        }

        let delay = self.debounce_delay(edit_at, now);
        self.arm(edit_at, delay, effects);
    }

    fn start_run(&mut self, now: Timestamp, effects: &mut Vec<Effect>) {
        self.phase = Phase::Running;
        self.running_since = Some(now);
        self.run_base_edit_at = self.last_observed_edit_at;
        self.edited_during_run = None;
        effects.push(Effect::StartJob);
        effects.push(Effect::Emit(SchedulerEvent::RegenerationStarted {
            id: self.id.clone(),
            at: now,
        }));
    }

    fn complete(&mut self, snapshot: StalenessSnapshot, effects: &mut Vec<Effect>) {
        // Only an edit made after the run started can be missing from the
        // job's output; older edits are judged by the fresh snapshot.
        let missed_edit = self.edited_during_run.filter(|&edit| {
            self.running_since.map_or(true, |start| edit > start)
                && self.run_base_edit_at.map_or(true, |base| edit > base)
        });
        self.finish_run();
        self.job_failed = false;
        self.last_error = None;

        if snapshot.is_stale() || missed_edit.is_some() {
            // New debounce window from now rather than from the edit, so a
            // job that fails to advance its timestamp cannot loop tightly.
            let edit_at = missed_edit
                .map_or(snapshot.last_edit_at, |edit| edit.max(snapshot.last_edit_at));
            self.arm(edit_at, self.debounce.max(self.min_delay), effects);
            effects.push(Effect::Emit(SchedulerEvent::RegenerationSucceeded {
                id: self.id.clone(),
                rescheduled: true,
            }));
            return;
        }

        self.phase = Phase::UpToDate;
        self.last_observed_edit_at = Some(self.newest_edit(snapshot.last_edit_at));
        effects.push(Effect::Emit(SchedulerEvent::RegenerationSucceeded {
            id: self.id.clone(),
            rescheduled: false,
        }));
    }

    fn arm(&mut self, edit_at: Timestamp, delay: Duration, effects: &mut Vec<Effect>) {
        self.generation += 1;
        self.armed_timer = Some(self.generation);
        self.phase = Phase::Pending;
        self.last_observed_edit_at = Some(edit_at);
        effects.push(Effect::ArmTimer {
            delay,
            generation: self.generation,
        });
        effects.push(Effect::Emit(SchedulerEvent::RegenerationScheduled {
            id: self.id.clone(),
            edit_at,
            delay,
        }));
    }

    fn finish_run(&mut self) {
        if let Some(edit) = self.edited_during_run.take() {
            self.last_observed_edit_at = Some(self.newest_edit(edit));
        }
        self.running_since = None;
        self.run_base_edit_at = None;
    }

    fn newest_edit(&self, edit_at: Timestamp) -> Timestamp {
        self.last_observed_edit_at
            .map_or(edit_at, |seen| seen.max(edit_at))
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
