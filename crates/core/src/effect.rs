// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effects and events for scheduler orchestration

use crate::resource::{ResourceId, Timestamp};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Effects are side effects that the scheduler state machine requests
///
/// The registry executes them while still inside the resource's critical
/// section, so a re-arm and the cancellation of the timer it replaces happen
/// atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Emit an event for observers and logs
    Emit(SchedulerEvent),
    /// Cancel whatever timer is armed and arm a new one
    ArmTimer { delay: Duration, generation: u64 },
    /// Cancel the armed timer, if any
    CancelTimer,
    /// Invoke the regeneration job exactly once
    StartJob,
}

/// Events emitted by the scheduler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchedulerEvent {
    RegenerationScheduled {
        id: ResourceId,
        edit_at: Timestamp,
        #[serde(with = "humantime_serde")]
        delay: Duration,
    },
    RegenerationStarted {
        id: ResourceId,
        at: Timestamp,
    },
    RegenerationSucceeded {
        id: ResourceId,
        /// Still stale after the run; a new debounce window was armed
        rescheduled: bool,
    },
    RegenerationFailed {
        id: ResourceId,
        reason: String,
    },
    RegenerationCancelled {
        id: ResourceId,
    },
    UpToDate {
        id: ResourceId,
    },
    Evicted {
        id: ResourceId,
    },
}

impl SchedulerEvent {
    /// Event name in `category:action` form, used for log lines
    pub fn name(&self) -> &'static str {
        match self {
            SchedulerEvent::RegenerationScheduled { .. } => "regen:scheduled",
            SchedulerEvent::RegenerationStarted { .. } => "regen:started",
            SchedulerEvent::RegenerationSucceeded { .. } => "regen:succeeded",
            SchedulerEvent::RegenerationFailed { .. } => "regen:failed",
            SchedulerEvent::RegenerationCancelled { .. } => "regen:cancelled",
            SchedulerEvent::UpToDate { .. } => "resource:up_to_date",
            SchedulerEvent::Evicted { .. } => "resource:evicted",
        }
    }

    pub fn resource(&self) -> &ResourceId {
        match self {
            SchedulerEvent::RegenerationScheduled { id, .. }
            | SchedulerEvent::RegenerationStarted { id, .. }
            | SchedulerEvent::RegenerationSucceeded { id, .. }
            | SchedulerEvent::RegenerationFailed { id, .. }
            | SchedulerEvent::RegenerationCancelled { id }
            | SchedulerEvent::UpToDate { id }
            | SchedulerEvent::Evicted { id } => id,
        }
    }
}

#[cfg(test)]
#[path = "effect_tests.rs"]
mod tests;
