// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for testable time handling
//!
//! Schedulers need two notions of time: a monotonic [`Instant`] for
//! bookkeeping local to this process (eviction order), and a wall-clock
//! [`Timestamp`] comparable with the edit times reported by a probe.

use crate::resource::Timestamp;
use chrono::Utc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// A clock that provides the current time
pub trait Clock: Clone + Send + Sync + 'static {
    fn now(&self) -> Instant;

    fn utc_now(&self) -> Timestamp;
}

/// Real system clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn utc_now(&self) -> Timestamp {
        Utc::now()
    }
}

#[derive(Debug)]
struct FakeTime {
    instant: Instant,
    utc: Timestamp,
}

/// Fake clock for testing with controllable time
///
/// Both readings move together: advancing by ten seconds advances the
/// monotonic instant and the wall-clock timestamp by ten seconds.
#[derive(Clone, Debug)]
pub struct FakeClock {
    current: Arc<Mutex<FakeTime>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// Create a clock whose wall-clock reading starts at `utc`
    pub fn at(utc: Timestamp) -> Self {
        Self {
            current: Arc::new(Mutex::new(FakeTime {
                instant: Instant::now(),
                utc,
            })),
        }
    }

    /// Advance the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        current.instant += duration;
        if let Ok(delta) = chrono::Duration::from_std(duration) {
            current.utc += delta;
        }
    }

    /// Set the wall-clock reading, leaving the monotonic instant untouched
    ///
    /// Used to simulate clock skew: the wall clock may jump backwards.
    pub fn set_utc(&self, utc: Timestamp) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        current.utc = utc;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .instant
    }

    fn utc_now(&self) -> Timestamp {
        self.current.lock().unwrap_or_else(|e| e.into_inner()).utc
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
