// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! regen-core: pure state for the regeneration scheduler
//!
//! This crate provides:
//! - Resource identifiers and staleness snapshots
//! - The per-resource scheduler state machine
//! - Effects and events the state machine requests
//! - Scheduler configuration
//! - A clock abstraction for deterministic tests

pub mod clock;
pub mod config;
pub mod effect;
pub mod resource;
pub mod scheduler;

// Re-exports
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{ConfigError, SchedulerConfig, MAX_DEBOUNCE};
pub use effect::{Effect, SchedulerEvent};
pub use resource::{ResourceId, StalenessSnapshot, Timestamp};
pub use scheduler::{Phase, ResourceScheduler, SchedulerInput, Status};
