// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for the scheduler's external collaborators

pub mod job;
pub mod probe;
pub mod traced;

pub use job::{CommandJob, JobCommand, JobError, RegenerationJob, RESOURCE_ENV};
pub use probe::{FileProbe, FileSources, ProbeError, StalenessProbe};
pub use traced::{TracedJob, TracedProbe};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use job::{FakeJob, JobCall};
#[cfg(any(test, feature = "test-support"))]
pub use probe::FakeProbe;
