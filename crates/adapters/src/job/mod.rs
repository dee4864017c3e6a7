// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Regeneration jobs: recompute a resource's derived artifact

mod command;

pub use command::{CommandJob, JobCommand, RESOURCE_ENV};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeJob, JobCall};

use async_trait::async_trait;
use regen_core::ResourceId;
use std::time::Duration;
use thiserror::Error;

/// Errors from running a regeneration job
///
/// Cloneable so one failure can be handed to every caller sharing a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    #[error("no regeneration job for resource: {0}")]
    UnknownResource(ResourceId),
    #[error("failed to start job: {0}")]
    Spawn(String),
    #[error("job timed out after {0:?}")]
    Timeout(Duration),
    #[error("job failed: {0}")]
    Failed(String),
}

/// Recomputes the artifact for a resource
///
/// Must be idempotent: a completion re-check may schedule another run right
/// away. On success a later probe fetch must report a regeneration time at or
/// after the edit time seen when the job started.
#[async_trait]
pub trait RegenerationJob: Clone + Send + Sync + 'static {
    async fn run(&self, id: &ResourceId) -> Result<(), JobError>;
}
