// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Staleness probes: where edit and regeneration times come from

mod file;

pub use file::{FileProbe, FileSources};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeProbe;

use async_trait::async_trait;
use regen_core::{ResourceId, StalenessSnapshot};
use thiserror::Error;

/// Errors from reading staleness data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("unknown resource: {0}")]
    UnknownResource(ResourceId),
    #[error("probe unavailable: {0}")]
    Unavailable(String),
    #[error("malformed staleness data: {0}")]
    Malformed(String),
}

/// Source of [`StalenessSnapshot`]s
///
/// Called on every observation, so implementations must be cheap.
#[async_trait]
pub trait StalenessProbe: Clone + Send + Sync + 'static {
    async fn fetch(&self, id: &ResourceId) -> Result<StalenessSnapshot, ProbeError>;
}
