// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the scheduler registry

use regen_adapters::ProbeError;
use regen_core::{ConfigError, ResourceId};
use thiserror::Error;

/// Errors surfaced by [`crate::SchedulerRegistry`]
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid scheduler config: {0}")]
    Config(#[from] ConfigError),
    #[error("no tokio runtime to run timers and jobs on: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
    #[error("staleness probe failed for {id}: {source}")]
    Probe {
        id: ResourceId,
        #[source]
        source: ProbeError,
    },
}
