// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::job::{JobError, RegenerationJob};
use crate::probe::{ProbeError, StalenessProbe};
use async_trait::async_trait;
use regen_core::{ResourceId, StalenessSnapshot};
use tracing::Instrument;

/// Wrapper that adds tracing to any StalenessProbe
#[derive(Clone)]
pub struct TracedProbe<P> {
    inner: P,
}

impl<P> TracedProbe<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<P: StalenessProbe> StalenessProbe for TracedProbe<P> {
    async fn fetch(&self, id: &ResourceId) -> Result<StalenessSnapshot, ProbeError> {
        let span = tracing::info_span!("probe.fetch", %id);

        async {
            let start = std::time::Instant::now();
            let result = self.inner.fetch(id).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(snapshot) => tracing::debug!(
                    elapsed_ms,
                    last_edit_at = %snapshot.last_edit_at,
                    last_regenerated_at = %snapshot.last_regenerated_at,
                    stale = snapshot.is_stale(),
                    "probed"
                ),
                Err(e) => tracing::warn!(elapsed_ms, error = %e, "probe failed"),
            }

            result
        }
        .instrument(span)
        .await
    }
}

/// Wrapper that adds tracing to any RegenerationJob
#[derive(Clone)]
pub struct TracedJob<J> {
    inner: J,
}

impl<J> TracedJob<J> {
    pub fn new(inner: J) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<J: RegenerationJob> RegenerationJob for TracedJob<J> {
    async fn run(&self, id: &ResourceId) -> Result<(), JobError> {
        let span = tracing::info_span!("job.run", %id);

        async {
            tracing::info!("starting");

            let start = std::time::Instant::now();
            let result = self.inner.run(id).await;
            let elapsed = start.elapsed();

            match &result {
                Ok(()) => tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "regenerated"),
                Err(e) => tracing::error!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "regeneration failed"
                ),
            }

            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
