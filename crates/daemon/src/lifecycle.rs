// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, polling, shutdown.

use std::time::Duration;

use regen_adapters::{CommandJob, FileProbe, TracedJob, TracedProbe};
use regen_core::{ConfigError, Phase, ResourceId, Status, SystemClock};
use regen_engine::{RegistryError, SchedulerRegistry};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;

/// Registry with concrete adapter types (wrapped with tracing)
pub type DaemonRegistry =
    SchedulerRegistry<TracedProbe<FileProbe>, TracedJob<CommandJob>, SystemClock>;

/// Daemon state during operation
pub struct Daemon {
    pub registry: DaemonRegistry,
    /// Resources observed on every poll
    resources: Vec<ResourceId>,
    pub poll_interval: Duration,
}

/// Per-phase counts from one poll
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PollSummary {
    pub up_to_date: usize,
    pub pending: usize,
    pub running: usize,
    pub outdated: usize,
    /// Resources whose probe failed this round
    pub unavailable: usize,
}

impl PollSummary {
    fn record(&mut self, status: &Status) {
        match status.phase {
            Phase::UpToDate => self.up_to_date += 1,
            Phase::Pending => self.pending += 1,
            Phase::Running => self.running += 1,
            Phase::Outdated => self.outdated += 1,
        }
    }
}

/// Build the registry for `config`
pub fn startup(config: &Config) -> Result<Daemon, LifecycleError> {
    let registry = SchedulerRegistry::new(
        config.scheduler.clone(),
        TracedProbe::new(config.probe()),
        TracedJob::new(config.job()),
        SystemClock,
    )?;

    info!(
        resources = config.resources.len(),
        debounce = %humantime::format_duration(config.scheduler.debounce),
        poll_interval = %humantime::format_duration(config.daemon.poll_interval),
        "scheduler ready"
    );

    Ok(Daemon {
        registry,
        resources: config.resource_ids(),
        poll_interval: config.daemon.poll_interval,
    })
}

impl Daemon {
    /// Observe every configured resource once
    pub async fn poll(&self) -> PollSummary {
        let mut summary = PollSummary::default();

        for id in &self.resources {
            match self.registry.observe(id).await {
                Ok(status) => summary.record(&status),
                Err(e) => {
                    // TracedProbe already warned
                    debug!(error = %e, "observation skipped");
                    summary.unavailable += 1;
                }
            }
        }

        summary
    }

    /// Disarm all timers; in-flight jobs are left to finish or be dropped
    /// with the runtime
    pub fn shutdown(&self) {
        info!("Shutting down daemon...");
        let cancelled = self.registry.cancel_all();
        info!(cancelled, "Daemon shutdown complete");
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("duplicate resource id: {0}")]
    DuplicateResource(ResourceId),

    #[error("resource {0} has no sources")]
    NoSources(ResourceId),

    #[error("resource {0} has an empty command")]
    EmptyCommand(ResourceId),

    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
