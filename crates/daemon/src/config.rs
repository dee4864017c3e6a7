// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration file
//!
//! Relative paths in the file (sources, artifacts, the log path, and the
//! working directory of commands) are resolved against the directory the
//! file lives in.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use regen_adapters::{CommandJob, FileProbe, FileSources, JobCommand};
use regen_core::{ConfigError, ResourceId, SchedulerConfig};
use serde::Deserialize;

use crate::lifecycle::LifecycleError;

/// Config file read when `--config` is not given
pub const DEFAULT_CONFIG: &str = "regen.toml";

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Parsed `regen.toml`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub daemon: DaemonSettings,
    #[serde(default, rename = "resource")]
    pub resources: Vec<ResourceConfig>,
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// `[daemon]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DaemonSettings {
    /// How often every resource is re-observed
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    pub log_path: Option<PathBuf>,
}

impl Default for DaemonSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            log_path: None,
        }
    }
}

/// One `[[resource]]` entry
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceConfig {
    pub id: ResourceId,
    /// Files (or directories, one level deep) whose edits make the artifact stale
    pub sources: Vec<PathBuf>,
    pub artifact: PathBuf,
    /// Shell command that rebuilds the artifact
    pub command: String,
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

impl Config {
    /// Read and validate the config file at `path`
    pub fn load(path: &Path) -> Result<Self, LifecycleError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::parse(&text)?;
        config.base_dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Ok(config)
    }

    /// Parse and validate config text; relative paths resolve against the
    /// current directory
    pub fn parse(text: &str) -> Result<Self, LifecycleError> {
        let mut config: Self = toml::from_str(text).map_err(ConfigError::from)?;
        config.validate()?;
        config.base_dir = PathBuf::from(".");
        Ok(config)
    }

    fn validate(&self) -> Result<(), LifecycleError> {
        self.scheduler.validate()?;

        if self.daemon.poll_interval.is_zero() {
            return Err(ConfigError::Invalid {
                field: "daemon.poll_interval",
                reason: "must be greater than zero".to_string(),
            }
            .into());
        }

        let mut seen = HashSet::new();
        for resource in &self.resources {
            if !seen.insert(&resource.id) {
                return Err(LifecycleError::DuplicateResource(resource.id.clone()));
            }
            if resource.sources.is_empty() {
                return Err(LifecycleError::NoSources(resource.id.clone()));
            }
            if resource.command.trim().is_empty() {
                return Err(LifecycleError::EmptyCommand(resource.id.clone()));
            }
        }
        Ok(())
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }

    /// Daemon log file, defaulting to the user state directory
    pub fn log_path(&self) -> Result<PathBuf, LifecycleError> {
        if let Some(path) = &self.daemon.log_path {
            return Ok(self.resolve(path));
        }
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .map(|dir| dir.join("regend").join("regend.log"))
            .ok_or(LifecycleError::NoStateDir)
    }

    pub fn resource_ids(&self) -> Vec<ResourceId> {
        self.resources.iter().map(|r| r.id.clone()).collect()
    }

    /// Probe comparing each resource's source mtimes with its artifact
    pub fn probe(&self) -> FileProbe {
        self.resources
            .iter()
            .map(|r| {
                let sources = r.sources.iter().map(|p| self.resolve(p)).collect();
                (r.id.clone(), FileSources::new(sources, self.resolve(&r.artifact)))
            })
            .collect()
    }

    /// Job running each resource's command from the config directory
    pub fn job(&self) -> CommandJob {
        let commands: HashMap<ResourceId, JobCommand> = self
            .resources
            .iter()
            .map(|r| {
                let command = JobCommand::new(r.command.clone());
                let command = match r.timeout {
                    Some(timeout) => command.with_timeout(timeout),
                    None => command,
                };
                (r.id.clone(), command)
            })
            .collect();

        CommandJob::new(commands).with_cwd(&self.base_dir)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
