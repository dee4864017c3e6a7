// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shell command regeneration job

use super::{JobError, RegenerationJob};
use async_trait::async_trait;
use regen_core::ResourceId;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;

/// Environment variable carrying the resource id into the command
pub const RESOURCE_ENV: &str = "REGEN_RESOURCE";

/// Command regenerating one resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobCommand {
    /// Passed to `sh -c`
    pub run: String,
    pub timeout: Option<Duration>,
}

impl JobCommand {
    pub fn new(run: impl Into<String>) -> Self {
        Self {
            run: run.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Job that runs a configured shell command per resource
#[derive(Debug, Clone, Default)]
pub struct CommandJob {
    commands: Arc<HashMap<ResourceId, JobCommand>>,
    cwd: Option<PathBuf>,
}

impl CommandJob {
    pub fn new(commands: HashMap<ResourceId, JobCommand>) -> Self {
        Self {
            commands: Arc::new(commands),
            cwd: None,
        }
    }

    /// Run commands from `cwd` instead of the process working directory
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }
}

#[async_trait]
impl RegenerationJob for CommandJob {
    async fn run(&self, id: &ResourceId) -> Result<(), JobError> {
        let command = self
            .commands
            .get(id)
            .ok_or_else(|| JobError::UnknownResource(id.clone()))?;

        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(&command.run)
            .env(RESOURCE_ENV, id.as_str())
            .kill_on_drop(true);
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }

        let output = cmd.output();
        let output = match command.timeout {
            Some(limit) => tokio::time::timeout(limit, output)
                .await
                .map_err(|_| JobError::Timeout(limit))?,
            None => output.await,
        }
        .map_err(|e| JobError::Spawn(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = match stderr.trim() {
                "" => format!("exited with {}", output.status),
                msg => msg.to_string(),
            };
            return Err(JobError::Failed(reason));
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
