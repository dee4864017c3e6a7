// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File modification-time probe
//!
//! A resource's edit time is the newest mtime among its source paths; its
//! regeneration time is the mtime of the generated artifact. A workspace is
//! simply a resource with several sources (or a directory of session files).

use super::{ProbeError, StalenessProbe};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regen_core::{ResourceId, StalenessSnapshot, Timestamp};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Paths backing one resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSources {
    /// Files or directories whose edits make the artifact stale
    pub sources: Vec<PathBuf>,
    /// The generated artifact
    pub artifact: PathBuf,
}

impl FileSources {
    pub fn new(sources: Vec<PathBuf>, artifact: impl Into<PathBuf>) -> Self {
        Self {
            sources,
            artifact: artifact.into(),
        }
    }
}

/// Probe reading modification times from the filesystem
#[derive(Debug, Clone, Default)]
pub struct FileProbe {
    resources: Arc<HashMap<ResourceId, FileSources>>,
}

impl FileProbe {
    pub fn new(resources: HashMap<ResourceId, FileSources>) -> Self {
        Self {
            resources: Arc::new(resources),
        }
    }
}

impl FromIterator<(ResourceId, FileSources)> for FileProbe {
    fn from_iter<T: IntoIterator<Item = (ResourceId, FileSources)>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[async_trait]
impl StalenessProbe for FileProbe {
    async fn fetch(&self, id: &ResourceId) -> Result<StalenessSnapshot, ProbeError> {
        let files = self
            .resources
            .get(id)
            .ok_or_else(|| ProbeError::UnknownResource(id.clone()))?;

        if files.sources.is_empty() {
            return Err(ProbeError::Malformed(format!("{} has no sources", id)));
        }

        let mut last_edit = UNIX_EPOCH;
        for source in &files.sources {
            last_edit = last_edit.max(newest_mtime(source).await?);
        }

        let last_regenerated = match tokio::fs::metadata(&files.artifact).await {
            Ok(meta) => modified(&files.artifact, &meta)?,
            // Never generated
            Err(e) if e.kind() == ErrorKind::NotFound => UNIX_EPOCH,
            Err(e) => return Err(unavailable(&files.artifact, e)),
        };

        Ok(StalenessSnapshot::new(
            to_timestamp(last_edit),
            to_timestamp(last_regenerated),
        ))
    }
}

/// Newest mtime of a file, or of a directory and its direct children
async fn newest_mtime(path: &Path) -> Result<SystemTime, ProbeError> {
    let meta = tokio::fs::metadata(path)
        .await
        .map_err(|e| unavailable(path, e))?;
    let mut newest = modified(path, &meta)?;

    if meta.is_dir() {
        let mut entries = tokio::fs::read_dir(path)
            .await
            .map_err(|e| unavailable(path, e))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| unavailable(path, e))?
        {
            let child = entry.path();
            let child_meta = entry.metadata().await.map_err(|e| unavailable(&child, e))?;
            if child_meta.is_file() {
                newest = newest.max(modified(&child, &child_meta)?);
            }
        }
    }

    Ok(newest)
}

fn modified(path: &Path, meta: &std::fs::Metadata) -> Result<SystemTime, ProbeError> {
    meta.modified()
        .map_err(|e| ProbeError::Malformed(format!("{}: {}", path.display(), e)))
}

fn unavailable(path: &Path, e: std::io::Error) -> ProbeError {
    ProbeError::Unavailable(format!("{}: {}", path.display(), e))
}

fn to_timestamp(time: SystemTime) -> Timestamp {
    DateTime::<Utc>::from(time)
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
