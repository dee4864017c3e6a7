// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-flight regeneration runs

use futures::future::{self, BoxFuture, FutureExt, Shared};
use regen_adapters::JobError;
use std::future::Future;
use tokio::runtime::Handle;

/// Completion handle for one regeneration run
///
/// Every caller that joins the same run holds a clone of the same handle and
/// observes the same outcome. Awaiting is optional: the run is driven to
/// completion on its own task.
pub type RunHandle = Shared<BoxFuture<'static, Result<(), JobError>>>;

/// Spawn `work` on `runtime` and return a shareable handle to its outcome
pub(crate) fn launch<F>(runtime: &Handle, work: F) -> RunHandle
where
    F: Future<Output = Result<(), JobError>> + Send + 'static,
{
    let handle = work.boxed().shared();
    runtime.spawn(handle.clone());
    handle
}

/// Handle that is already resolved
pub(crate) fn settled(result: Result<(), JobError>) -> RunHandle {
    future::ready(result).boxed().shared()
}

#[cfg(test)]
#[path = "flight_tests.rs"]
mod tests;
