// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Debounce timers
//!
//! Each armed timer is a task on the registry's runtime sleeping until its
//! deadline. Dropping the handle aborts the task, so overwriting a resource's
//! timer slot cancels the timer it replaces.

use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::Instant;

/// Handle to one armed debounce timer
#[derive(Debug)]
pub(crate) struct TimerHandle {
    generation: u64,
    task: AbortHandle,
}

impl TimerHandle {
    /// Arm a timer on `runtime` calling `on_fire` after `delay`
    ///
    /// The deadline is fixed now, not when the task is first polled, and is
    /// read from the runtime's clock even when called from a plain thread.
    pub(crate) fn arm<F>(runtime: &Handle, delay: Duration, generation: u64, on_fire: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let deadline = {
            let _context = runtime.enter();
            Instant::now() + delay
        };
        let task = runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            on_fire();
        })
        .abort_handle();

        Self { generation, task }
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
