// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::job::FakeJob;
use crate::probe::FakeProbe;
use chrono::{TimeZone, Utc};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// A writer that captures log output for testing
#[derive(Clone, Default)]
struct CapturedLogs {
    logs: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    fn new() -> Self {
        Self::default()
    }

    fn contents(&self) -> String {
        let logs = self.logs.lock().unwrap();
        String::from_utf8_lossy(&logs).to_string()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run a test with captured tracing output
fn with_tracing<F, Fut>(f: F) -> (String, Fut::Output)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future,
{
    let logs = CapturedLogs::new();
    let logs_clone = logs.clone();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs_clone)
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, || {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(f())
    });

    (logs.contents(), result)
}

#[tokio::test]
async fn traced_wrappers_pass_results_through() {
    let probe = FakeProbe::new();
    let at = Utc.timestamp_opt(5, 0).unwrap();
    probe.set("s1", StalenessSnapshot::new(at, at));
    let job = FakeJob::new();
    job.fail_next("boom");

    let traced_probe = TracedProbe::new(probe);
    let traced_job = TracedJob::new(job.clone());
    let id = ResourceId::new("s1");

    assert_eq!(
        traced_probe.fetch(&id).await.unwrap(),
        StalenessSnapshot::new(at, at)
    );
    assert_eq!(
        traced_job.run(&id).await,
        Err(JobError::Failed("boom".to_string()))
    );
    assert_eq!(job.call_count(), 1);
}

#[test]
fn traced_job_logs_span_and_outcome() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedJob::new(FakeJob::new());
        traced.run(&ResourceId::new("workspace-3")).await
    });

    assert!(result.is_ok());
    assert!(logs.contains("job.run"), "Should log span name. Logs:\n{}", logs);
    assert!(logs.contains("workspace-3"), "Should log resource. Logs:\n{}", logs);
    assert!(logs.contains("regenerated"), "Should log success. Logs:\n{}", logs);
    assert!(logs.contains("elapsed_ms"), "Should log timing. Logs:\n{}", logs);
}

#[test]
fn traced_job_logs_failure_reason() {
    let (logs, result) = with_tracing(|| async {
        let job = FakeJob::new();
        job.fail_next("model overloaded");
        TracedJob::new(job).run(&ResourceId::new("s1")).await
    });

    assert!(result.is_err());
    assert!(logs.contains("regeneration failed"), "Logs:\n{}", logs);
    assert!(logs.contains("model overloaded"), "Logs:\n{}", logs);
}

#[test]
fn traced_probe_logs_failures() {
    let (logs, result) = with_tracing(|| async {
        TracedProbe::new(FakeProbe::new())
            .fetch(&ResourceId::new("ghost"))
            .await
    });

    assert!(result.is_err());
    assert!(logs.contains("probe failed"), "Logs:\n{}", logs);
    assert!(logs.contains("ghost"), "Logs:\n{}", logs);
}

#[test]
fn traced_probe_logs_span_and_timing() {
    let (logs, result) = with_tracing(|| async {
        let probe = FakeProbe::new();
        let at = Utc.timestamp_opt(5, 0).unwrap();
        probe.set("session-9", StalenessSnapshot::new(at, at));
        TracedProbe::new(probe)
            .fetch(&ResourceId::new("session-9"))
            .await
    });

    assert!(result.is_ok());
    assert!(logs.contains("probe.fetch"), "Should log span name. Logs:\n{}", logs);
    assert!(logs.contains("session-9"), "Should log resource. Logs:\n{}", logs);
    assert!(logs.contains("probed"), "Should log outcome. Logs:\n{}", logs);
    assert!(logs.contains("elapsed_ms"), "Should log timing. Logs:\n{}", logs);
}
