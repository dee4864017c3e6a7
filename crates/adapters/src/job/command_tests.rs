// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::TempDir;

fn job_for(id: &str, command: JobCommand) -> CommandJob {
    CommandJob::new([(ResourceId::new(id), command)].into_iter().collect())
}

#[tokio::test]
async fn successful_command_writes_artifact() {
    let dir = TempDir::new().unwrap();
    let job = job_for(
        "s1",
        JobCommand::new("echo \"summary of $REGEN_RESOURCE\" > summary.md"),
    )
    .with_cwd(dir.path());

    job.run(&ResourceId::new("s1")).await.unwrap();

    let summary = std::fs::read_to_string(dir.path().join("summary.md")).unwrap();
    assert_eq!(summary.trim(), "summary of s1");
}

#[tokio::test]
async fn failing_command_reports_stderr() {
    let job = job_for("s1", JobCommand::new("echo 'model overloaded' >&2; exit 3"));

    let err = job.run(&ResourceId::new("s1")).await.unwrap_err();

    assert_eq!(err, JobError::Failed("model overloaded".to_string()));
}

#[tokio::test]
async fn silent_failure_reports_exit_status() {
    let job = job_for("s1", JobCommand::new("exit 7"));

    let err = job.run(&ResourceId::new("s1")).await.unwrap_err();

    match err {
        JobError::Failed(reason) => assert!(reason.contains('7'), "{}", reason),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn slow_command_times_out() {
    let job = job_for(
        "s1",
        JobCommand::new("sleep 5").with_timeout(Duration::from_millis(50)),
    );

    let err = job.run(&ResourceId::new("s1")).await.unwrap_err();

    assert_eq!(err, JobError::Timeout(Duration::from_millis(50)));
}

#[tokio::test]
async fn unknown_resource_is_rejected() {
    let job = CommandJob::default();

    let err = job.run(&ResourceId::new("s9")).await.unwrap_err();

    assert_eq!(err, JobError::UnknownResource(ResourceId::new("s9")));
}
