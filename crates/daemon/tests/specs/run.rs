// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon run specs
//!
//! Verify a running daemon regenerates stale artifacts after the debounce.

use crate::prelude::*;
use std::io::{BufRead, BufReader};
use std::process::{Child, Command, Stdio};
use std::time::Duration;

struct Running(Child);

impl Drop for Running {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

fn start(temp: &Project, args: &[&str]) -> Running {
    let child = Command::new(Project::regend_path())
        .args(args)
        .current_dir(temp.path())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    Running(child)
}

#[test]
fn daemon_regenerates_stale_artifact() {
    let temp = Project::empty();
    temp.file("regen.toml", MINIMAL_CONFIG);
    temp.file("notes.md", "# notes\n");

    let _daemon = start(&temp, &[]);

    let summary = temp.path().join("notes.summary");
    assert!(
        wait_for(Duration::from_secs(15), || summary.exists()),
        "artifact was never regenerated"
    );
    assert!(wait_for(Duration::from_secs(5), || {
        std::fs::read_to_string(&summary).is_ok_and(|s| s == "# notes\n")
    }));
}

#[test]
fn daemon_writes_startup_marker_to_log() {
    let temp = Project::empty();
    temp.file("regen.toml", MINIMAL_CONFIG);
    temp.file("notes.md", "# notes\n");

    let _daemon = start(&temp, &[]);

    let log = temp.path().join("regend.log");
    assert!(wait_for(Duration::from_secs(10), || {
        std::fs::read_to_string(&log).is_ok_and(|s| s.contains("--- regend: starting (pid: "))
    }));
}

#[test]
fn events_flag_streams_json_lines() {
    let temp = Project::empty();
    temp.file("regen.toml", MINIMAL_CONFIG);
    temp.file("notes.md", "# notes\n");

    let mut daemon = start(&temp, &["--foreground", "--events"]);
    let stdout = daemon.0.stdout.take().unwrap();

    let lines: Vec<String> = BufReader::new(stdout)
        .lines()
        .map_while(Result::ok)
        .take_while(|line| !line.contains("regeneration_succeeded"))
        .take(50)
        .collect();

    assert_eq!(lines.first().map(String::as_str), Some("READY"));
    assert!(
        lines.iter().any(|l| l.contains("\"type\":\"regeneration_scheduled\"")),
        "lines: {:?}",
        lines
    );
    assert!(lines.iter().any(|l| l.contains("\"id\":\"notes\"")));
}
