// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for regend specs

use assert_cmd::assert::Assert;
use assert_cmd::Command;
use predicates::str::contains;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// One resource rebuilt by copying its source
pub const MINIMAL_CONFIG: &str = r#"
[scheduler]
debounce = "1s"

[daemon]
poll_interval = "200ms"
log_path = "regend.log"

[[resource]]
id = "notes"
sources = ["notes.md"]
artifact = "notes.summary"
command = "cat notes.md > notes.summary"
"#;

/// Temporary project directory
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` to `relative`, creating parent directories
    pub fn file(&self, relative: &str, contents: &str) {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }

    /// regend invocation running in the project directory
    pub fn regend(&self) -> CliBuilder {
        let mut cmd = Command::cargo_bin("regend").unwrap();
        cmd.current_dir(self.path());
        CliBuilder { cmd }
    }

    /// Path to the compiled binary, for long-running invocations
    pub fn regend_path() -> PathBuf {
        assert_cmd::cargo::cargo_bin("regend")
    }
}

pub struct CliBuilder {
    cmd: Command,
}

impl CliBuilder {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn passes(mut self) -> RunAssert {
        RunAssert {
            assert: self.cmd.assert().success(),
        }
    }

    pub fn fails(mut self) -> RunAssert {
        RunAssert {
            assert: self.cmd.assert().failure(),
        }
    }
}

pub struct RunAssert {
    assert: Assert,
}

impl RunAssert {
    pub fn stdout_has(self, expected: &str) -> Self {
        Self {
            assert: self.assert.stdout(contains(expected)),
        }
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        Self {
            assert: self.assert.stderr(contains(expected)),
        }
    }
}

/// Poll `condition` until it holds or `timeout` passes
pub fn wait_for(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    condition()
}
