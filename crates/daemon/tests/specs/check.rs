// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Config validation specs
//!
//! Verify `regend --check` accepts good configs and explains bad ones.

use crate::prelude::*;

#[test]
fn check_lists_configured_resources() {
    let temp = Project::empty();
    temp.file("regen.toml", MINIMAL_CONFIG);

    temp.regend()
        .args(&["--check"])
        .passes()
        .stdout_has("config ok")
        .stdout_has("debounce: 1s")
        .stdout_has("resource: notes");
}

#[test]
fn check_reads_explicit_config_path() {
    let temp = Project::empty();
    temp.file("conf/custom.toml", MINIMAL_CONFIG);

    temp.regend()
        .args(&["--config", "conf/custom.toml", "--check"])
        .passes()
        .stdout_has("resource: notes");
}

#[test]
fn check_rejects_zero_debounce() {
    let temp = Project::empty();
    temp.file("regen.toml", "[scheduler]\ndebounce = \"0s\"\n");

    temp.regend()
        .args(&["--check"])
        .fails()
        .stderr_has("invalid debounce");
}

#[test]
fn check_rejects_duplicate_resources() {
    let temp = Project::empty();
    let resource = "[[resource]]\nid = \"a\"\nsources = [\"a\"]\nartifact = \"b\"\ncommand = \"true\"\n";
    temp.file("regen.toml", &format!("{resource}{resource}"));

    temp.regend()
        .args(&["--check"])
        .fails()
        .stderr_has("duplicate resource id: a");
}

#[test]
fn missing_config_fails_with_path() {
    let temp = Project::empty();

    temp.regend()
        .args(&["--check"])
        .fails()
        .stderr_has("regen.toml");
}

#[test]
fn help_describes_flags() {
    let temp = Project::empty();

    temp.regend()
        .args(&["--help"])
        .passes()
        .stdout_has("--foreground")
        .stdout_has("--check");
}
