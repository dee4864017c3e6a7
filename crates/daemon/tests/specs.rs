// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Behavioral specifications for the regend binary.
//!
//! These tests are black-box: they invoke the binary and verify stdout,
//! stderr, exit codes, and the files its jobs produce.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

#[path = "specs/check.rs"]
mod check;
#[path = "specs/run.rs"]
mod run;
