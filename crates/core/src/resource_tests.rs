// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;
use yare::parameterized;

fn at(secs: i64) -> Timestamp {
    Utc.timestamp_opt(secs, 0).unwrap()
}

#[parameterized(
    edited_after_regeneration = { 10, 0, true },
    edited_at_regeneration = { 10, 10, false },
    regenerated_after_edit = { 10, 50, false },
)]
fn staleness(edit: i64, regen: i64, stale: bool) {
    assert_eq!(StalenessSnapshot::new(at(edit), at(regen)).is_stale(), stale);
}

#[test]
fn resource_id_displays_raw_key() {
    let id = ResourceId::from("workspace-7");
    assert_eq!(id.to_string(), "workspace-7");
    assert_eq!(id.as_str(), "workspace-7");
}

#[test]
fn resource_id_serializes_as_plain_string() {
    let id = ResourceId::new("s1");
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"s1\"");
}
