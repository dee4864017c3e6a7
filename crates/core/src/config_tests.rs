// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[test]
fn defaults_use_thirty_second_debounce() {
    let config = SchedulerConfig::default();
    assert_eq!(config.debounce, Duration::from_secs(30));
    assert_eq!(config.min_delay, Duration::ZERO);
    assert!(config.validate().is_ok());
}

#[test]
fn parses_human_readable_durations() {
    let config = SchedulerConfig::from_toml_str(
        r#"
        debounce = "2m"
        min_delay = "500ms"
        max_resources = 10
        "#,
    )
    .unwrap();

    assert_eq!(config.debounce, Duration::from_secs(120));
    assert_eq!(config.min_delay, Duration::from_millis(500));
    assert_eq!(config.max_resources, 10);
    assert_eq!(config.event_capacity, 256);
}

#[test]
fn empty_table_yields_defaults() {
    let config = SchedulerConfig::from_toml_str("").unwrap();
    assert_eq!(config, SchedulerConfig::default());
}

#[parameterized(
    zero_debounce = { r#"debounce = "0s""#, "debounce" },
    huge_debounce = { r#"debounce = "2days""#, "debounce" },
    min_delay_over_debounce = { "debounce = \"10s\"\nmin_delay = \"11s\"", "min_delay" },
    zero_max_resources = { "max_resources = 0", "max_resources" },
    zero_event_capacity = { "event_capacity = 0", "event_capacity" },
)]
fn rejects_invalid_settings(input: &str, field: &str) {
    let err = SchedulerConfig::from_toml_str(input).unwrap_err();
    match err {
        ConfigError::Invalid { field: f, .. } => assert_eq!(f, field),
        other => panic!("expected invalid {}, got {:?}", field, other),
    }
}

#[parameterized(
    negative_duration = { r#"debounce = "-5s""# },
    unknown_field = { "debounse = \"5s\"" },
    wrong_type = { "max_resources = \"many\"" },
)]
fn rejects_malformed_input(input: &str) {
    assert!(matches!(
        SchedulerConfig::from_toml_str(input),
        Err(ConfigError::Parse(_))
    ));
}
