// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::{NaiveDate, Timelike};
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Stamped {
    #[serde(default, with = "unix_time")]
    time: Option<DateTime<Utc>>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Span {
    #[serde(with = "naive_time")]
    start: NaiveDateTime,
    #[serde(with = "seconds")]
    duration: Duration,
}

#[test]
fn epoch_float_keeps_subsecond_precision() {
    let s: Stamped = serde_json::from_str(r#"{"time": 1721677403.25}"#).unwrap();
    let time = s.time.unwrap();
    assert_eq!(time.timestamp(), 1_721_677_403);
    assert_eq!(time.nanosecond(), 250_000_000);
}

#[test]
fn missing_or_null_epoch_is_none() {
    let missing: Stamped = serde_json::from_str("{}").unwrap();
    let null: Stamped = serde_json::from_str(r#"{"time": null}"#).unwrap();
    assert_eq!(missing.time, None);
    assert_eq!(null.time, None);
}

#[test]
fn naive_string_and_float_seconds() {
    let span: Span = serde_json::from_str(
        r#"{"start": "2024-07-22T19:43:49.000000", "duration": 12.5}"#,
    )
    .unwrap();
    let expected = NaiveDate::from_ymd_opt(2024, 7, 22)
        .unwrap()
        .and_hms_opt(19, 43, 49)
        .unwrap();
    assert_eq!(span.start, expected);
    assert_eq!(span.duration, Duration::from_millis(12_500));

    let json = serde_json::to_value(&span).unwrap();
    assert_eq!(json["start"], "2024-07-22T19:43:49.000000");
    assert_eq!(json["duration"], 12.5);
}

#[test]
fn naive_string_rejects_garbage() {
    let result: Result<Span, _> =
        serde_json::from_str(r#"{"start": "yesterday", "duration": 1.0}"#);
    assert!(result.is_err());
}

#[test]
fn negative_duration_is_rejected() {
    let result: Result<Span, _> =
        serde_json::from_str(r#"{"start": "2024-07-22T19:43:49.000000", "duration": -1.0}"#);
    assert!(result.is_err());
}
