// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Serde helpers for the engine's timestamp encodings
//!
//! Progress and log records carry Unix epoch floats. Archive start/end and
//! repository timestamps are naive strings such as `2024-12-02T10:28:45.000000`.
//! Durations are floating-point seconds.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};
use std::time::Duration;

/// Format of the engine's timezone-less timestamps
pub const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Convert epoch seconds into a UTC timestamp
pub fn from_epoch(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos)
}

fn to_epoch(time: &DateTime<Utc>) -> f64 {
    time.timestamp() as f64 + f64::from(time.timestamp_subsec_nanos()) / 1e9
}

/// Optional epoch-float timestamp; `null` and missing both decode to `None`
pub mod unix_time {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(time) => serializer.serialize_f64(to_epoch(time)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<f64>::deserialize(deserializer)? {
            Some(seconds) => from_epoch(seconds)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("timestamp out of range: {seconds}"))),
            None => Ok(None),
        }
    }
}

/// Naive `YYYY-MM-DDTHH:MM:SS.ffffff` timestamp
pub mod naive_time {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(NAIVE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_naive(&raw).map_err(D::Error::custom)
    }

    /// Optional variant; missing and `null` decode to `None`
    pub mod option {
        use super::super::{parse_naive, NAIVE_FORMAT};
        use chrono::NaiveDateTime;
        use serde::de::Error as _;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<NaiveDateTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(time) => serializer.serialize_str(&time.format(NAIVE_FORMAT).to_string()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDateTime>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| parse_naive(&raw).map_err(D::Error::custom))
                .transpose()
        }
    }
}

fn parse_naive(raw: &str) -> chrono::ParseResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
}

/// Non-negative floating-point seconds
pub mod seconds {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(raw).map_err(D::Error::custom)
    }
}

#[cfg(test)]
#[path = "time_tests.rs"]
mod tests;
