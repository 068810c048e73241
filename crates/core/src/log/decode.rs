// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Two-step decoding: read the `type` discriminator, then the full record

use super::record::{LogRecord, RecordKind};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::mpsc;

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: RecordKind,
}

/// Decode one output line.
///
/// Banner text, malformed JSON, unknown record types and records missing
/// required fields all yield `None`.
pub fn decode_line(line: &str) -> Option<LogRecord> {
    let line = line.trim();
    if !line.starts_with('{') {
        return None;
    }
    let envelope: Envelope = serde_json::from_str(line).ok()?;
    let record = match envelope.kind {
        RecordKind::ArchiveProgress => LogRecord::ArchiveProgress(body(line)?),
        RecordKind::ProgressMessage => LogRecord::ProgressMessage(body(line)?),
        RecordKind::ProgressPercent => LogRecord::ProgressPercent(body(line)?),
        RecordKind::FileStatus => LogRecord::FileStatus(body(line)?),
        RecordKind::LogMessage => LogRecord::LogMessage(body(line)?),
        RecordKind::Unknown => {
            tracing::trace!(line, "skipping unknown record type");
            return None;
        }
    };
    Some(record)
}

fn body<T: DeserializeOwned>(line: &str) -> Option<T> {
    match serde_json::from_str(line) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(error = %e, "dropping malformed record");
            None
        }
    }
}

/// Decode every line until the producer closes its sender.
///
/// Records are forwarded in arrival order. If the consumer goes away the
/// remaining lines are still drained so the producer never blocks on a full
/// channel. Returns the number of records decoded.
pub async fn decode_stream(
    mut lines: mpsc::Receiver<String>,
    records: mpsc::Sender<LogRecord>,
) -> usize {
    let mut decoded = 0;
    let mut consumer_alive = true;
    while let Some(line) = lines.recv().await {
        let Some(record) = decode_line(&line) else {
            continue;
        };
        decoded += 1;
        if consumer_alive && records.send(record).await.is_err() {
            tracing::debug!("record consumer dropped, draining remaining output");
            consumer_alive = false;
        }
    }
    decoded
}

#[cfg(test)]
#[path = "decode_tests.rs"]
mod tests;
