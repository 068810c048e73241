// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Separating JSON payloads from the engine's human-readable banners

/// Output split into leading banner text and the JSON document after it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sanitized<'a> {
    pub banner: &'a str,
    pub json: &'a str,
}

/// Strip everything before the first line that opens a JSON object.
///
/// When no such line exists the whole trimmed output is returned as `json`
/// so the caller's decoder reports the failure.
pub fn sanitize_output(raw: &str) -> Sanitized<'_> {
    let trimmed = raw.trim();
    let mut offset = 0;
    for line in trimmed.split_inclusive('\n') {
        if line.trim_start().starts_with('{') {
            let (banner, json) = trimmed.split_at(offset);
            return Sanitized {
                banner: banner.trim_end(),
                json: json.trim_start(),
            };
        }
        offset += line.len();
    }
    Sanitized {
        banner: "",
        json: trimmed,
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
