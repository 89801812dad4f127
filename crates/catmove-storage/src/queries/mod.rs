// SPDX-FileCopyrightText: 2026 Catmove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules for the ticket store tables.

pub mod panels;
pub mod queue;

use chrono::{DateTime, Utc};

/// Timestamp layout shared with `strftime('%Y-%m-%dT%H:%M:%fZ', 'now')`,
/// so stored values compare correctly as text.
pub(crate) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Snowflakes are stored as the two's-complement `i64` of the `u64` value,
/// which round-trips every id exactly.
pub(crate) fn snowflake_to_sql(id: u64) -> i64 {
    id as i64
}

pub(crate) fn snowflake_from_sql(raw: i64) -> u64 {
    raw as u64
}
