// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Tom F. (https://github.com/tomtom215/duckdb-behavioral)

//! Timestamped chain elements collected by the `pattern_count` aggregate.
//!
//! `DuckDB` delivers rows to an aggregate in no particular order, and may
//! split a group across threads. Each row is kept as a [`ValueEvent`] and the
//! chain is rebuilt in timestamp order during `finalize`.
//!
//! Values are `Option<Arc<str>>`: `NULL` values are kept as elements that
//! never match, and `Arc<str>` makes cloning during `combine` an O(1)
//! reference count bump instead of a string copy.

use std::sync::Arc;

/// A single chain element with its timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueEvent {
    /// Timestamp in microseconds since Unix epoch.
    pub timestamp_us: i64,
    /// Element value. `None` represents SQL `NULL`.
    pub value: Option<Arc<str>>,
}

impl ValueEvent {
    /// Creates a new event.
    #[must_use]
    pub const fn new(timestamp_us: i64, value: Option<Arc<str>>) -> Self {
        Self {
            timestamp_us,
            value,
        }
    }

    /// Convenience constructor for a non-NULL value.
    #[must_use]
    pub fn with_value(timestamp_us: i64, value: &str) -> Self {
        Self::new(timestamp_us, Some(Arc::from(value)))
    }
}

/// SQL-style equality for nullable values: `NULL` never equals anything,
/// including another `NULL`.
#[must_use]
#[inline]
pub fn sql_eq(expected: Option<&str>, actual: Option<&str>) -> bool {
    matches!((expected, actual), (Some(a), Some(b)) if a == b)
}

/// Sorts events by timestamp (ascending).
///
/// Performs an O(n) presorted check first and skips the sort when events
/// already arrive in order, the common case for `ORDER BY` inputs and
/// naturally ordered tables.
///
/// The sort is stable: events sharing a timestamp keep their arrival order.
/// Unlike condition-only events, chain values at the same instant are not
/// interchangeable, and an unstable sort would make the count depend on
/// pdqsort's partitioning.
pub fn sort_events(events: &mut [ValueEvent]) {
    if events
        .windows(2)
        .all(|w| w[0].timestamp_us <= w[1].timestamp_us)
    {
        return;
    }
    events.sort_by_key(|e| e.timestamp_us);
}
