// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Tom F. (https://github.com/tomtom215/duckdb-behavioral)

//! `pattern_count` — Aggregate function counting pattern occurrences in a
//! time-ordered stream of values.
//!
//! The chain of a group is its `value` column ordered by `ts`. The count
//! follows the same single-pass rule as the `count_pattern` scalar (see
//! [`crate::counter`]).
//!
//! # SQL Usage
//!
//! ```sql
//! -- How often did each user go page 'a' -> page 'b' -> page 'a'?
//! SELECT user_id,
//!   pattern_count(['a', 'b', 'a'], event_time, page) AS loops
//! FROM page_views
//! GROUP BY user_id
//! ```

use crate::common::event::{sort_events, sql_eq, ValueEvent};
use crate::counter::{PatternCountError, PatternCounter};
use std::sync::Arc;

/// State for the `pattern_count` aggregate function.
///
/// Collects timestamped values during `update`, then orders them and runs
/// the pattern counter during `finalize`.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct PatternCountState {
    /// Collected events. Sorted in finalize.
    pub events: Vec<ValueEvent>,
    /// Pattern elements (set from the first non-NULL pattern seen).
    /// `None` elements are SQL `NULL` and never match.
    pub pattern: Option<Vec<Option<Arc<str>>>>,
}

impl PatternCountState {
    /// Creates a new empty state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            events: Vec::new(),
            pattern: None,
        }
    }

    /// Sets the pattern (called during the first update; later calls are ignored).
    pub fn set_pattern(&mut self, pattern: Vec<Option<Arc<str>>>) {
        if self.pattern.is_none() {
            self.pattern = Some(pattern);
        }
    }

    /// Adds an event to the state.
    ///
    /// Every event is stored, including those whose value matches no pattern
    /// element: a non-matching element is still part of the chain.
    pub fn update(&mut self, event: ValueEvent) {
        self.events.push(event);
    }

    /// Combines two states by concatenating their event lists, returning a new state.
    ///
    /// Events do not need to be in order here because `finalize` sorts them.
    #[must_use]
    pub fn combine(&self, other: &Self) -> Self {
        let mut events = Vec::with_capacity(self.events.len() + other.events.len());
        events.extend(self.events.iter().cloned());
        events.extend(other.events.iter().cloned());
        Self {
            events,
            pattern: self.pattern.clone().or_else(|| other.pattern.clone()),
        }
    }

    /// Combines another state into `self` in-place by appending its events.
    ///
    /// Preferred for sequential (left-fold) chains: extending in place gives
    /// O(N) amortized copies over N combines instead of O(N²).
    pub fn combine_in_place(&mut self, other: &Self) {
        self.events.extend(other.events.iter().cloned());
        if self.pattern.is_none() {
            self.pattern.clone_from(&other.pattern);
        }
    }

    /// Orders the collected events by timestamp and counts pattern occurrences.
    ///
    /// # Errors
    ///
    /// Returns [`PatternCountError::EmptyPattern`] if no pattern was set or
    /// the pattern has no elements.
    pub fn finalize(&mut self) -> Result<i64, PatternCountError> {
        let pattern = self.pattern.as_deref().unwrap_or_default();
        let mut counter = PatternCounter::new(pattern)?;

        sort_events(&mut self.events);

        for event in &self.events {
            counter.feed_matching(|expected| sql_eq(expected.as_deref(), event.value.as_deref()));
        }
        Ok(counter.count() as i64)
    }
}

impl Default for PatternCountState {
    fn default() -> Self {
        Self::new()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::counter::count_pattern;
    use proptest::prelude::*;

    const ALPHABET: [&str; 4] = ["a", "b", "c", "d"];

    fn build_state(pattern: &[usize], chain: &[(i64, usize)]) -> PatternCountState {
        let mut state = PatternCountState::new();
        state.set_pattern(pattern.iter().map(|&i| Some(Arc::from(ALPHABET[i]))).collect());
        for &(ts, v) in chain {
            state.update(ValueEvent::with_value(ts, ALPHABET[v]));
        }
        state
    }

    proptest! {
        #[test]
        fn agrees_with_scalar_on_sorted_values(
            pattern in prop::collection::vec(0usize..4, 1..5),
            chain in prop::collection::vec((0i64..1_000, 0usize..4), 0..50),
        ) {
            let mut state = build_state(&pattern, &chain);
            let result = state.finalize().unwrap();

            let mut ordered = chain.clone();
            ordered.sort_by_key(|&(ts, _)| ts);
            let values: Vec<&str> = ordered.iter().map(|&(_, v)| ALPHABET[v]).collect();
            let pat: Vec<&str> = pattern.iter().map(|&i| ALPHABET[i]).collect();
            let scalar = count_pattern(&pat, &values).unwrap();

            prop_assert_eq!(result, scalar as i64);
        }

        #[test]
        fn combine_is_commutative_for_distinct_timestamps(
            pattern in prop::collection::vec(0usize..4, 1..5),
            a in prop::collection::vec(0usize..4, 0..20),
            b in prop::collection::vec(0usize..4, 0..20),
        ) {
            // Even timestamps for `a`, odd for `b`: no ties across states.
            let chain_a: Vec<(i64, usize)> =
                a.iter().enumerate().map(|(i, &v)| (2 * i as i64, v)).collect();
            let chain_b: Vec<(i64, usize)> =
                b.iter().enumerate().map(|(i, &v)| (2 * i as i64 + 1, v)).collect();
            let sa = build_state(&pattern, &chain_a);
            let sb = build_state(&pattern, &chain_b);

            let ab = sa.combine(&sb).finalize().unwrap();
            let ba = sb.combine(&sa).finalize().unwrap();
            prop_assert_eq!(ab, ba);
        }

        #[test]
        fn combine_is_associative(
            pattern in prop::collection::vec(0usize..4, 1..5),
            a in prop::collection::vec((0i64..1_000, 0usize..4), 0..15),
            b in prop::collection::vec((1_000i64..2_000, 0usize..4), 0..15),
            c in prop::collection::vec((2_000i64..3_000, 0usize..4), 0..15),
        ) {
            let sa = build_state(&pattern, &a);
            let sb = build_state(&pattern, &b);
            let sc = build_state(&pattern, &c);

            let ab_c = sa.combine(&sb).combine(&sc).finalize().unwrap();
            let a_bc = sa.combine(&sb.combine(&sc)).finalize().unwrap();
            prop_assert_eq!(ab_c, a_bc);
        }

        #[test]
        fn count_never_exceeds_event_count(
            pattern in prop::collection::vec(0usize..4, 1..5),
            chain in prop::collection::vec((0i64..1_000, 0usize..4), 0..50),
        ) {
            let mut state = build_state(&pattern, &chain);
            let count = state.finalize().unwrap();
            prop_assert!(count >= 0);
            prop_assert!(count as usize <= chain.len());
        }
    }
}
