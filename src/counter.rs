// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Tom F. (https://github.com/tomtom215/duckdb-behavioral)

//! Single-pass pattern occurrence counting.
//!
//! Scans a chain of elements once, advancing a cursor through the pattern
//! whenever the current element equals the pattern element under the cursor.
//! A match is registered when the cursor reaches the *completion threshold*,
//! after which the cursor resets to the start of the pattern.
//!
//! # Completion Threshold
//!
//! The threshold is `pattern.len() - 1`, not `pattern.len()`: the final
//! pattern element is never compared. For single-element patterns the
//! threshold is raised to 1 so that every occurrence of the element counts
//! (a threshold of 0 would be met before any comparison takes place).
//!
//! ```text
//! pattern = [a, b, a]           threshold = 2
//! chain   = g a b a b a b a
//! cursor    0 1 0 1 0 1 0 1     (after each element, 0 = just completed)
//! count     0 0 1 1 2 2 3 3
//! ```
//!
//! Non-matching elements leave the cursor where it is. There is no
//! backtracking and no restart from the current element.

use std::fmt;

/// Error returned when a pattern cannot be counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum PatternCountError {
    /// The pattern has no elements, so no completion threshold exists.
    EmptyPattern,
}

impl fmt::Display for PatternCountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPattern => f.write_str("invalid argument: pattern must not be empty"),
        }
    }
}

impl std::error::Error for PatternCountError {}

/// Returns the cursor value at which a match is registered for a pattern
/// of `pattern_len` elements.
///
/// `pattern_len` must be at least 1; an empty pattern has no threshold and
/// is rejected by [`PatternCounter::new`] before this is consulted.
#[must_use]
#[inline]
pub const fn completion_threshold(pattern_len: usize) -> usize {
    debug_assert!(pattern_len >= 1, "completion threshold of an empty pattern");
    if pattern_len > 1 {
        pattern_len - 1
    } else {
        1
    }
}

/// Incremental pattern counter.
///
/// Holds the match cursor and the running count, so a chain can be fed in
/// pieces (for example from an aggregate that receives rows in batches) and
/// still produce the same count as a single [`count_pattern`] call over the
/// concatenated chain.
#[derive(Debug, Clone)]
pub struct PatternCounter<'p, T> {
    pattern: &'p [T],
    threshold: usize,
    cursor: usize,
    count: u64,
}

impl<'p, T> PatternCounter<'p, T> {
    /// Creates a counter for `pattern` with cursor and count at zero.
    ///
    /// # Errors
    ///
    /// Returns [`PatternCountError::EmptyPattern`] if `pattern` is empty.
    pub fn new(pattern: &'p [T]) -> Result<Self, PatternCountError> {
        if pattern.is_empty() {
            return Err(PatternCountError::EmptyPattern);
        }
        Ok(Self {
            pattern,
            threshold: completion_threshold(pattern.len()),
            cursor: 0,
            count: 0,
        })
    }

    /// Advances the scan by one element, using `matches` to compare the
    /// pattern element under the cursor against that chain element.
    ///
    /// Returns `true` if this element completed a match.
    #[inline]
    pub fn feed_matching<F>(&mut self, matches: F) -> bool
    where
        F: FnOnce(&T) -> bool,
    {
        // cursor < threshold <= pattern.len() - 1 for len >= 2, and
        // cursor == 0 for len == 1, so the index is always in bounds.
        if matches(&self.pattern[self.cursor]) {
            self.cursor += 1;
        }

        if self.cursor == self.threshold {
            self.count += 1;
            self.cursor = 0;
            true
        } else {
            false
        }
    }

    /// Number of matches registered so far.
    #[must_use]
    #[inline]
    pub const fn count(&self) -> u64 {
        self.count
    }

    /// Number of consecutive pattern elements matched in the current attempt.
    #[must_use]
    #[inline]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }
}

impl<T: PartialEq> PatternCounter<'_, T> {
    /// Advances the scan by one element compared by equality.
    ///
    /// Returns `true` if this element completed a match.
    #[inline]
    pub fn feed(&mut self, element: &T) -> bool {
        self.feed_matching(|expected| expected == element)
    }

    /// Feeds every element of `chain` in order and returns the running count.
    pub fn feed_all<'c, I>(&mut self, chain: I) -> u64
    where
        I: IntoIterator<Item = &'c T>,
        T: 'c,
    {
        for element in chain {
            self.feed(element);
        }
        self.count
    }
}

/// Counts how many times `pattern` occurs in `chain`.
///
/// # Errors
///
/// Returns [`PatternCountError::EmptyPattern`] if `pattern` is empty. An
/// empty `chain` is valid and yields 0.
///
/// # Examples
///
/// ```
/// use pattern_count::counter::count_pattern;
///
/// let pattern = ["a", "b", "a"];
/// let chain = ["g", "a", "b", "a", "b", "a", "b", "a"];
/// assert_eq!(count_pattern(&pattern, &chain).unwrap(), 3);
/// ```
pub fn count_pattern<T: PartialEq>(pattern: &[T], chain: &[T]) -> Result<u64, PatternCountError> {
    let mut counter = PatternCounter::new(pattern)?;
    Ok(counter.feed_all(chain))
}
