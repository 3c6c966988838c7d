// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Tom F. (https://github.com/tomtom215/duckdb-behavioral)

//! Prints the worked pattern counting examples.

use pattern_count::counter::{count_pattern, PatternCountError};

/// Width of the `=`-padded section headers.
const HEADER_WIDTH: usize = 30;

/// Centers `title` in a line of `=` of [`HEADER_WIDTH`] characters.
fn section_header(title: &str) -> String {
    format!("{title:=^width$}", width = HEADER_WIDTH)
}

/// Counts for the two worked examples, in printing order.
fn exercise_one() -> Result<[u64; 2], PatternCountError> {
    let first = count_pattern(
        &["a", "b"],
        &["a", "b", "c", "e", "b", "a", "b", "f"],
    )?;
    let second = count_pattern(
        &["a", "b", "a"],
        &["g", "a", "b", "a", "b", "a", "b", "a"],
    )?;
    Ok([first, second])
}

fn main() -> Result<(), PatternCountError> {
    println!("{}", section_header("EXERCISE 1"));
    for count in exercise_one()? {
        println!("{count}");
    }
    println!("{}", section_header("EXERCISE 2"));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_header() {
        assert_eq!(section_header("EXERCISE 1"), "==========EXERCISE 1==========");
        assert_eq!(section_header("EXERCISE 2"), "==========EXERCISE 2==========");
        assert_eq!(section_header("EXERCISE 1").len(), HEADER_WIDTH);
    }

    #[test]
    fn test_section_header_odd_padding() {
        // Odd padding puts the extra `=` on the right.
        assert_eq!(section_header("ODD"), "=============ODD==============");
    }

    #[test]
    fn test_exercise_one_counts() {
        assert_eq!(exercise_one(), Ok([2, 3]));
    }
}
