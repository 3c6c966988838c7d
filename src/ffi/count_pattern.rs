// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Tom F. (https://github.com/tomtom215/duckdb-behavioral)

//! FFI registration for the `count_pattern` scalar function.

use super::{create_varchar_list_type, read_varchar_list};
use crate::common::event::sql_eq;
use crate::counter::{PatternCountError, PatternCounter};
use libduckdb_sys::*;
use std::ffi::CString;
use std::sync::Arc;

/// Registers the `count_pattern` function with `DuckDB`.
///
/// Signature: `count_pattern(VARCHAR[], VARCHAR[]) -> BIGINT`
///
/// Parameters:
/// - `pattern`: the sequence to search for (must not be empty)
/// - `chain`: the sequence to scan
///
/// # Safety
///
/// Requires a valid `duckdb_connection` handle.
pub unsafe fn register_count_pattern(con: duckdb_connection) {
    unsafe {
        let name = c"count_pattern";
        let func = duckdb_create_scalar_function();
        duckdb_scalar_function_set_name(func, name.as_ptr());

        // Parameter 0: VARCHAR[] (pattern)
        let pattern_type = create_varchar_list_type();
        duckdb_scalar_function_add_parameter(func, pattern_type);
        duckdb_destroy_logical_type(&mut { pattern_type });

        // Parameter 1: VARCHAR[] (chain)
        let chain_type = create_varchar_list_type();
        duckdb_scalar_function_add_parameter(func, chain_type);
        duckdb_destroy_logical_type(&mut { chain_type });

        // Return type: BIGINT (NULL when either list is NULL)
        let ret_type = duckdb_create_logical_type(DUCKDB_TYPE_DUCKDB_TYPE_BIGINT);
        duckdb_scalar_function_set_return_type(func, ret_type);
        duckdb_destroy_logical_type(&mut { ret_type });

        duckdb_scalar_function_set_function(func, Some(count_pattern_execute));

        let result = duckdb_register_scalar_function(con, func);
        if result != DuckDBSuccess {
            eprintln!("pattern_count: failed to register count_pattern function");
        }

        duckdb_destroy_scalar_function(&mut { func });
    }
}

/// Computes one output row of `count_pattern`.
///
/// Returns `Ok(None)` (SQL `NULL`) when either list is `NULL`. `NULL`
/// elements inside the lists never match.
fn count_row(
    pattern: Option<&[Option<Arc<str>>]>,
    chain: Option<&[Option<Arc<str>>]>,
) -> Result<Option<i64>, PatternCountError> {
    let (Some(pattern), Some(chain)) = (pattern, chain) else {
        return Ok(None);
    };

    let mut counter = PatternCounter::new(pattern)?;
    for element in chain {
        counter.feed_matching(|expected| sql_eq(expected.as_deref(), element.as_deref()));
    }
    Ok(Some(counter.count() as i64))
}

/// Query error text reported to `DuckDB` for a failed row.
fn error_message(err: PatternCountError) -> CString {
    CString::new(format!("count_pattern: {err}"))
        .unwrap_or_else(|_| c"count_pattern: invalid argument".to_owned())
}

// SAFETY: `input` is a valid DuckDB data chunk with columns (VARCHAR[], VARCHAR[])
// as registered. `output` is a BIGINT vector with room for the chunk's rows.
// An empty pattern aborts the query via duckdb_scalar_function_set_error.
unsafe extern "C" fn count_pattern_execute(
    info: duckdb_function_info,
    input: duckdb_data_chunk,
    output: duckdb_vector,
) {
    unsafe {
        let row_count = duckdb_data_chunk_get_size(input) as usize;

        let pattern_vec = duckdb_data_chunk_get_vector(input, 0);
        let chain_vec = duckdb_data_chunk_get_vector(input, 1);

        let data = duckdb_vector_get_data(output) as *mut i64;
        duckdb_vector_ensure_validity_writable(output);
        let validity = duckdb_vector_get_validity(output);

        for i in 0..row_count {
            let pattern = read_varchar_list(pattern_vec, i);
            let chain = read_varchar_list(chain_vec, i);

            match count_row(pattern.as_deref(), chain.as_deref()) {
                Ok(Some(n)) => *data.add(i) = n,
                Ok(None) => duckdb_validity_set_row_invalid(validity, i as idx_t),
                Err(e) => {
                    let message = error_message(e);
                    duckdb_scalar_function_set_error(info, message.as_ptr());
                    return;
                }
            }
        }
    }
}
