// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Tom F. (https://github.com/tomtom215/duckdb-behavioral)

//! FFI registration for the `pattern_count` aggregate function.

use super::{create_varchar_list_type, read_varchar, read_varchar_list};
use crate::common::event::ValueEvent;
use crate::pattern_count::PatternCountState;
use libduckdb_sys::*;
use std::sync::Arc;

/// Registers the `pattern_count` function with `DuckDB`.
///
/// Signature: `pattern_count(VARCHAR[], TIMESTAMP, VARCHAR) -> BIGINT`
///
/// Parameters:
/// - `pattern`: the sequence to search for (first non-NULL value per group is used)
/// - `timestamp`: event timestamp column, defines chain order
/// - `value`: chain element column
///
/// # Safety
///
/// Requires a valid `duckdb_connection` handle.
pub unsafe fn register_pattern_count(con: duckdb_connection) {
    unsafe {
        let name = c"pattern_count";
        let func = duckdb_create_aggregate_function();
        duckdb_aggregate_function_set_name(func, name.as_ptr());

        // Parameter 0: VARCHAR[] (pattern)
        let pattern_type = create_varchar_list_type();
        duckdb_aggregate_function_add_parameter(func, pattern_type);
        duckdb_destroy_logical_type(&mut { pattern_type });

        // Parameter 1: TIMESTAMP
        let ts_type = duckdb_create_logical_type(DUCKDB_TYPE_DUCKDB_TYPE_TIMESTAMP);
        duckdb_aggregate_function_add_parameter(func, ts_type);
        duckdb_destroy_logical_type(&mut { ts_type });

        // Parameter 2: VARCHAR (value)
        let varchar_type = duckdb_create_logical_type(DUCKDB_TYPE_DUCKDB_TYPE_VARCHAR);
        duckdb_aggregate_function_add_parameter(func, varchar_type);
        duckdb_destroy_logical_type(&mut { varchar_type });

        // Return type: BIGINT
        let ret_type = duckdb_create_logical_type(DUCKDB_TYPE_DUCKDB_TYPE_BIGINT);
        duckdb_aggregate_function_set_return_type(func, ret_type);
        duckdb_destroy_logical_type(&mut { ret_type });

        duckdb_aggregate_function_set_functions(
            func,
            Some(state_size),
            Some(state_init),
            Some(state_update),
            Some(state_combine),
            Some(state_finalize),
        );

        duckdb_aggregate_function_set_destructor(func, Some(state_destroy));

        let result = duckdb_register_aggregate_function(con, func);
        if result != DuckDBSuccess {
            eprintln!("pattern_count: failed to register pattern_count function");
        }

        duckdb_destroy_aggregate_function(&mut { func });
    }
}

#[repr(C)]
struct FfiState {
    inner: *mut PatternCountState,
}

// SAFETY: Pure computation returning byte size of FfiState.
unsafe extern "C" fn state_size(_info: duckdb_function_info) -> idx_t {
    std::mem::size_of::<FfiState>() as idx_t
}

// SAFETY: `state` is a DuckDB-allocated buffer of at least `state_size()` bytes.
unsafe extern "C" fn state_init(_info: duckdb_function_info, state: duckdb_aggregate_state) {
    unsafe {
        let ffi_state = &mut *(state as *mut FfiState);
        ffi_state.inner = Box::into_raw(Box::new(PatternCountState::new()));
    }
}

/// Applies one input row to an aggregate state.
///
/// The pattern is read only while the state has none, so an early row with
/// a `NULL` pattern is superseded by the first later non-`NULL` one. Rows
/// with a `NULL` timestamp are skipped; `NULL` values stay in the chain as
/// non-matching elements.
fn apply_row<F>(
    state: &mut PatternCountState,
    read_pattern: F,
    timestamp: Option<i64>,
    value: Option<Arc<str>>,
) where
    F: FnOnce() -> Option<Vec<Option<Arc<str>>>>,
{
    if state.pattern.is_none() {
        if let Some(pattern) = read_pattern() {
            state.set_pattern(pattern);
        }
    }

    let Some(timestamp) = timestamp else {
        return;
    };
    state.update(ValueEvent::new(timestamp, value));
}

// SAFETY: `input` is a valid DuckDB data chunk with columns
// (VARCHAR[], TIMESTAMP, VARCHAR) as registered. `states` points to
// `row_count` aggregate state pointers.
unsafe extern "C" fn state_update(
    _info: duckdb_function_info,
    input: duckdb_data_chunk,
    states: *mut duckdb_aggregate_state,
) {
    unsafe {
        let row_count = duckdb_data_chunk_get_size(input) as usize;

        // Column 0: VARCHAR[] (pattern)
        let pattern_vec = duckdb_data_chunk_get_vector(input, 0);
        // Column 1: TIMESTAMP
        let ts_vec = duckdb_data_chunk_get_vector(input, 1);
        let ts_data = duckdb_vector_get_data(ts_vec) as *const i64;
        let ts_validity = duckdb_vector_get_validity(ts_vec);
        // Column 2: VARCHAR (value)
        let value_vec = duckdb_data_chunk_get_vector(input, 2);

        for i in 0..row_count {
            let state_ptr = *states.add(i);
            let ffi_state = &mut *(state_ptr as *mut FfiState);
            if ffi_state.inner.is_null() {
                continue;
            }
            let state = &mut *ffi_state.inner;

            let timestamp = if ts_validity.is_null()
                || duckdb_validity_row_is_valid(ts_validity, i as idx_t)
            {
                Some(*ts_data.add(i))
            } else {
                None
            };

            apply_row(
                state,
                || read_varchar_list(pattern_vec, i),
                timestamp,
                read_varchar(value_vec, i),
            );
        }
    }
}

// SAFETY: `source` and `target` point to `count` aggregate state pointers.
// Null checks guard against uninitialized states.
unsafe extern "C" fn state_combine(
    _info: duckdb_function_info,
    source: *mut duckdb_aggregate_state,
    target: *mut duckdb_aggregate_state,
    count: idx_t,
) {
    unsafe {
        for i in 0..count as usize {
            let src_ptr = *source.add(i);
            let tgt_ptr = *target.add(i);
            let src_ffi = &*(src_ptr as *const FfiState);
            let tgt_ffi = &mut *(tgt_ptr as *mut FfiState);

            if src_ffi.inner.is_null() || tgt_ffi.inner.is_null() {
                continue;
            }

            (*tgt_ffi.inner).combine_in_place(&*src_ffi.inner);
        }
    }
}

// SAFETY: `source` points to `count` aggregate state pointers. `result` is a
// valid DuckDB BIGINT vector. A missing or empty pattern produces NULL output
// via the validity bitmap.
unsafe extern "C" fn state_finalize(
    _info: duckdb_function_info,
    source: *mut duckdb_aggregate_state,
    result: duckdb_vector,
    count: idx_t,
    offset: idx_t,
) {
    unsafe {
        let data = duckdb_vector_get_data(result) as *mut i64;
        duckdb_vector_ensure_validity_writable(result);
        let validity = duckdb_vector_get_validity(result);

        for i in 0..count as usize {
            let state_ptr = *source.add(i);
            let ffi_state = &mut *(state_ptr as *mut FfiState);
            let idx = offset as usize + i;

            if ffi_state.inner.is_null() {
                duckdb_validity_set_row_invalid(validity, idx as idx_t);
                continue;
            }

            match (*ffi_state.inner).finalize() {
                Ok(n) => *data.add(idx) = n,
                Err(_) => duckdb_validity_set_row_invalid(validity, idx as idx_t),
            }
        }
    }
}

// SAFETY: `state` points to `count` aggregate state pointers. Each inner pointer
// was allocated by `Box::into_raw` in `state_init`. We reclaim via `Box::from_raw`
// then null the pointer to prevent double-free.
unsafe extern "C" fn state_destroy(state: *mut duckdb_aggregate_state, count: idx_t) {
    unsafe {
        for i in 0..count as usize {
            let state_ptr = *state.add(i);
            let ffi_state = &mut *(state_ptr as *mut FfiState);
            if !ffi_state.inner.is_null() {
                drop(Box::from_raw(ffi_state.inner));
                ffi_state.inner = std::ptr::null_mut();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::PatternCountError;

    fn pattern(elements: &[&str]) -> Option<Vec<Option<Arc<str>>>> {
        Some(elements.iter().map(|&e| Some(Arc::from(e))).collect())
    }

    fn value(v: &str) -> Option<Arc<str>> {
        Some(Arc::from(v))
    }

    #[test]
    fn test_apply_row_skips_null_timestamp() {
        let mut state = PatternCountState::new();
        apply_row(&mut state, || pattern(&["a"]), Some(1), value("a"));
        apply_row(&mut state, || pattern(&["a"]), None, value("a"));
        apply_row(&mut state, || pattern(&["a"]), Some(3), value("a"));
        assert_eq!(state.events.len(), 2);
        assert_eq!(state.finalize(), Ok(2));
    }

    #[test]
    fn test_apply_row_null_timestamp_still_sets_pattern() {
        let mut state = PatternCountState::new();
        apply_row(&mut state, || pattern(&["a"]), None, value("a"));
        assert!(state.events.is_empty());
        assert!(state.pattern.is_some());
        assert_eq!(state.finalize(), Ok(0));
    }

    #[test]
    fn test_apply_row_late_pattern_replaces_null() {
        let mut state = PatternCountState::new();
        apply_row(&mut state, || None, Some(1), value("a"));
        assert!(state.pattern.is_none());
        apply_row(&mut state, || pattern(&["a"]), Some(2), value("b"));
        apply_row(&mut state, || pattern(&["b"]), Some(3), value("a"));
        // The first non-NULL pattern wins; the row before it still counts.
        assert_eq!(state.finalize(), Ok(2));
    }

    #[test]
    fn test_apply_row_reads_pattern_only_while_unset() {
        let mut state = PatternCountState::new();
        apply_row(&mut state, || pattern(&["a"]), Some(1), value("a"));
        apply_row(
            &mut state,
            || panic!("pattern must not be re-read once set"),
            Some(2),
            value("a"),
        );
        assert_eq!(state.finalize(), Ok(2));
    }

    #[test]
    fn test_apply_row_keeps_null_values() {
        let mut state = PatternCountState::new();
        apply_row(&mut state, || pattern(&["a"]), Some(1), None);
        apply_row(&mut state, || pattern(&["a"]), Some(2), value("a"));
        assert_eq!(state.events.len(), 2);
        assert_eq!(state.finalize(), Ok(1));
    }

    #[test]
    fn test_apply_row_all_null_patterns_finalize_to_error() {
        let mut state = PatternCountState::new();
        apply_row(&mut state, || None, Some(1), value("a"));
        apply_row(&mut state, || None, Some(2), value("a"));
        assert_eq!(state.finalize(), Err(PatternCountError::EmptyPattern));
    }
}
