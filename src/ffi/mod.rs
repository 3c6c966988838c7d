// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Tom F. (https://github.com/tomtom215/duckdb-behavioral)

//! FFI bindings for registering the pattern counting functions with `DuckDB`.
//!
//! This module bridges the pure Rust implementations with `DuckDB`'s C Extension API.
//!
//! # Architecture
//!
//! `count_pattern` is a scalar function over two `VARCHAR[]` lists and is
//! registered with a single vectorized callback. `pattern_count` is an
//! aggregate registered with the five required callbacks: `state_size`,
//! `init`, `update`, `combine`, and `finalize`, plus a destructor.
//!
//! Both delegate to the pure Rust implementations in [`crate::counter`] and
//! [`crate::pattern_count`].

pub mod count_pattern;
pub mod pattern_count;

use libduckdb_sys::*;
use std::sync::Arc;

/// Registers all pattern counting functions using a raw `duckdb_connection` handle.
///
/// This function is called from the custom C entry point in `lib.rs`, which obtains
/// the connection directly via `duckdb_connect`.
///
/// # Safety
///
/// The caller must ensure `raw_con` is a valid `duckdb_connection` handle.
pub fn register_all_raw(raw_con: duckdb_connection) {
    // Safety: The raw connection handle is valid, obtained via duckdb_connect
    // in pattern_count_init_internal and will be disconnected after registration.
    unsafe {
        count_pattern::register_count_pattern(raw_con);
        pattern_count::register_pattern_count(raw_con);
    }
}

/// Creates a `VARCHAR[]` logical type. The caller owns the returned handle.
///
/// # Safety
///
/// Must be called after the extension API has been initialized.
unsafe fn create_varchar_list_type() -> duckdb_logical_type {
    unsafe {
        let varchar_type = duckdb_create_logical_type(DUCKDB_TYPE_DUCKDB_TYPE_VARCHAR);
        let list_type = duckdb_create_list_type(varchar_type);
        duckdb_destroy_logical_type(&mut { varchar_type });
        list_type
    }
}

/// Reads a VARCHAR value from a `DuckDB` vector at the given row index.
///
/// Returns `None` for NULL rows and for values that are not valid UTF-8.
///
/// # Safety
///
/// Requires a valid flat `DuckDB` vector with VARCHAR data and `row` within
/// its current size.
unsafe fn read_varchar(vec: duckdb_vector, row: usize) -> Option<Arc<str>> {
    unsafe {
        let data = duckdb_vector_get_data(vec);
        let validity = duckdb_vector_get_validity(vec);

        if !validity.is_null() && !duckdb_validity_row_is_valid(validity, row as idx_t) {
            return None;
        }

        if data.is_null() {
            return None;
        }

        let str_struct =
            data.add(row * std::mem::size_of::<duckdb_string_t>()) as *const duckdb_string_t;
        let str_ptr = duckdb_string_t_data(str_struct.cast_mut());
        if str_ptr.is_null() {
            return None;
        }

        let len = duckdb_string_t_length(*str_struct);
        let bytes = std::slice::from_raw_parts(str_ptr as *const u8, len as usize);
        std::str::from_utf8(bytes).ok().map(Arc::from)
    }
}

/// Reads a `VARCHAR[]` value from a `DuckDB` list vector at the given row index.
///
/// Returns `None` if the list itself is NULL. NULL elements inside the list
/// are kept as `None` entries.
///
/// # Safety
///
/// Requires a valid flat `DuckDB` list vector whose child vector holds
/// VARCHAR data, and `row` within its current size.
unsafe fn read_varchar_list(vec: duckdb_vector, row: usize) -> Option<Vec<Option<Arc<str>>>> {
    unsafe {
        let validity = duckdb_vector_get_validity(vec);
        if !validity.is_null() && !duckdb_validity_row_is_valid(validity, row as idx_t) {
            return None;
        }

        let entries = duckdb_vector_get_data(vec) as *const duckdb_list_entry;
        if entries.is_null() {
            return None;
        }

        let entry = *entries.add(row);
        let child = duckdb_list_vector_get_child(vec);
        let start = entry.offset as usize;
        let end = start + entry.length as usize;

        Some((start..end).map(|j| read_varchar(child, j)).collect())
    }
}
