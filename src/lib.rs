// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Tom F. (https://github.com/tomtom215/duckdb-behavioral)

//! # `pattern_count` — Pattern Occurrence Counting for `DuckDB`
//!
//! Counts how many times a pattern occurs in a chain of elements with a
//! single forward scan. The core is a pure Rust library usable on any
//! `PartialEq` element type; the crate also builds as a `DuckDB` loadable
//! extension exposing the same rule to SQL.
//!
//! ## Functions
//!
//! | Function | Type | Description |
//! |----------|------|-------------|
//! | `count_pattern(pattern, chain)` | Scalar | Counts pattern occurrences in a `VARCHAR[]` |
//! | `pattern_count(pattern, ts, value)` | Aggregate | Counts pattern occurrences in a group's values ordered by `ts` |
//!
//! ## Library Usage
//!
//! ```
//! use pattern_count::counter::count_pattern;
//!
//! let count = count_pattern(&['a', 'b', 'a'], &['g', 'a', 'b', 'a', 'b', 'a', 'b', 'a']);
//! assert_eq!(count, Ok(3));
//! ```
//!
//! ## Installation
//!
//! ```sql
//! LOAD 'pattern_count.duckdb_extension';
//! SELECT count_pattern(['a', 'b', 'a'], ['g', 'a', 'b', 'a', 'b', 'a', 'b', 'a']);
//! ```

pub mod common;
pub mod counter;
pub mod pattern_count;

mod ffi;

/// Minimum `DuckDB` C API version required by the extension.
const MIN_DUCKDB_API_VERSION: &str = "v1.2.0";

/// Extension entry point called by `DuckDB` when the extension is loaded.
///
/// Obtains the raw `duckdb_connection` directly via the C API
/// (`duckdb_connect`), registers all functions, and disconnects.
///
/// # Safety
///
/// Called by `DuckDB`'s extension loading mechanism via FFI.
/// `info` and `access` must be valid pointers provided by `DuckDB`.
#[no_mangle]
pub unsafe extern "C" fn pattern_count_init_c_api(
    info: libduckdb_sys::duckdb_extension_info,
    access: *const libduckdb_sys::duckdb_extension_access,
) -> bool {
    match pattern_count_init_internal(info, access) {
        Ok(result) => result,
        Err(e) => {
            let Some(set_error) = (*access).set_error else {
                return false;
            };
            let error_c_string = std::ffi::CString::new(e.to_string());
            if let Ok(err) = error_c_string {
                set_error(info, err.as_ptr());
            } else {
                let fallback = c"Extension init failed and could not allocate error string";
                set_error(info, fallback.as_ptr());
            }
            false
        }
    }
}

unsafe fn pattern_count_init_internal(
    info: libduckdb_sys::duckdb_extension_info,
    access: *const libduckdb_sys::duckdb_extension_access,
) -> Result<bool, Box<dyn std::error::Error>> {
    // Populate the extension API function pointers.
    let have_api =
        libduckdb_sys::duckdb_rs_extension_api_init(info, access, MIN_DUCKDB_API_VERSION)
            .map_err(|e| -> Box<dyn std::error::Error> { e.into() })?;

    if !have_api {
        // API version mismatch: DuckDB is too old for this extension.
        return Ok(false);
    }

    let get_database = (*access)
        .get_database
        .ok_or("DuckDB extension access does not provide get_database")?;
    let db_ptr = get_database(info);
    if db_ptr.is_null() {
        return Err("DuckDB returned a null database handle".into());
    }
    let db: libduckdb_sys::duckdb_database = *db_ptr;

    // Open a raw connection for function registration.
    let mut raw_con: libduckdb_sys::duckdb_connection = std::ptr::null_mut();
    let rc = libduckdb_sys::duckdb_connect(db, &mut raw_con);
    if rc != libduckdb_sys::DuckDBSuccess {
        return Err("Failed to open DuckDB connection for extension registration".into());
    }

    ffi::register_all_raw(raw_con);

    libduckdb_sys::duckdb_disconnect(&mut raw_con);

    Ok(true)
}
