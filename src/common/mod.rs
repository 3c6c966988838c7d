// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Tom F. (https://github.com/tomtom215/duckdb-behavioral)

//! Types shared between the scalar and aggregate forms of pattern counting.

pub mod event;
