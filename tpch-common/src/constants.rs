// Copyright 2025 Apache Doris Community
// Licensed under the Apache License, Version 2.0

//! Constants used throughout the benchmark runner

/// Header row of the timing log
pub const TIMINGS_HEADER: &str = "solution,version,query_number,duration[s],io_type,scale_factor";

/// Environment variable carrying the current suite pass into a query subprocess
pub const SUITE_ITERATION_ENV: &str = "RUN_SUITE_ITERATION";

/// Default settings file, looked up in the working directory
pub const DEFAULT_SETTINGS_FILE: &str = "tpch.toml";

/// Answers are only computed at this scale factor
pub const ANSWERS_SCALE_FACTOR: f64 = 1.0;

/// File extension of stored answers
pub const ANSWER_EXTENSION: &str = "parquet";

/// Default Exasol port
pub const DEFAULT_EXASOL_PORT: u16 = 8563;

/// Default Exasol schema holding the TPC-H tables
pub const DEFAULT_EXASOL_SCHEMA: &str = "tpc";

/// Default number of bytes requested per result set fetch (5 MiB)
pub const DEFAULT_FETCH_SIZE: u64 = 5 * 1024 * 1024;

/// Number of TPC-H queries
pub const TPCH_QUERY_COUNT: u32 = 22;
