// Copyright 2025 Apache Doris Community
// Licensed under the Apache License, Version 2.0

//! Timed execution of a single query

use std::fmt::Display;
use tracing::debug;

use tpch_common::constants::ANSWERS_SCALE_FACTOR;
use tpch_common::version::VERSION;
use tpch_common::{BenchError, Result, RunSettings, Settings};

use crate::checker::QueryChecker;
use crate::timing::{log_query_timing, CodeTimer};

/// Label of one timed run, e.g. `Run exasol query 4 [suite 1/3] [iter 2/5]`
pub fn run_label(run: &RunSettings, library_name: &str, query_number: u32, iter_idx: u32) -> String {
    let mut name = format!("Run {} query {}", library_name, query_number);
    if run.suite_iterations != 1 {
        name.push_str(&format!(" [suite {}/{}]", run.suite_iteration, run.suite_iterations));
    }
    if run.iterations != 1 {
        name.push_str(&format!(" [iter {}/{}]", iter_idx + 1, run.iterations));
    }
    name
}

/// Execute `query` `settings.run.iterations` times.
///
/// Each execution is timed; depending on the run settings the timing is
/// appended to the timing log and the result is checked against the stored
/// answer. Each result is printed when `show_results` is set.
///
/// `library_version` defaults to the harness version when not given.
pub fn run_query_generic<T, Q>(
    settings: &Settings,
    mut query: Q,
    query_number: u32,
    library_name: &str,
    library_version: Option<&str>,
    query_checker: Option<&dyn QueryChecker<T>>,
) -> Result<()>
where
    Q: FnMut() -> Result<T>,
    T: Display,
{
    let run = &settings.run;
    let version = library_version.unwrap_or(VERSION);

    for iter_idx in 0..run.iterations {
        let timer = CodeTimer::start(run_label(run, library_name, query_number, iter_idx));
        let result = query()?;
        let took = timer.stop();

        if run.log_timings {
            log_query_timing(settings, library_name, version, query_number, took)?;
        }

        if run.check_results {
            let checker = query_checker.ok_or_else(|| {
                BenchError::Config(
                    "cannot check results if no query checking function is provided".to_string(),
                )
            })?;
            if settings.scale_factor != ANSWERS_SCALE_FACTOR {
                return Err(BenchError::Precondition(format!(
                    "cannot check results when scale factor is not 1, got {}",
                    settings.scale_factor
                )));
            }
            checker.check(&result, query_number)?;
            debug!("Query {} iteration {} checked", query_number, iter_idx + 1);
        }

        if run.show_results {
            println!("{}", result);
        }
    }

    Ok(())
}
