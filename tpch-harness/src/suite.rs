// Copyright 2025 Apache Doris Community
// Licensed under the Apache License, Version 2.0

//! Suite driver: every query of a library, one subprocess per query
//!
//! Each query runs in a fresh process so lazily created state (the
//! engine connection, memoized loaders) never leaks between queries.

use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::process::Command;
use tracing::{info, warn};

use tpch_common::constants::SUITE_ITERATION_ENV;
use tpch_common::{BenchError, Result, Settings};

use crate::timing::CodeTimer;

lazy_static! {
    static ref QUERY_FILE: Regex = Regex::new(r"^q(\d+)\.sql$").expect("valid query file pattern");
}

/// Outcome of a suite run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuiteSummary {
    /// Subprocesses spawned
    pub runs: usize,
    /// (suite iteration, query number) of every child that exited non-zero
    pub failures: Vec<(u32, u32)>,
}

/// Query numbers implemented in `dir` (files named `q<N>.sql`), ascending
pub fn query_numbers(dir: &Path) -> Result<Vec<u32>> {
    let entries = fs::read_dir(dir).map_err(|e| {
        BenchError::Config(format!("cannot read query directory {:?}: {}", dir, e))
    })?;

    let mut numbers = Vec::new();
    for entry in entries {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        if let Some(captures) = QUERY_FILE.captures(file_name) {
            if let Ok(number) = captures[1].parse::<u32>() {
                numbers.push(number);
            }
        }
    }

    numbers.sort_unstable();
    Ok(numbers)
}

/// Run every query of `library_name` for each suite iteration.
///
/// `command_for` builds the child command for one query number; the
/// driver adds `RUN_SUITE_ITERATION` to its environment. A failing child
/// does not stop the suite.
pub fn execute_all<F>(settings: &Settings, library_name: &str, mut command_for: F) -> Result<SuiteSummary>
where
    F: FnMut(u32) -> Command,
{
    info!("{}", settings.to_json()?);

    let query_numbers = query_numbers(&settings.paths.queries.join(library_name))?;
    if query_numbers.is_empty() {
        warn!("No queries found for library '{}'", library_name);
    }

    let total_runs = settings.run.suite_iterations;
    let mut overall_name = format!("Overall execution of ALL {} queries", library_name);
    if total_runs != 1 {
        overall_name.push_str(&format!(" x{}", total_runs));
    }

    let mut summary = SuiteSummary::default();
    let overall = CodeTimer::start(overall_name);

    for run_idx in 1..=total_runs {
        let suite = CodeTimer::start(format!(
            "Suite {}/{} execution of ALL {} queries",
            run_idx, total_runs, library_name
        ));

        for &query_number in &query_numbers {
            let mut command = command_for(query_number);
            command.env(SUITE_ITERATION_ENV, run_idx.to_string());

            let status = command.status()?;
            summary.runs += 1;
            if !status.success() {
                warn!(
                    "{} query {} (suite {}/{}) exited with {}",
                    library_name, query_number, run_idx, total_runs, status
                );
                summary.failures.push((run_idx, query_number));
            }
        }

        suite.stop();
    }

    overall.stop();
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_numbers_sorted_numerically() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["q10.sql", "q2.sql", "q1.sql", "notes.txt", "q3.sql.bak", "qx.sql"] {
            fs::write(dir.path().join(name), "select 1;").unwrap();
        }

        assert_eq!(query_numbers(dir.path()).unwrap(), vec![1, 2, 10]);
    }

    #[test]
    fn test_query_numbers_missing_dir() {
        let err = query_numbers(Path::new("/nonexistent/queries/exasol")).unwrap_err();
        assert!(matches!(err, BenchError::Config(_)));
    }
}
