// Copyright 2025 Apache Doris Community
// Licensed under the Apache License, Version 2.0

//! Tests for the subprocess suite driver
#![cfg(unix)]

use std::fs;
use std::path::Path;
use std::process::Command;

use tpch_common::Settings;
use tpch_harness::execute_all;

fn write_queries(queries: &Path, numbers: &[u32]) {
    let dir = queries.join("exasol");
    fs::create_dir_all(&dir).unwrap();
    for n in numbers {
        fs::write(dir.join(format!("q{}.sql", n)), "select 1;").unwrap();
    }
}

#[test]
fn test_each_query_runs_once_per_suite_iteration_in_order() {
    let dir = tempfile::tempdir().unwrap();
    write_queries(&dir.path().join("queries"), &[2, 1, 10]);
    let out = dir.path().join("calls.txt");

    let mut settings = Settings::default();
    settings.paths.queries = dir.path().join("queries");
    settings.run.suite_iterations = 2;

    let summary = execute_all(&settings, "exasol", |query_number| {
        let mut command = Command::new("sh");
        command.arg("-c").arg(format!(
            "echo \"$RUN_SUITE_ITERATION,{}\" >> '{}'",
            query_number,
            out.display()
        ));
        command
    })
    .unwrap();

    assert_eq!(summary.runs, 6);
    assert!(summary.failures.is_empty());

    let calls = fs::read_to_string(&out).unwrap();
    let calls: Vec<&str> = calls.lines().collect();
    assert_eq!(calls, vec!["1,1", "1,2", "1,10", "2,1", "2,2", "2,10"]);
}

#[test]
fn test_failing_child_does_not_stop_suite() {
    let dir = tempfile::tempdir().unwrap();
    write_queries(&dir.path().join("queries"), &[1, 2, 3]);

    let mut settings = Settings::default();
    settings.paths.queries = dir.path().join("queries");

    let summary = execute_all(&settings, "exasol", |query_number| {
        let mut command = Command::new("sh");
        command
            .arg("-c")
            .arg(if query_number == 2 { "exit 3" } else { "exit 0" });
        command
    })
    .unwrap();

    assert_eq!(summary.runs, 3);
    assert_eq!(summary.failures, vec![(1, 2)]);
}
