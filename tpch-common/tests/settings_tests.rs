// Copyright 2025 Apache Doris Community
// Licensed under the Apache License, Version 2.0

//! Tests for settings file loading

use std::io::Write;
use std::path::PathBuf;

use tpch_common::{BenchError, IoType, Settings};

#[test]
fn test_from_file_partial_toml_keeps_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
scale_factor = 10.0

[run]
iterations = 3
io_type = "csv"
check_results = true

[exasol]
host = "exasol.internal"
schema = "tpch_sf10"
"#
    )
    .unwrap();

    let settings = Settings::from_file(file.path()).unwrap();

    assert_eq!(settings.scale_factor, 10.0);
    assert_eq!(settings.run.iterations, 3);
    assert_eq!(settings.run.io_type, IoType::Csv);
    assert!(settings.run.check_results);
    assert_eq!(settings.run.suite_iterations, 1);
    assert_eq!(settings.exasol.host, "exasol.internal");
    assert_eq!(settings.exasol.port, 8563);
    assert_eq!(settings.exasol.schema, "tpch_sf10");
    assert_eq!(settings.paths.answers, PathBuf::from("data/answers"));
    assert_eq!(settings.dataset_base_dir(), PathBuf::from("data/tables/scale-10.0"));
}

#[test]
fn test_from_file_rejects_bad_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "scale_factor = \"one\"").unwrap();

    let err = Settings::from_file(file.path()).unwrap_err();
    assert!(matches!(err, BenchError::Config(_)));
}

#[test]
fn test_load_without_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::load(&dir.path().join("missing.toml")).unwrap();
    assert!(settings.validate().is_ok());
}
