// Copyright 2025 Apache Doris Community
// Licensed under the Apache License, Version 2.0

//! Tests for checking results against Parquet answers

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::ArrowWriter;

use tpch_common::BenchError;
use tpch_harness::answers::{answer_path, read_answer};
use tpch_harness::{AnswerChecker, ColumnType, QueryChecker, QueryOutput, ResultTable, Value};

/// Days since the Unix epoch for a calendar date
fn epoch_days(y: i32, m: u32, d: u32) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    (NaiveDate::from_ymd_opt(y, m, d).unwrap() - epoch).num_days() as i32
}

/// Write a small Q3-shaped answer
fn write_answer(dir: &Path, query_number: u32) {
    let schema = Arc::new(Schema::new(vec![
        Field::new("l_orderkey", DataType::Int64, false),
        Field::new("revenue", DataType::Float64, false),
        Field::new("o_orderdate", DataType::Date32, false),
        Field::new("o_shippriority", DataType::Utf8, false),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(vec![2456423, 3459808, 492164])),
        Arc::new(Float64Array::from(vec![406181.0111, 405838.6989, 390324.061])),
        Arc::new(Date32Array::from(vec![
            epoch_days(1995, 3, 5),
            epoch_days(1995, 3, 4),
            epoch_days(1995, 2, 19),
        ])),
        Arc::new(StringArray::from(vec!["0", "0", "0"])),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();

    let file = File::create(answer_path(dir, query_number)).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
}

fn engine_result(rows: usize) -> ResultTable {
    let all = vec![
        (2456423, 406181.0111, "1995/03/05", "0 "),
        (3459808, 405838.6989, "1995/03/04", " 0"),
        (492164, 390324.061, "1995/02/19", "0"),
    ];
    ResultTable::from_rows(
        &[
            ("L_ORDERKEY", ColumnType::Integer),
            ("REVENUE", ColumnType::Float),
            ("O_ORDERDATE", ColumnType::Text),
            ("O_SHIPPRIORITY", ColumnType::Text),
        ],
        all.into_iter()
            .take(rows)
            .map(|(key, revenue, date, priority)| {
                vec![
                    Value::Int(key),
                    Value::Double(revenue),
                    Value::String(date.to_string()),
                    Value::String(priority.to_string()),
                ]
            })
            .collect(),
    )
    .unwrap()
}

#[test]
fn test_read_answer_types() {
    let dir = tempfile::tempdir().unwrap();
    write_answer(dir.path(), 3);

    let answer = read_answer(dir.path(), 3).unwrap();
    assert_eq!(answer.num_rows(), 3);
    assert_eq!(
        answer.column_names(),
        vec!["l_orderkey", "revenue", "o_orderdate", "o_shippriority"]
    );
    assert_eq!(
        answer.column("o_orderdate").unwrap().values[0],
        Value::Date(NaiveDate::from_ymd_opt(1995, 3, 5).unwrap())
    );
    assert_eq!(answer.column("l_orderkey").unwrap().data_type, ColumnType::Integer);
}

#[test]
fn test_normalized_result_matches_answer() {
    let dir = tempfile::tempdir().unwrap();
    write_answer(dir.path(), 3);
    let checker = AnswerChecker::new(dir.path());

    QueryChecker::<ResultTable>::check(&checker, &engine_result(3), 3).unwrap();
    QueryChecker::<QueryOutput>::check(&checker, &QueryOutput::Table(engine_result(3)), 3)
        .unwrap();
}

#[test]
fn test_missing_row_is_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    write_answer(dir.path(), 3);
    let checker = AnswerChecker::new(dir.path());

    let err = QueryChecker::<ResultTable>::check(&checker, &engine_result(2), 3).unwrap_err();
    assert!(matches!(err, BenchError::ResultMismatch { query_number: 3, .. }));
}

#[test]
fn test_missing_answer_file() {
    let dir = tempfile::tempdir().unwrap();
    let checker = AnswerChecker::new(dir.path());

    let err = QueryChecker::<ResultTable>::check(&checker, &engine_result(3), 7).unwrap_err();
    assert!(matches!(err, BenchError::Answer(_)));
}
