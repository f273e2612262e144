// Copyright 2025 Apache Doris Community
// Licensed under the Apache License, Version 2.0

//! Answer store: reference results, one Parquet file per query

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{
    DataType, Date32Type, Float64Type, Int64Type, Schema, TimeUnit, TimestampMicrosecondType,
};
use arrow::record_batch::{RecordBatch, RecordBatchReader};
use chrono::{DateTime, NaiveDate};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

use tpch_common::constants::ANSWER_EXTENSION;
use tpch_common::{BenchError, Result};

use crate::table::{Column, ColumnType, ResultTable, Value};

/// Days between 0001-01-01 and 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Location of the stored answer for a query
pub fn answer_path(answers_dir: &Path, query_number: u32) -> PathBuf {
    answers_dir.join(format!("q{}.{}", query_number, ANSWER_EXTENSION))
}

/// Read the stored answer for a query
pub fn read_answer(answers_dir: &Path, query_number: u32) -> Result<ResultTable> {
    let path = answer_path(answers_dir, query_number);
    debug!("Reading answer for query {} from {:?}", query_number, path);

    let file = File::open(&path)
        .map_err(|e| BenchError::Answer(format!("cannot open {:?}: {}", path, e)))?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .and_then(|builder| builder.build())
        .map_err(|e| BenchError::Answer(format!("cannot read {:?}: {}", path, e)))?;

    let schema = reader.schema();
    let batches = reader
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| BenchError::Answer(format!("cannot decode {:?}: {}", path, e)))?;

    table_from_batches(&schema, &batches)
}

/// Flatten Arrow record batches into plain cell values
pub fn table_from_batches(schema: &Schema, batches: &[RecordBatch]) -> Result<ResultTable> {
    let mut columns = Vec::with_capacity(schema.fields().len());

    for (idx, field) in schema.fields().iter().enumerate() {
        let data_type = column_type(field.data_type());
        let mut values = Vec::new();
        for batch in batches {
            values.extend(array_values(batch.column(idx), data_type)?);
        }
        columns.push(Column::new(field.name().clone(), data_type, values));
    }

    ResultTable::new(columns)
}

/// Map an Arrow type to the logical column type used for comparison
pub fn column_type(data_type: &DataType) -> ColumnType {
    match data_type {
        DataType::Boolean => ColumnType::Boolean,
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => ColumnType::Integer,
        DataType::Float16
        | DataType::Float32
        | DataType::Float64
        | DataType::Decimal128(_, _)
        | DataType::Decimal256(_, _) => ColumnType::Float,
        DataType::Date32 | DataType::Date64 => ColumnType::Date,
        DataType::Timestamp(_, _) => ColumnType::Timestamp,
        DataType::Dictionary(_, value_type) => column_type(value_type),
        _ => ColumnType::Text,
    }
}

fn array_values(array: &ArrayRef, data_type: ColumnType) -> Result<Vec<Value>> {
    let len = array.len();
    let values = match data_type {
        ColumnType::Boolean => {
            let casted = cast_to(array, &DataType::Boolean)?;
            let typed = casted.as_boolean();
            (0..len)
                .map(|i| if typed.is_null(i) { Value::Null } else { Value::Boolean(typed.value(i)) })
                .collect()
        }
        ColumnType::Integer => {
            let casted = cast_to(array, &DataType::Int64)?;
            let typed = casted.as_primitive::<Int64Type>();
            (0..len)
                .map(|i| if typed.is_null(i) { Value::Null } else { Value::Int(typed.value(i)) })
                .collect()
        }
        ColumnType::Float => {
            let casted = cast_to(array, &DataType::Float64)?;
            let typed = casted.as_primitive::<Float64Type>();
            (0..len)
                .map(|i| if typed.is_null(i) { Value::Null } else { Value::Double(typed.value(i)) })
                .collect()
        }
        ColumnType::Text => {
            let casted = cast_to(array, &DataType::Utf8)?;
            let typed = casted.as_string::<i32>();
            (0..len)
                .map(|i| {
                    if typed.is_null(i) {
                        Value::Null
                    } else {
                        Value::String(typed.value(i).to_string())
                    }
                })
                .collect()
        }
        ColumnType::Date => {
            let casted = cast_to(array, &DataType::Date32)?;
            let typed = casted.as_primitive::<Date32Type>();
            (0..len)
                .map(|i| {
                    if typed.is_null(i) {
                        return Value::Null;
                    }
                    typed
                        .value(i)
                        .checked_add(UNIX_EPOCH_DAYS_FROM_CE)
                        .and_then(NaiveDate::from_num_days_from_ce_opt)
                        .map(Value::Date)
                        .unwrap_or(Value::Null)
                })
                .collect()
        }
        ColumnType::Timestamp => {
            let casted = cast_to(array, &DataType::Timestamp(TimeUnit::Microsecond, None))?;
            let typed = casted.as_primitive::<TimestampMicrosecondType>();
            (0..len)
                .map(|i| {
                    if typed.is_null(i) {
                        return Value::Null;
                    }
                    DateTime::from_timestamp_micros(typed.value(i))
                        .map(|ts| Value::Timestamp(ts.naive_utc()))
                        .unwrap_or(Value::Null)
                })
                .collect()
        }
    };
    Ok(values)
}

fn cast_to(array: &ArrayRef, to: &DataType) -> Result<ArrayRef> {
    cast(array, to).map_err(|e| {
        BenchError::Answer(format!("cannot convert {} column to {}: {}", array.data_type(), to, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Date32Array, Decimal128Array, Int32Array, StringArray};
    use arrow::datatypes::Field;
    use std::sync::Arc;

    #[test]
    fn test_answer_path() {
        assert_eq!(
            answer_path(Path::new("data/answers"), 7),
            PathBuf::from("data/answers/q7.parquet")
        );
    }

    #[test]
    fn test_table_from_batches_flattens_types() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("n_nationkey", DataType::Int32, false),
            Field::new("revenue", DataType::Decimal128(15, 2), true),
            Field::new("n_name", DataType::Utf8, true),
            Field::new("o_orderdate", DataType::Date32, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int32Array::from(vec![1, 2])),
                Arc::new(
                    Decimal128Array::from(vec![Some(12345), None])
                        .with_precision_and_scale(15, 2)
                        .unwrap(),
                ),
                Arc::new(StringArray::from(vec![Some("ARGENTINA"), None])),
                Arc::new(Date32Array::from(vec![Some(9204), None])),
            ],
        )
        .unwrap();

        let table = table_from_batches(&schema, &[batch.clone(), batch]).unwrap();

        assert_eq!(table.num_rows(), 4);
        assert_eq!(table.columns()[0].data_type, ColumnType::Integer);
        assert_eq!(table.columns()[0].values[1], Value::Int(2));
        assert_eq!(table.columns()[1].data_type, ColumnType::Float);
        assert_eq!(table.columns()[1].values[0], Value::Double(123.45));
        assert_eq!(table.columns()[1].values[1], Value::Null);
        assert_eq!(table.columns()[2].values[0], Value::String("ARGENTINA".into()));
        assert_eq!(
            table.columns()[3].values[0],
            Value::Date(NaiveDate::from_ymd_opt(1995, 3, 15).unwrap())
        );
    }

    #[test]
    fn test_missing_answer_is_answer_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_answer(dir.path(), 1).unwrap_err();
        assert!(matches!(err, BenchError::Answer(_)));
    }
}
