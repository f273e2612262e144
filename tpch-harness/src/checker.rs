// Copyright 2025 Apache Doris Community
// Licensed under the Apache License, Version 2.0

//! Result checking against stored answers
//!
//! Both tables are normalized before comparison:
//! - column names are lower-cased
//! - columns that hold text in the answer are trimmed on both sides
//! - shared columns whose cells all look like dates are rewritten as
//!   `YYYY-MM-DD` text on both sides
//!
//! then compared column by column with numeric tolerance and without
//! requiring identical column types.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use tpch_common::{BenchError, Result, Settings};

use crate::answers::read_answer;
use crate::table::{Column, ColumnType, QueryOutput, ResultTable, Value};

/// Relative tolerance for numeric cells
pub const RTOL: f64 = 1e-5;

/// Absolute tolerance for numeric cells
pub const ATOL: f64 = 1e-8;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
];

/// Validates a fresh query result
pub trait QueryChecker<T: ?Sized> {
    fn check(&self, result: &T, query_number: u32) -> Result<()>;
}

impl<T: ?Sized, F> QueryChecker<T> for F
where
    F: Fn(&T, u32) -> Result<()>,
{
    fn check(&self, result: &T, query_number: u32) -> Result<()> {
        self(result, query_number)
    }
}

/// Checks results against `q<N>.parquet` in an answers directory
#[derive(Debug, Clone)]
pub struct AnswerChecker {
    answers_dir: PathBuf,
}

impl AnswerChecker {
    pub fn new(answers_dir: impl Into<PathBuf>) -> Self {
        Self {
            answers_dir: answers_dir.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.paths.answers.clone())
    }

    pub fn answers_dir(&self) -> &Path {
        &self.answers_dir
    }
}

impl QueryChecker<ResultTable> for AnswerChecker {
    fn check(&self, result: &ResultTable, query_number: u32) -> Result<()> {
        let expected = read_answer(&self.answers_dir, query_number)?;
        check_query_result(result, &expected, query_number)?;
        info!("Query {} result matches the stored answer", query_number);
        Ok(())
    }
}

impl QueryChecker<QueryOutput> for AnswerChecker {
    fn check(&self, result: &QueryOutput, query_number: u32) -> Result<()> {
        match result {
            QueryOutput::Table(table) => {
                QueryChecker::<ResultTable>::check(self, table, query_number)
            }
            QueryOutput::Discarded { .. } => Err(BenchError::Config(format!(
                "result of query {} was discarded and cannot be checked",
                query_number
            ))),
        }
    }
}

/// Compare a result to an answer after normalizing both
pub fn check_query_result(
    result: &ResultTable,
    expected: &ResultTable,
    query_number: u32,
) -> Result<()> {
    let (got, exp) = normalize_pair(result, expected);
    assert_tables_equal(&got, &exp)
        .map_err(|message| BenchError::ResultMismatch { query_number, message })
}

/// Apply the normalization rules to a (result, answer) pair
pub fn normalize_pair(result: &ResultTable, expected: &ResultTable) -> (ResultTable, ResultTable) {
    let text_columns: Vec<String> = expected
        .columns()
        .iter()
        .filter(|c| c.data_type == ColumnType::Text)
        .map(|c| c.name.to_lowercase())
        .collect();

    let mut got = result.clone();
    let mut exp = expected.clone();
    lowercase_names(&mut got);
    lowercase_names(&mut exp);

    for name in &text_columns {
        if got.column(name).is_none() {
            continue;
        }
        if let Some(column) = got.column_mut(name) {
            trim_text(column);
        }
        if let Some(column) = exp.column_mut(name) {
            trim_text(column);
        }
    }

    let shared: Vec<String> = got
        .column_names()
        .into_iter()
        .filter(|name| exp.column(name).is_some())
        .map(str::to_string)
        .collect();

    for name in shared {
        let got_dates = got.column(&name).and_then(iso_dates);
        let exp_dates = exp.column(&name).and_then(iso_dates);
        if let (Some(got_dates), Some(exp_dates)) = (got_dates, exp_dates) {
            debug!("Normalizing column '{}' as dates", name);
            replace_with_text(got.column_mut(&name), got_dates);
            replace_with_text(exp.column_mut(&name), exp_dates);
        }
    }

    (got, exp)
}

fn lowercase_names(table: &mut ResultTable) {
    for column in table.columns_mut() {
        column.name = column.name.to_lowercase();
    }
}

fn trim_text(column: &mut Column) {
    for value in column.values.iter_mut() {
        let trimmed = match &*value {
            Value::Null => continue,
            Value::String(s) => s.trim().to_string(),
            other => other.to_string().trim().to_string(),
        };
        *value = Value::String(trimmed);
    }
    column.data_type = ColumnType::Text;
}

fn replace_with_text(column: Option<&mut Column>, values: Vec<Value>) {
    if let Some(column) = column {
        column.values = values;
        column.data_type = ColumnType::Text;
    }
}

/// Render a column as ISO dates, or `None` when any cell is not date-like
fn iso_dates(column: &Column) -> Option<Vec<Value>> {
    column
        .values
        .iter()
        .map(|value| match value {
            Value::Null => Some(Value::Null),
            Value::Date(d) => Some(iso(*d)),
            Value::Timestamp(ts) => Some(iso(ts.date())),
            Value::String(s) => parse_date_like(s).map(iso),
            _ => None,
        })
        .collect()
}

fn iso(date: NaiveDate) -> Value {
    Value::String(date.format("%Y-%m-%d").to_string())
}

/// Best-effort date parsing of a text cell
pub fn parse_date_like(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
    {
        return Some(date);
    }
    if let Some(ts) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
    {
        return Some(ts.date());
    }
    DateTime::parse_from_rfc3339(text).ok().map(|ts| ts.date_naive())
}

fn assert_tables_equal(got: &ResultTable, exp: &ResultTable) -> std::result::Result<(), String> {
    if got.column_names() != exp.column_names() {
        return Err(format!(
            "columns are different: left={:?}, right={:?}",
            got.column_names(),
            exp.column_names()
        ));
    }

    if got.num_rows() != exp.num_rows() {
        return Err(format!(
            "shape mismatch: left=({}, {}), right=({}, {})",
            got.num_rows(),
            got.num_columns(),
            exp.num_rows(),
            exp.num_columns()
        ));
    }

    for (idx, (left, right)) in got.columns().iter().zip(exp.columns()).enumerate() {
        for (row, (a, b)) in left.values.iter().zip(&right.values).enumerate() {
            if !values_match(a, b) {
                return Err(format!(
                    "column \"{}\" (iloc[:, {}]) differs at row {}: left={}, right={}",
                    left.name, idx, row, a, b
                ));
            }
        }
    }

    Ok(())
}

/// Cell equality without dtype checks; numbers compare with tolerance
pub fn values_match(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Boolean(x), Value::Boolean(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Date(x), Value::Date(y)) => x == y,
        (Value::Timestamp(x), Value::Timestamp(y)) => x == y,
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => is_close(x, y),
            _ => false,
        },
    }
}

/// `y` is the expected value; the tolerance scales with it only
fn is_close(x: f64, y: f64) -> bool {
    if x.is_nan() || y.is_nan() {
        return x.is_nan() && y.is_nan();
    }
    if x == y {
        return true;
    }
    (x - y).abs() <= ATOL + RTOL * y.abs()
}
