// Copyright 2025 Apache Doris Community
// Licensed under the Apache License, Version 2.0

//! Query result types

use chrono::{NaiveDate, NaiveDateTime};
use prettytable::{Cell, Row, Table};
use std::fmt;

use tpch_common::{BenchError, Result};

/// Cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Int(i64),
    Double(f64),
    String(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view used for tolerant comparison
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::String(v) => f.write_str(v),
            Value::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            Value::Timestamp(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S%.f")),
        }
    }
}

/// Logical column type, independent of the producing engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Boolean,
    Integer,
    Float,
    Text,
    Date,
    Timestamp,
}

/// A named, typed column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data_type: ColumnType,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: ColumnType, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            data_type,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Column-major result table
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultTable {
    columns: Vec<Column>,
}

impl ResultTable {
    /// Build a table; all columns must have the same length
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            if let Some(bad) = columns.iter().find(|c| c.len() != first.len()) {
                return Err(BenchError::Serialization(format!(
                    "column '{}' has {} rows, expected {}",
                    bad.name,
                    bad.len(),
                    first.len()
                )));
            }
        }
        Ok(Self { columns })
    }

    /// Build a table from a schema and row-major values
    pub fn from_rows(schema: &[(&str, ColumnType)], rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut columns: Vec<Column> = schema
            .iter()
            .map(|(name, data_type)| Column::new(*name, *data_type, Vec::with_capacity(rows.len())))
            .collect();

        for (idx, row) in rows.into_iter().enumerate() {
            if row.len() != columns.len() {
                return Err(BenchError::Serialization(format!(
                    "row {} has {} values, expected {}",
                    idx,
                    row.len(),
                    columns.len()
                )));
            }
            for (column, value) in columns.iter_mut().zip(row) {
                column.values.push(value);
            }
        }

        Ok(Self { columns })
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn row(&self, idx: usize) -> Option<Vec<&Value>> {
        if idx >= self.num_rows() {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.values[idx]).collect())
    }
}

impl fmt::Display for ResultTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "shape: ({}, {})", self.num_rows(), self.num_columns())?;

        let mut table = Table::new();
        table.set_titles(Row::new(
            self.columns.iter().map(|c| Cell::new(&c.name)).collect(),
        ));
        for idx in 0..self.num_rows() {
            table.add_row(Row::new(
                self.columns
                    .iter()
                    .map(|c| Cell::new(&c.values[idx].to_string()))
                    .collect(),
            ));
        }
        write!(f, "{}", table)
    }
}

/// What an engine adapter hands back to the harness
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput {
    /// Rows were fetched and materialized
    Table(ResultTable),
    /// Rows were left on the server; only the count is known
    Discarded { row_count: u64 },
}

impl QueryOutput {
    pub fn table(&self) -> Option<&ResultTable> {
        match self {
            QueryOutput::Table(table) => Some(table),
            QueryOutput::Discarded { .. } => None,
        }
    }

    pub fn row_count(&self) -> u64 {
        match self {
            QueryOutput::Table(table) => table.num_rows() as u64,
            QueryOutput::Discarded { row_count } => *row_count,
        }
    }
}

impl fmt::Display for QueryOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryOutput::Table(table) => write!(f, "{}", table),
            QueryOutput::Discarded { row_count } => {
                write!(f, "{} rows (result set discarded)", row_count)
            }
        }
    }
}
