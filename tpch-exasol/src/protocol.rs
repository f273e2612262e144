// Copyright 2025 Apache Doris Community
// Licensed under the Apache License, Version 2.0

//! Exasol WebSocket protocol messages
//!
//! Every request is one JSON text frame tagged by `command`. Every response
//! carries `status` (`ok` or `error`), and either `responseData` or an
//! `exception`. Result sets are column-major: `data[column][row]`.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use tpch_common::{BenchError, Result};
use tpch_harness::{Column, ColumnType, ResultTable, Value};

/// Protocol version negotiated at login
pub const PROTOCOL_VERSION: u32 = 3;

/// Client request
#[derive(Debug, Serialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Request<'a> {
    Login {
        #[serde(rename = "protocolVersion")]
        protocol_version: u32,
    },
    Execute {
        #[serde(rename = "sqlText")]
        sql_text: &'a str,
    },
    Fetch {
        #[serde(rename = "resultSetHandle")]
        result_set_handle: i64,
        #[serde(rename = "startPosition")]
        start_position: u64,
        #[serde(rename = "numBytes")]
        num_bytes: u64,
    },
    CloseResultSet {
        #[serde(rename = "resultSetHandles")]
        result_set_handles: Vec<i64>,
    },
    Disconnect,
}

/// Second login frame, sent after the server's public key arrives
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials<'a> {
    pub username: &'a str,
    /// RSA-encrypted, base64-encoded password
    pub password: String,
    pub use_compression: bool,
    pub client_name: &'a str,
    pub driver_name: &'a str,
    pub client_os: &'a str,
    pub client_version: &'a str,
    pub attributes: SessionAttributes<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionAttributes<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_schema: Option<&'a str>,
    pub autocommit: bool,
}

/// Response envelope
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response<T> {
    pub status: String,
    pub response_data: Option<T>,
    pub exception: Option<ExaException>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExaException {
    pub text: String,
    #[serde(default)]
    pub sql_code: String,
}

impl<T> Response<T> {
    /// Unwrap the payload, mapping server exceptions to engine errors
    pub fn into_result(self) -> Result<Option<T>> {
        if self.status == "ok" {
            return Ok(self.response_data);
        }
        match self.exception {
            Some(e) => Err(BenchError::Engine(format!("[{}] {}", e.sql_code, e.text))),
            None => Err(BenchError::Protocol(format!(
                "response status '{}' without exception",
                self.status
            ))),
        }
    }

    /// Like `into_result` but the payload must be present
    pub fn into_data(self) -> Result<T> {
        self.into_result()?
            .ok_or_else(|| BenchError::Protocol("response without responseData".to_string()))
    }
}

/// Payload of the first login response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKey {
    pub public_key_pem: String,
}

/// Payload of a successful authentication
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionInfo {
    pub session_id: i64,
    pub protocol_version: u32,
    pub release_version: String,
    pub database_name: String,
    pub product_name: String,
}

/// Payload of `execute`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteData {
    pub num_results: usize,
    pub results: Vec<StatementResult>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "resultType", rename_all = "camelCase")]
pub enum StatementResult {
    ResultSet {
        #[serde(rename = "resultSet")]
        result_set: ResultSetData,
    },
    RowCount {
        #[serde(rename = "rowCount")]
        row_count: u64,
    },
}

/// Result set header plus the rows that fit into the first message
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSetData {
    /// Present only when rows remain on the server
    pub result_set_handle: Option<i64>,
    pub num_columns: usize,
    pub num_rows: u64,
    #[serde(default)]
    pub num_rows_in_message: u64,
    pub columns: Vec<ColumnInfo>,
    #[serde(default)]
    pub data: Vec<Vec<Json>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: DataTypeInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataTypeInfo {
    #[serde(rename = "type")]
    pub type_name: String,
    pub precision: Option<u32>,
    pub scale: Option<i32>,
    pub size: Option<u32>,
}

impl DataTypeInfo {
    pub fn column_type(&self) -> ColumnType {
        match self.type_name.as_str() {
            "DECIMAL" if self.scale.unwrap_or(0) == 0 => ColumnType::Integer,
            "DECIMAL" | "DOUBLE" => ColumnType::Float,
            "DATE" => ColumnType::Date,
            "TIMESTAMP" | "TIMESTAMP WITH LOCAL TIME ZONE" => ColumnType::Timestamp,
            "BOOLEAN" => ColumnType::Boolean,
            _ => ColumnType::Text,
        }
    }
}

/// Payload of `fetch`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchData {
    pub num_rows: u64,
    #[serde(default)]
    pub data: Vec<Vec<Json>>,
}

/// Convert one JSON cell to a typed value
pub fn cell_value(data_type: ColumnType, cell: &Json) -> Result<Value> {
    if cell.is_null() {
        return Ok(Value::Null);
    }

    let bad = || BenchError::Protocol(format!("cannot read {:?} cell from {}", data_type, cell));

    let value = match data_type {
        ColumnType::Integer => match cell {
            Json::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .map(Value::Int),
            Json::String(s) => s.parse::<i64>().ok().map(Value::Int),
            _ => None,
        },
        ColumnType::Float => match cell {
            Json::Number(n) => n.as_f64().map(Value::Double),
            Json::String(s) => s.parse::<f64>().ok().map(Value::Double),
            _ => None,
        },
        ColumnType::Boolean => cell.as_bool().map(Value::Boolean),
        ColumnType::Date => cell
            .as_str()
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
            .map(Value::Date),
        ColumnType::Timestamp => cell
            .as_str()
            .and_then(|s| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").ok())
            .map(Value::Timestamp),
        ColumnType::Text => Some(match cell {
            Json::String(s) => Value::String(s.clone()),
            other => Value::String(other.to_string()),
        }),
    };

    value.ok_or_else(bad)
}

/// Append column-major JSON data to typed column buffers
pub fn append_columns(columns: &mut [Column], data: &[Vec<Json>]) -> Result<()> {
    if data.len() != columns.len() {
        return Err(BenchError::Protocol(format!(
            "expected {} data columns, got {}",
            columns.len(),
            data.len()
        )));
    }
    for (column, cells) in columns.iter_mut().zip(data) {
        column.values.reserve(cells.len());
        for cell in cells {
            column.values.push(cell_value(column.data_type, cell)?);
        }
    }
    Ok(())
}

/// Empty typed columns for a result set header
pub fn empty_columns(infos: &[ColumnInfo]) -> Vec<Column> {
    infos
        .iter()
        .map(|info| Column::new(info.name.clone(), info.data_type.column_type(), Vec::new()))
        .collect()
}

/// Build a table from a result set whose rows all arrived in one message
pub fn result_table(result_set: &ResultSetData) -> Result<ResultTable> {
    let mut columns = empty_columns(&result_set.columns);
    append_columns(&mut columns, &result_set.data)?;
    ResultTable::new(columns)
}
