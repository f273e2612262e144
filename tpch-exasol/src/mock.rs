// Copyright 2025 Apache Doris Community
// Licensed under the Apache License, Version 2.0

//! Mock connection for testing
//!
//! Replays scripted results in order and records every statement it sees,
//! so the adapter and loader can be exercised without an Exasol cluster.

use std::collections::VecDeque;

use tpch_common::{BenchError, Result};
use tpch_harness::ResultTable;

use crate::connection::SqlConnection;

/// Scripted response to one statement
#[derive(Debug, Clone)]
pub enum MockResponse {
    Table(ResultTable),
    RowCount(u64),
    Error(String),
}

#[derive(Debug, Default)]
pub struct MockConnection {
    responses: VecDeque<MockResponse>,
    /// Statements received, in order
    pub statements: Vec<String>,
}

impl MockConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the response for the next statement
    pub fn push(&mut self, response: MockResponse) {
        self.responses.push_back(response);
    }

    pub fn push_table(&mut self, table: ResultTable) {
        self.push(MockResponse::Table(table));
    }

    fn next(&mut self, sql: &str) -> MockResponse {
        self.statements.push(sql.to_string());
        self.responses
            .pop_front()
            .unwrap_or(MockResponse::RowCount(0))
    }
}

impl SqlConnection for MockConnection {
    fn query(&mut self, sql: &str) -> Result<ResultTable> {
        match self.next(sql) {
            MockResponse::Table(table) => Ok(table),
            MockResponse::RowCount(_) => Err(BenchError::Protocol(
                "statement returned a row count, not a result set".to_string(),
            )),
            MockResponse::Error(message) => Err(BenchError::Engine(message)),
        }
    }

    fn execute(&mut self, sql: &str) -> Result<u64> {
        match self.next(sql) {
            MockResponse::Table(table) => Ok(table.num_rows() as u64),
            MockResponse::RowCount(count) => Ok(count),
            MockResponse::Error(message) => Err(BenchError::Engine(message)),
        }
    }
}
