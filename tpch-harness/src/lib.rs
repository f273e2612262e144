// Copyright 2025 Apache Doris Community
// Licensed under the Apache License, Version 2.0

//! Benchmark harness shared by all query implementations
//!
//! - [`runner::run_query_generic`] times repeated executions of one query,
//!   logs timings and checks results
//! - [`checker`] compares fresh results to stored answers
//! - [`memo::OnSecondCall`] separates cold (I/O) from warm calls
//! - [`suite::execute_all`] runs every query of a library in subprocesses

pub mod table;
pub mod answers;
pub mod checker;
pub mod timing;
pub mod memo;
pub mod runner;
pub mod suite;

pub use table::{Column, ColumnType, QueryOutput, ResultTable, Value};
pub use checker::{check_query_result, AnswerChecker, QueryChecker};
pub use timing::{CodeTimer, TimingLog, TimingRecord};
pub use memo::OnSecondCall;
pub use runner::run_query_generic;
pub use suite::{execute_all, query_numbers, SuiteSummary};
