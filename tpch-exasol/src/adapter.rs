// Copyright 2025 Apache Doris Community
// Licensed under the Apache License, Version 2.0

//! Exasol query runner
//!
//! One connection per process, opened on first use and kept until exit.
//! Queries come either from `queries/exasol/q<N>.sql` (plain table names,
//! resolved by the session's schema) or from the bundled template
//! (schema-qualified names).

use lazy_static::lazy_static;
use parking_lot::Mutex;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, info};

use tpch_common::{BenchError, Result, Settings};
use tpch_harness::{run_query_generic, AnswerChecker, QueryChecker, QueryOutput};

use crate::connection::{ExaConnection, SqlConnection};
use crate::tables::render;
use crate::template::bundled_query;

pub const LIBRARY_NAME: &str = "exasol";

/// Client version recorded in the timing log
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

lazy_static! {
    static ref CONNECTION: Mutex<Option<ExaConnection>> = Mutex::new(None);
}

/// Where query bodies are read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuerySource {
    #[default]
    Files,
    Template,
}

/// Run `f` on the process-wide connection, connecting first if needed
pub fn with_connection<R>(
    settings: &Settings,
    f: impl FnOnce(&mut ExaConnection) -> Result<R>,
) -> Result<R> {
    let mut guard = CONNECTION.lock();
    if guard.is_none() {
        let conn = ExaConnection::connect(&settings.exasol, Some(&settings.exasol.schema))?;
        *guard = Some(conn);
    }
    match guard.as_mut() {
        Some(conn) => f(conn),
        None => Err(BenchError::Engine("connection unavailable".to_string())),
    }
}

/// Path of a per-query SQL file
pub fn query_file(settings: &Settings, query_number: u32) -> PathBuf {
    settings
        .paths
        .queries
        .join(LIBRARY_NAME)
        .join(format!("q{}.sql", query_number))
}

/// Rendered SQL text for a query
pub fn query_text(settings: &Settings, query_number: u32, source: QuerySource) -> Result<String> {
    match source {
        QuerySource::Template => Ok(render(
            bundled_query(query_number)?,
            Some(&settings.exasol.schema),
        )),
        QuerySource::Files => {
            let path = query_file(settings, query_number);
            let body = fs::read_to_string(&path).map_err(|e| match e.kind() {
                ErrorKind::NotFound => BenchError::QueryNotFound(query_number),
                _ => BenchError::Io(e),
            })?;
            debug!("Read query {} from {:?}", query_number, path);
            Ok(render(&body, None))
        }
    }
}

/// Execute one statement, keeping the rows only when `materialize` is set
pub fn execute_query<C>(conn: &mut C, sql: &str, materialize: bool) -> Result<QueryOutput>
where
    C: SqlConnection + ?Sized,
{
    let output = if materialize {
        QueryOutput::Table(conn.query(sql)?)
    } else {
        QueryOutput::Discarded {
            row_count: conn.execute(sql)?,
        }
    };
    debug!("Query returned {} rows", output.row_count());
    Ok(output)
}

/// Run one query through the harness on an explicit connection
pub fn run_query_on<C>(settings: &Settings, conn: &mut C, query_number: u32, sql: &str) -> Result<()>
where
    C: SqlConnection + ?Sized,
{
    let materialize = settings.run.show_results || settings.run.check_results;
    let checker = AnswerChecker::from_settings(settings);

    run_query_generic(
        settings,
        || execute_query(&mut *conn, sql, materialize),
        query_number,
        LIBRARY_NAME,
        Some(CLIENT_VERSION),
        Some(&checker as &dyn QueryChecker<QueryOutput>),
    )
}

/// Run one TPC-H query against Exasol
pub fn run_query(settings: &Settings, query_number: u32, source: QuerySource) -> Result<()> {
    let sql = query_text(settings, query_number, source)?;
    info!("Running {} query {} ({:?})", LIBRARY_NAME, query_number, source);
    with_connection(settings, |conn| run_query_on(settings, conn, query_number, &sql))
}
