// Copyright 2025 Apache Doris Community
// Licensed under the Apache License, Version 2.0

//! Bulk loader for dbgen output
//!
//! Creates the schema from bundled DDL, imports every `<table>.tbl` through
//! a transport tunnel, then builds indices and refreshes statistics.

use std::path::{Path, PathBuf};
use std::thread;
use tracing::info;

use tpch_common::{BenchError, ExasolSettings, Result, Settings, TpchTable};
use tpch_harness::CodeTimer;

use crate::connection::{ExaConnection, SqlConnection};
use crate::tables::table_name;
use crate::transport::TransportTunnel;

pub const CREATE_SCHEMA_SQL: &str = include_str!("../sql/create_schema.sql");
pub const CREATE_INDICES_SQL: &str = include_str!("../sql/create_indices_1node.sql");
pub const ANALYZE_DATABASE_SQL: &str = include_str!("../sql/analyze_database.sql");

/// Statements of a bundled script with `{schema}` substituted
pub fn script_statements(script: &str, schema: &str) -> Vec<String> {
    let without_comments: String = script
        .lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");

    without_comments
        .replace("{schema}", schema)
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Execute a bundled script statement by statement
pub fn run_script<C>(conn: &mut C, name: &str, script: &str, schema: &str) -> Result<()>
where
    C: SqlConnection + ?Sized,
{
    let timer = CodeTimer::start(format!("Script {}", name));
    for statement in script_statements(script, schema) {
        conn.execute(&statement)?;
    }
    timer.stop();
    Ok(())
}

/// IMPORT statement reading from a tunnel's internal address
pub fn import_statement(table: TpchTable, schema: &str, address: &str) -> String {
    format!(
        "IMPORT INTO {} FROM CSV AT 'http://{}' FILE '000.csv' \
         COLUMN SEPARATOR = '|' ROW SEPARATOR = 'LF'",
        table_name(table, Some(schema)),
        address
    )
}

/// `<data_dir>/<table>.tbl` for every table, in load order
pub fn table_files(data_dir: &Path) -> Result<Vec<(TpchTable, PathBuf)>> {
    let files: Vec<(TpchTable, PathBuf)> = TpchTable::ALL
        .iter()
        .map(|&table| (table, data_dir.join(format!("{}.tbl", table.name()))))
        .collect();

    let missing: Vec<String> = files
        .iter()
        .filter(|(_, path)| !path.is_file())
        .map(|(table, _)| format!("{}.tbl", table.name()))
        .collect();
    if !missing.is_empty() {
        return Err(BenchError::Config(format!(
            "missing table files in {:?}: {}",
            data_dir,
            missing.join(", ")
        )));
    }

    Ok(files)
}

/// Import one table file and commit. Returns the number of imported rows.
pub fn import_table<C>(
    conn: &mut C,
    exasol: &ExasolSettings,
    table: TpchTable,
    path: &Path,
) -> Result<u64>
where
    C: SqlConnection + ?Sized,
{
    let timer = CodeTimer::start(format!("Import {}", table));

    let tunnel = TransportTunnel::open(&exasol.host, exasol.port)?;
    let sql = import_statement(table, &exasol.schema, &tunnel.address());
    let shutdown = tunnel.shutdown_handle()?;

    let rows = thread::scope(|scope| {
        let server = scope.spawn(move || tunnel.serve_file(path));

        let imported = conn.execute(&sql);
        if imported.is_err() {
            shutdown.shutdown();
        }
        let served = server
            .join()
            .map_err(|_| BenchError::Engine(format!("tunnel for {} panicked", table)))?;

        let rows = imported?;
        served?;
        Ok::<u64, BenchError>(rows)
    })?;

    conn.execute("COMMIT")?;
    timer.stop();
    info!("Imported {} rows into {}", rows, table);
    Ok(rows)
}

/// Create the schema, import every table, then index and analyze
pub fn load_tables<C>(conn: &mut C, exasol: &ExasolSettings, data_dir: &Path) -> Result<()>
where
    C: SqlConnection + ?Sized,
{
    let files = table_files(data_dir)?;
    let schema = exasol.schema.as_str();

    run_script(conn, "create_schema.sql", CREATE_SCHEMA_SQL, schema)?;
    for (table, path) in &files {
        import_table(conn, exasol, *table, path)?;
    }
    run_script(conn, "create_indices_1node.sql", CREATE_INDICES_SQL, schema)?;
    run_script(conn, "analyze_database.sql", ANALYZE_DATABASE_SQL, schema)?;
    Ok(())
}

/// Load a generated dataset into Exasol
pub fn load_data(settings: &Settings, data_dir: &Path) -> Result<()> {
    info!("Loading TPC-H tables from {:?} into schema {}", data_dir, settings.exasol.schema);
    let overall = CodeTimer::start("Load all tables into exasol");

    table_files(data_dir)?;
    let mut conn = ExaConnection::connect(&settings.exasol, None)?;
    load_tables(&mut conn, &settings.exasol, data_dir)?;
    conn.close()?;

    overall.stop();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_statements() {
        let statements = script_statements(CREATE_SCHEMA_SQL, "bench");
        assert_eq!(statements[0], "CREATE SCHEMA IF NOT EXISTS bench");
        assert_eq!(statements[1], "OPEN SCHEMA bench");
        assert_eq!(statements.len(), 2 + TpchTable::ALL.len());
        assert!(statements.iter().all(|s| !s.contains("{schema}")));
    }

    #[test]
    fn test_index_and_analyze_scripts() {
        let indices = script_statements(CREATE_INDICES_SQL, "tpc");
        assert!(indices.iter().any(|s| s == "ENFORCE LOCAL INDEX ON tpc.lineitem (l_orderkey)"));
        assert_eq!(indices.last().map(String::as_str), Some("COMMIT"));

        let analyze = script_statements(ANALYZE_DATABASE_SQL, "tpc");
        assert_eq!(analyze, vec!["ANALYZE DATABASE REFRESH STATISTICS", "COMMIT"]);
    }

    #[test]
    fn test_import_statement() {
        assert_eq!(
            import_statement(TpchTable::Orders, "tpc", "10.0.0.5:20000"),
            "IMPORT INTO tpc.orders FROM CSV AT 'http://10.0.0.5:20000' FILE '000.csv' \
             COLUMN SEPARATOR = '|' ROW SEPARATOR = 'LF'"
        );
    }

    #[test]
    fn test_table_files_reports_missing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("nation.tbl"), "0|ALGERIA|0|x|\n").unwrap();

        let err = table_files(dir.path()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("lineitem.tbl"));
        assert!(!message.contains("nation.tbl"));
    }
}
