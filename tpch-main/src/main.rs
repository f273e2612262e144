// Copyright 2025 Apache Doris Community
// Licensed under the Apache License, Version 2.0

//! TPC-H Benchmark Runner Entry Point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::Command;
use tracing::{info, warn};

use tpch_common::constants::DEFAULT_SETTINGS_FILE;
use tpch_common::version::VersionInfo;
use tpch_common::Settings;
use tpch_exasol::{QuerySource, LIBRARY_NAME};
use tpch_harness::{execute_all, query_numbers};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file path
    #[arg(short, long, default_value = DEFAULT_SETTINGS_FILE, global = true)]
    config: PathBuf,

    /// Log level
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run every query of a library, one process per query
    RunAll {
        library: String,

        /// Take query bodies from the bundled template
        #[arg(long)]
        template: bool,
    },

    /// Run a single query
    Query {
        library: String,
        query_number: u32,

        /// Take the query body from the bundled template
        #[arg(long)]
        template: bool,
    },

    /// Create the schema and bulk load generated tables
    Load {
        library: String,

        /// Directory holding `<table>.tbl` files (default: dataset dir)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// List the query numbers implemented for a library
    List { library: String },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level)?;

    let settings = Settings::load(&args.config)
        .map_err(|e| anyhow::anyhow!("Failed to load settings: {}", e))?;

    match &args.command {
        Commands::RunAll { library, template } => {
            check_library(library)?;
            run_all(&args, &settings, library, *template)
        }
        Commands::Query {
            library,
            query_number,
            template,
        } => {
            check_library(library)?;
            let source = if *template {
                QuerySource::Template
            } else {
                QuerySource::Files
            };
            tpch_exasol::run_query(&settings, *query_number, source)?;
            Ok(())
        }
        Commands::Load { library, data_dir } => {
            check_library(library)?;
            let data_dir = data_dir
                .clone()
                .unwrap_or_else(|| settings.dataset_base_dir());
            tpch_exasol::load_data(&settings, &data_dir)?;
            Ok(())
        }
        Commands::List { library } => {
            check_library(library)?;
            for number in query_numbers(&settings.paths.queries.join(library))? {
                println!("{}", number);
            }
            Ok(())
        }
    }
}

/// Initialize logging
fn init_logging(log_level: &str) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn check_library(library: &str) -> anyhow::Result<()> {
    if library != LIBRARY_NAME {
        anyhow::bail!("Unsupported library '{}', expected '{}'", library, LIBRARY_NAME);
    }
    Ok(())
}

/// Re-invoke this binary once per query and suite iteration
fn run_all(args: &Args, settings: &Settings, library: &str, template: bool) -> anyhow::Result<()> {
    let version = VersionInfo::new();
    info!("Version: {}", version.version);
    info!("Git Commit: {}", version.git_commit);
    info!("Build Time: {}", version.build_time);
    info!("Rust Version: {}", version.rust_version);

    let exe = std::env::current_exe()?;
    let summary = execute_all(settings, library, |query_number| {
        let mut command = Command::new(&exe);
        command
            .arg("--config")
            .arg(&args.config)
            .arg("--log-level")
            .arg(&args.log_level)
            .arg("query")
            .arg(library)
            .arg(query_number.to_string());
        if template {
            command.arg("--template");
        }
        command
    })?;

    if !summary.failures.is_empty() {
        for (suite_iteration, query_number) in &summary.failures {
            warn!("Failed: suite {} query {}", suite_iteration, query_number);
        }
        anyhow::bail!(
            "{} of {} query runs failed",
            summary.failures.len(),
            summary.runs
        );
    }

    info!("All {} query runs succeeded", summary.runs);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_query_with_global_flags() {
        let args = Args::try_parse_from([
            "tpch", "query", "exasol", "4", "--template", "--config", "bench.toml",
        ])
        .unwrap();

        assert_eq!(args.config, PathBuf::from("bench.toml"));
        assert_eq!(args.log_level, "info");
        match args.command {
            Commands::Query {
                library,
                query_number,
                template,
            } => {
                assert_eq!(library, "exasol");
                assert_eq!(query_number, 4);
                assert!(template);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_load_defaults() {
        let args = Args::try_parse_from(["tpch", "load", "exasol"]).unwrap();
        assert_eq!(args.config, PathBuf::from(DEFAULT_SETTINGS_FILE));
        assert!(matches!(args.command, Commands::Load { data_dir: None, .. }));
    }

    #[test]
    fn test_unknown_library_rejected() {
        assert!(check_library("exasol").is_ok());
        assert!(check_library("duckdb").is_err());
    }
}
