// Copyright 2025 Apache Doris Community
// Licensed under the Apache License, Version 2.0

//! Benchmark settings
//!
//! Settings are resolved once per process in three layers:
//! 1. built-in defaults
//! 2. an optional TOML file (`tpch.toml` by default)
//! 3. environment variables (`SCALE_FACTOR`, `RUN_*`, `PATH_*`, `EXASOL_*`)
//!
//! and are read-only afterwards.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

use crate::constants::{DEFAULT_EXASOL_PORT, DEFAULT_EXASOL_SCHEMA, DEFAULT_FETCH_SIZE};
use crate::error::{BenchError, Result};
use crate::types::{IoType, TpchTable};
use crate::utils::{format_scale_factor, parse_bool, parse_size};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// TPC-H scale factor of the dataset under test
    pub scale_factor: f64,

    pub run: RunSettings,

    pub paths: PathSettings,

    pub exasol: ExasolSettings,
}

/// Run mode
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    pub io_type: IoType,

    /// Timed executions per query process
    pub iterations: u32,

    /// Passes of the suite driver over all queries
    pub suite_iterations: u32,

    /// Current suite pass (1-based), set by the suite driver for its children
    pub suite_iteration: u32,

    pub log_timings: bool,

    pub show_results: bool,

    pub check_results: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    pub answers: PathBuf,
    pub tables: PathBuf,
    pub timings: PathBuf,
    pub timings_filename: String,
    /// Root of the per-library query directories (`<queries>/<library>/q<N>.sql`)
    pub queries: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExasolSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub schema: String,
    /// Use `wss://` instead of `ws://`
    pub encryption: bool,
    pub validate_certificate: bool,
    /// Bytes requested per result set fetch
    pub fetch_size: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scale_factor: 1.0,
            run: RunSettings::default(),
            paths: PathSettings::default(),
            exasol: ExasolSettings::default(),
        }
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            io_type: IoType::Parquet,
            iterations: 1,
            suite_iterations: 1,
            suite_iteration: 1,
            log_timings: false,
            show_results: false,
            check_results: false,
        }
    }
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            answers: PathBuf::from("data/answers"),
            tables: PathBuf::from("data/tables"),
            timings: PathBuf::from("output/run"),
            timings_filename: "timings.csv".to_string(),
            queries: PathBuf::from("queries"),
        }
    }
}

impl Default for ExasolSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_EXASOL_PORT,
            user: "sys".to_string(),
            password: "exasol".to_string(),
            schema: DEFAULT_EXASOL_SCHEMA.to_string(),
            encryption: true,
            validate_certificate: false,
            fetch_size: DEFAULT_FETCH_SIZE,
        }
    }
}

impl RunSettings {
    /// Whether reading the input tables is part of the timed section
    pub fn include_io(&self) -> bool {
        self.io_type != IoType::Skip
    }
}

impl PathSettings {
    pub fn timings_file(&self) -> PathBuf {
        self.timings.join(&self.timings_filename)
    }
}

impl ExasolSettings {
    pub fn dsn(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Settings {
    /// Load settings: file (if present), then environment, then validate
    pub fn load(path: &Path) -> Result<Self> {
        let mut settings = if path.exists() {
            debug!("Loading settings from {:?}", path);
            Self::from_file(path)?
        } else {
            debug!("Settings file {:?} not found, using defaults", path);
            Self::default()
        };

        settings.apply_env_overrides(|key| std::env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| BenchError::Config(format!("invalid settings file {:?}: {}", path, e)))
    }

    /// Apply overrides from an environment-like lookup
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        override_parsed(&lookup, "SCALE_FACTOR", &mut self.scale_factor)?;

        override_parsed(&lookup, "RUN_IO_TYPE", &mut self.run.io_type)?;
        override_parsed(&lookup, "RUN_ITERATIONS", &mut self.run.iterations)?;
        override_parsed(&lookup, "RUN_SUITE_ITERATIONS", &mut self.run.suite_iterations)?;
        override_parsed(&lookup, "RUN_SUITE_ITERATION", &mut self.run.suite_iteration)?;
        override_bool(&lookup, "RUN_LOG_TIMINGS", &mut self.run.log_timings)?;
        override_bool(&lookup, "RUN_SHOW_RESULTS", &mut self.run.show_results)?;
        override_bool(&lookup, "RUN_CHECK_RESULTS", &mut self.run.check_results)?;

        override_parsed(&lookup, "PATH_ANSWERS", &mut self.paths.answers)?;
        override_parsed(&lookup, "PATH_TABLES", &mut self.paths.tables)?;
        override_parsed(&lookup, "PATH_TIMINGS", &mut self.paths.timings)?;
        override_parsed(&lookup, "PATH_TIMINGS_FILENAME", &mut self.paths.timings_filename)?;
        override_parsed(&lookup, "PATH_QUERIES", &mut self.paths.queries)?;

        override_parsed(&lookup, "EXASOL_HOST", &mut self.exasol.host)?;
        override_parsed(&lookup, "EXASOL_PORT", &mut self.exasol.port)?;
        override_parsed(&lookup, "EXASOL_USER", &mut self.exasol.user)?;
        override_parsed(&lookup, "EXASOL_PASSWORD", &mut self.exasol.password)?;
        override_parsed(&lookup, "EXASOL_SCHEMA", &mut self.exasol.schema)?;
        override_bool(&lookup, "EXASOL_ENCRYPTION", &mut self.exasol.encryption)?;
        override_bool(&lookup, "EXASOL_VALIDATE_CERTIFICATE", &mut self.exasol.validate_certificate)?;

        if let Some(size) = lookup("EXASOL_FETCH_SIZE") {
            self.exasol.fetch_size = parse_size(&size)
                .map_err(|e| BenchError::Config(format!("EXASOL_FETCH_SIZE: {}", e)))?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.scale_factor > 0.0) || !self.scale_factor.is_finite() {
            return Err(BenchError::Config(format!(
                "scale_factor must be a positive number, got {}",
                self.scale_factor
            )));
        }
        if self.run.iterations == 0 {
            return Err(BenchError::Config("run.iterations cannot be 0".to_string()));
        }
        if self.run.suite_iterations == 0 {
            return Err(BenchError::Config("run.suite_iterations cannot be 0".to_string()));
        }
        if self.run.suite_iteration == 0 || self.run.suite_iteration > self.run.suite_iterations {
            warn!(
                "suite_iteration {} outside 1..={}",
                self.run.suite_iteration, self.run.suite_iterations
            );
        }
        if self.exasol.port == 0 {
            return Err(BenchError::Config("exasol.port cannot be 0".to_string()));
        }
        if self.paths.timings_filename.is_empty() {
            return Err(BenchError::Config("paths.timings_filename cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Directory holding the generated tables for the configured scale factor
    pub fn dataset_base_dir(&self) -> PathBuf {
        self.paths
            .tables
            .join(format!("scale-{}", format_scale_factor(self.scale_factor)))
    }

    /// Path of one input table. When I/O is excluded from timing the
    /// tables are always read from Parquet.
    pub fn table_path(&self, table: TpchTable) -> PathBuf {
        let ext = if self.run.include_io() {
            self.run.io_type.as_str()
        } else {
            "parquet"
        };
        self.dataset_base_dir().join(format!("{}.{}", table.name(), ext))
    }

    /// JSON dump including derived fields, logged by the suite driver
    pub fn to_json(&self) -> Result<String> {
        let mut value = serde_json::to_value(self)?;
        if let Some(object) = value.as_object_mut() {
            object.insert(
                "dataset_base_dir".to_string(),
                serde_json::Value::String(self.dataset_base_dir().display().to_string()),
            );
        }
        if let Some(run) = value.get_mut("run").and_then(|run| run.as_object_mut()) {
            run.insert("include_io".to_string(), serde_json::Value::Bool(self.run.include_io()));
        }
        Ok(serde_json::to_string(&value)?)
    }
}

fn override_parsed<F, T>(lookup: &F, key: &str, target: &mut T) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    if let Some(raw) = lookup(key) {
        *target = raw
            .trim()
            .parse()
            .map_err(|e: T::Err| BenchError::Config(format!("{}={:?}: {}", key, raw, e)))?;
    }
    Ok(())
}

fn override_bool<F>(lookup: &F, key: &str, target: &mut bool) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(key) {
        *target = parse_bool(&raw).map_err(|e| BenchError::Config(format!("{}: {}", key, e)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.scale_factor, 1.0);
        assert_eq!(settings.run.iterations, 1);
        assert!(settings.run.include_io());
        assert_eq!(settings.paths.timings_file(), PathBuf::from("output/run/timings.csv"));
        assert_eq!(settings.exasol.dsn(), "127.0.0.1:8563");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let vars = env(&[
            ("SCALE_FACTOR", "0.1"),
            ("RUN_ITERATIONS", "3"),
            ("RUN_LOG_TIMINGS", "1"),
            ("RUN_IO_TYPE", "skip"),
            ("RUN_SUITE_ITERATION", "2"),
            ("RUN_SUITE_ITERATIONS", "4"),
            ("EXASOL_SCHEMA", "tpch_sf1"),
            ("EXASOL_FETCH_SIZE", "1MB"),
        ]);
        let mut settings = Settings::default();
        settings
            .apply_env_overrides(|key| vars.get(key).cloned())
            .unwrap();

        assert_eq!(settings.scale_factor, 0.1);
        assert_eq!(settings.run.iterations, 3);
        assert!(settings.run.log_timings);
        assert!(!settings.run.include_io());
        assert_eq!(settings.run.suite_iteration, 2);
        assert_eq!(settings.run.suite_iterations, 4);
        assert_eq!(settings.exasol.schema, "tpch_sf1");
        assert_eq!(settings.exasol.fetch_size, 1024 * 1024);
    }

    #[test]
    fn test_bad_env_value_is_config_error() {
        let vars = env(&[("RUN_ITERATIONS", "many")]);
        let mut settings = Settings::default();
        let err = settings
            .apply_env_overrides(|key| vars.get(key).cloned())
            .unwrap_err();
        assert!(matches!(err, BenchError::Config(_)));
    }

    #[test]
    fn test_validate() {
        let mut settings = Settings::default();
        settings.scale_factor = 0.0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.run.iterations = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.exasol.port = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_dataset_paths() {
        let mut settings = Settings::default();
        assert_eq!(settings.dataset_base_dir(), PathBuf::from("data/tables/scale-1.0"));
        assert_eq!(
            settings.table_path(TpchTable::LineItem),
            PathBuf::from("data/tables/scale-1.0/lineitem.parquet")
        );

        settings.run.io_type = IoType::Csv;
        settings.scale_factor = 0.01;
        assert_eq!(
            settings.table_path(TpchTable::Orders),
            PathBuf::from("data/tables/scale-0.01/orders.csv")
        );

        settings.run.io_type = IoType::Skip;
        assert_eq!(
            settings.table_path(TpchTable::Orders),
            PathBuf::from("data/tables/scale-0.01/orders.parquet")
        );
    }

    #[test]
    fn test_json_dump_has_derived_fields_and_no_password() {
        let json = Settings::default().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["dataset_base_dir"], "data/tables/scale-1.0");
        assert_eq!(value["run"]["include_io"], true);
        assert!(value["exasol"].get("password").is_none());
    }
}
