// Copyright 2025 Apache Doris Community
// Licensed under the Apache License, Version 2.0

//! Wall-clock timers and the append-only timing log

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

use tpch_common::constants::TIMINGS_HEADER;
use tpch_common::utils::format_scale_factor;
use tpch_common::{IoType, Result, Settings};

/// Times a named block of code and logs the elapsed seconds when stopped
#[derive(Debug)]
pub struct CodeTimer {
    name: String,
    start: Instant,
}

impl CodeTimer {
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: Instant::now(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stop the timer, returning the elapsed time in seconds
    pub fn stop(self) -> f64 {
        let took = self.start.elapsed().as_secs_f64();
        info!("Code block '{}' took: {:.5} s", self.name, took);
        took
    }
}

/// One line of the timing log
#[derive(Debug, Clone, PartialEq)]
pub struct TimingRecord {
    pub solution: String,
    pub version: String,
    pub query_number: u32,
    pub duration_s: f64,
    pub io_type: IoType,
    pub scale_factor: f64,
}

impl TimingRecord {
    pub fn to_csv_line(&self) -> String {
        [
            self.solution.clone(),
            self.version.clone(),
            self.query_number.to_string(),
            self.duration_s.to_string(),
            self.io_type.to_string(),
            format_scale_factor(self.scale_factor),
        ]
        .join(",")
    }
}

/// Append-only CSV log of query timings
#[derive(Debug, Clone)]
pub struct TimingLog {
    path: PathBuf,
}

impl TimingLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.paths.timings_file())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a record, creating the file (and its directory) with a
    /// header row when it is empty
    pub fn append(&self, record: &TimingRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        if file.metadata()?.len() == 0 {
            writeln!(file, "{}", TIMINGS_HEADER)?;
        }
        writeln!(file, "{}", record.to_csv_line())?;

        debug!("Logged timing for query {} to {:?}", record.query_number, self.path);
        Ok(())
    }
}

/// Append a timing record using the run's I/O type and scale factor
pub fn log_query_timing(
    settings: &Settings,
    solution: &str,
    version: &str,
    query_number: u32,
    duration_s: f64,
) -> Result<()> {
    let record = TimingRecord {
        solution: solution.to_string(),
        version: version.to_string(),
        query_number,
        duration_s,
        io_type: settings.run.io_type,
        scale_factor: settings.scale_factor,
    };
    TimingLog::from_settings(settings).append(&record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_line() {
        let record = TimingRecord {
            solution: "exasol".to_string(),
            version: "0.1.0".to_string(),
            query_number: 4,
            duration_s: 0.25,
            io_type: IoType::Parquet,
            scale_factor: 1.0,
        };
        assert_eq!(record.to_csv_line(), "exasol,0.1.0,4,0.25,parquet,1.0");
    }

    #[test]
    fn test_timer_measures_elapsed() {
        let timer = CodeTimer::start("sleep");
        assert_eq!(timer.name(), "sleep");
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(timer.stop() >= 0.005);
    }
}
