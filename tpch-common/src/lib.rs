// Copyright 2025 Apache Doris Community
// Licensed under the Apache License, Version 2.0

//! Common foundations for the TPC-H benchmark runner
//!
//! This crate provides:
//! - Error types and result handling
//! - Settings (file + environment configuration)
//! - TPC-H table and I/O type definitions
//! - Utility functions
//! - Constants

pub mod error;
pub mod config;
pub mod types;
pub mod utils;
pub mod constants;
pub mod version;

pub use error::{BenchError, Result};
pub use config::{ExasolSettings, PathSettings, RunSettings, Settings};
pub use types::{IoType, TpchTable};
