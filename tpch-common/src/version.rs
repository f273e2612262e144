// Copyright 2025 Apache Doris Community
// Licensed under the Apache License, Version 2.0

//! Build and version stamps of the runner
//!
//! `run-all` logs these before spawning query processes so a timing log
//! can be traced back to the binary that produced it. The git commit and
//! build time are injected by `build.rs`.

use serde::{Deserialize, Serialize};

/// Harness version, recorded in the timing log when an adapter gives none
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_COMMIT: &str = env!("TPCH_GIT_SHA");
pub const BUILD_TIME: &str = env!("TPCH_BUILD_TIMESTAMP");

/// Everything the `run-all` banner prints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub git_commit: String,
    pub build_time: String,
    pub rust_version: String,
}

impl VersionInfo {
    pub fn new() -> Self {
        Self {
            version: VERSION.to_string(),
            git_commit: GIT_COMMIT.to_string(),
            build_time: BUILD_TIME.to_string(),
            rust_version: rustc_version_runtime::version().to_string(),
        }
    }
}

impl Default for VersionInfo {
    fn default() -> Self {
        Self::new()
    }
}
