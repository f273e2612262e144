// Copyright 2025 Apache Doris Community
// Licensed under the Apache License, Version 2.0

//! Error types for the benchmark runner

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BenchError {
    /// The run was configured in a way that cannot work, e.g. checking
    /// results without a checker.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A runtime precondition does not hold, e.g. checking at a scale
    /// factor for which no answers exist.
    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Result mismatch for query {query_number}: {message}")]
    ResultMismatch { query_number: u32, message: String },

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Query {0} not found")]
    QueryNotFound(u32),

    #[error("Answer error: {0}")]
    Answer(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for BenchError {
    fn from(err: serde_json::Error) -> Self {
        BenchError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BenchError>;
