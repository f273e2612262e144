// Copyright 2025 Apache Doris Community
// Licensed under the Apache License, Version 2.0

//! Exasol adapter for the TPC-H benchmark runner
//!
//! Talks to Exasol over its JSON-over-WebSocket protocol, resolves TPC-H
//! table names, renders the query bodies (bundled template or per-query
//! files) and bulk loads dbgen output through the HTTP transport tunnel.

pub mod protocol;
pub mod connection;
pub mod transport;
pub mod tables;
pub mod template;
pub mod adapter;
pub mod loader;

// Scripted connection for tests without a running database
pub mod mock;

pub use connection::{ExaConnection, SqlConnection};
pub use adapter::{run_query, QuerySource, CLIENT_VERSION, LIBRARY_NAME};
pub use loader::load_data;
pub use mock::MockConnection;
