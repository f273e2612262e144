// Copyright 2025 Apache Doris Community
// Licensed under the Apache License, Version 2.0

//! Bundled TPC-H query template
//!
//! The template holds all 22 query bodies. Each body follows a delimiter
//! comment such as `/* TPC-H Query 4 0 */`, then optional `--` preamble
//! lines and blank lines; the body runs up to the first line ending in `;`.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::debug;

use tpch_common::{BenchError, Result};

/// Template shipped with the crate
pub const BUNDLED_TEMPLATE: &str = include_str!("../sql/tpch_queries.sql");

lazy_static! {
    static ref QUERY_MARKER: Regex =
        Regex::new(r"\*\s*TPC-H Query (\d+) 0\s*\*").expect("valid marker pattern");
    static ref BUNDLED_QUERIES: BTreeMap<u32, String> = parse_template(BUNDLED_TEMPLATE);
}

/// Split a template into query bodies keyed by query number.
///
/// A block that reaches the next marker (or the end of the text) without a
/// line ending in `;` is dropped.
pub fn parse_template(text: &str) -> BTreeMap<u32, String> {
    let mut queries = BTreeMap::new();
    let mut current: Option<(u32, Vec<&str>)> = None;

    for line in text.lines() {
        if let Some(number) = marker_number(line) {
            if let Some((unterminated, _)) = current.take() {
                debug!("Template query {} has no terminating ';', skipped", unterminated);
            }
            current = Some((number, Vec::new()));
            continue;
        }

        let Some((number, body)) = current.as_mut() else {
            continue;
        };
        let trimmed = line.trim();
        if body.is_empty() && (trimmed.is_empty() || is_preamble(trimmed)) {
            continue;
        }
        body.push(line);
        if trimmed.ends_with(';') {
            queries.insert(*number, body.join("\n"));
            current = None;
        }
    }

    if let Some((unterminated, _)) = current {
        debug!("Template query {} has no terminating ';', skipped", unterminated);
    }
    queries
}

fn marker_number(line: &str) -> Option<u32> {
    QUERY_MARKER
        .captures(line)
        .and_then(|c| c[1].parse::<u32>().ok())
}

/// Delimiter banner lines and `--` comments before a body
fn is_preamble(trimmed: &str) -> bool {
    trimmed.starts_with("--") || (trimmed.starts_with("/*") && trimmed.ends_with("*/"))
}

/// Every query of the bundled template, parsed on first use
pub fn bundled_queries() -> &'static BTreeMap<u32, String> {
    &BUNDLED_QUERIES
}

/// Body of one bundled query, placeholders unresolved
pub fn bundled_query(query_number: u32) -> Result<&'static str> {
    BUNDLED_QUERIES
        .get(&query_number)
        .map(String::as_str)
        .ok_or(BenchError::QueryNotFound(query_number))
}
