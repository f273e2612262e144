// Copyright 2025 Apache Doris Community
// Licensed under the Apache License, Version 2.0

//! Common type definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How table data is read by dataframe-style solutions.
///
/// `Skip` means I/O is excluded from timing: tables are read from
/// Parquet once, before the timed section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IoType {
    Skip,
    #[default]
    Parquet,
    Feather,
    Csv,
}

impl IoType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IoType::Skip => "skip",
            IoType::Parquet => "parquet",
            IoType::Feather => "feather",
            IoType::Csv => "csv",
        }
    }
}

impl fmt::Display for IoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IoType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(IoType::Skip),
            "parquet" => Ok(IoType::Parquet),
            "feather" => Ok(IoType::Feather),
            "csv" => Ok(IoType::Csv),
            other => Err(format!("unknown io type '{}'", other)),
        }
    }
}

/// The eight TPC-H tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TpchTable {
    Nation,
    Region,
    Part,
    Supplier,
    PartSupp,
    Customer,
    Orders,
    LineItem,
}

impl TpchTable {
    /// All tables, in load order (dimensions before facts)
    pub const ALL: [TpchTable; 8] = [
        TpchTable::Nation,
        TpchTable::Region,
        TpchTable::Part,
        TpchTable::Supplier,
        TpchTable::PartSupp,
        TpchTable::Customer,
        TpchTable::Orders,
        TpchTable::LineItem,
    ];

    /// Logical (and physical) table name
    pub fn name(&self) -> &'static str {
        match self {
            TpchTable::Nation => "nation",
            TpchTable::Region => "region",
            TpchTable::Part => "part",
            TpchTable::Supplier => "supplier",
            TpchTable::PartSupp => "partsupp",
            TpchTable::Customer => "customer",
            TpchTable::Orders => "orders",
            TpchTable::LineItem => "lineitem",
        }
    }
}

impl fmt::Display for TpchTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TpchTable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        TpchTable::ALL
            .iter()
            .copied()
            .find(|table| table.name() == lowered)
            .ok_or_else(|| format!("unknown TPC-H table '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_type_parse() {
        assert_eq!("skip".parse::<IoType>().unwrap(), IoType::Skip);
        assert_eq!(" CSV ".parse::<IoType>().unwrap(), IoType::Csv);
        assert!("orc".parse::<IoType>().is_err());
        assert_eq!(IoType::default(), IoType::Parquet);
    }

    #[test]
    fn test_table_names_round_trip() {
        for table in TpchTable::ALL {
            assert_eq!(table.name().parse::<TpchTable>().unwrap(), table);
        }
        assert_eq!("LINEITEM".parse::<TpchTable>().unwrap(), TpchTable::LineItem);
        assert!("lineitems".parse::<TpchTable>().is_err());
    }
}
