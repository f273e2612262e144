// Copyright 2025 Apache Doris Community
// Licensed under the Apache License, Version 2.0

//! TPC-H table names and query placeholders

use tpch_common::TpchTable;

/// Physical table name, schema-qualified when a schema is given
pub fn table_name(table: TpchTable, schema: Option<&str>) -> String {
    match schema {
        Some(schema) => format!("{}.{}", schema, table.name()),
        None => table.name().to_string(),
    }
}

/// Placeholder token used in query bodies, e.g. `{lineitem}`
pub fn placeholder(table: TpchTable) -> String {
    format!("{{{}}}", table.name())
}

/// Replace every table placeholder in `sql`
pub fn render(sql: &str, schema: Option<&str>) -> String {
    let mut rendered = sql.to_string();
    for table in TpchTable::ALL {
        rendered = rendered.replace(&placeholder(table), &table_name(table, schema));
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_name() {
        assert_eq!(table_name(TpchTable::LineItem, None), "lineitem");
        assert_eq!(table_name(TpchTable::PartSupp, Some("tpc")), "tpc.partsupp");
    }

    #[test]
    fn test_render_qualified_and_plain() {
        let sql = "select * from {orders}, {lineitem} where o_orderkey = l_orderkey";
        assert_eq!(
            render(sql, Some("tpc")),
            "select * from tpc.orders, tpc.lineitem where o_orderkey = l_orderkey"
        );
        assert_eq!(
            render(sql, None),
            "select * from orders, lineitem where o_orderkey = l_orderkey"
        );
    }

    #[test]
    fn test_render_leaves_other_braces() {
        assert_eq!(render("select '{x}' from {nation}", None), "select '{x}' from nation");
    }
}
