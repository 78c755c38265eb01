//! SQL generated from the table catalogue

use crate::core::aggregate::AggregateSpec;
use crate::core::dedupe::DedupePlan;
use crate::domain::{CellValue, Table};
use tokio_postgres::types::ToSql;

/// Bind parameters PostgreSQL accepts in one statement
pub const MAX_BIND_PARAMETERS: usize = 65_535;

/// Quotes an identifier
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn column_list(columns: impl IntoIterator<Item = &'static str>, prefix: &str) -> String {
    columns
        .into_iter()
        .map(|c| format!("{prefix}{}", quote_ident(c)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Rows that fit into one multi-row INSERT
pub fn rows_per_statement(table: Table) -> usize {
    (MAX_BIND_PARAMETERS / table.columns().len()).max(1)
}

/// Multi-row parameterized INSERT for `row_count` rows
pub fn insert_statement(table: Table, row_count: usize) -> String {
    let width = table.columns().len();
    let columns = column_list(table.columns().iter().map(|c| c.name), "");

    let mut sql = format!("INSERT INTO {} ({columns}) VALUES ", quote_ident(table.name()));
    for row in 0..row_count {
        if row > 0 {
            sql.push_str(", ");
        }
        sql.push('(');
        for col in 0..width {
            if col > 0 {
                sql.push_str(", ");
            }
            sql.push('$');
            sql.push_str(&(row * width + col + 1).to_string());
        }
        sql.push(')');
    }
    sql
}

/// Bind parameter for one cell; nulls bind as typed `NULL`
pub fn cell_param(cell: &CellValue) -> &(dyn ToSql + Sync) {
    match cell {
        CellValue::Text(v) => v,
        CellValue::Date(v) => v,
        CellValue::Decimal(v) => v,
        CellValue::Integer(v) => v,
    }
}

/// Clears the derived column before a pass
pub fn reset_aggregate(spec: &AggregateSpec) -> String {
    format!(
        "UPDATE {} SET {} = NULL",
        quote_ident(spec.table.name()),
        quote_ident(spec.target_column)
    )
}

/// Writes the grouped distinct counts back with plain equality, so rows
/// with a null grouping column keep a null count
pub fn populate_aggregate(spec: &AggregateSpec) -> String {
    let table = quote_ident(spec.table.name());
    let [first, second] = spec.group_columns.map(quote_ident);
    let counted = quote_ident(spec.counted_column);
    let filter = if spec.require_non_null_groups {
        format!(" WHERE {first} IS NOT NULL AND {second} IS NOT NULL")
    } else {
        String::new()
    };

    format!(
        "UPDATE {table} AS t SET {target} = g.n \
         FROM (SELECT {first}, {second}, COUNT(DISTINCT {counted}) AS n \
         FROM {table}{filter} GROUP BY {first}, {second}) AS g \
         WHERE t.{first} = g.{first} AND t.{second} = g.{second}",
        target = quote_ident(spec.target_column),
    )
}

/// Counts rows with a non-null derived value
pub fn count_populated(spec: &AggregateSpec) -> String {
    format!(
        "SELECT COUNT(*) FROM {} WHERE {} IS NOT NULL",
        quote_ident(spec.table.name()),
        quote_ident(spec.target_column)
    )
}

/// Deletes every row but the lowest id of each identity tuple.
/// `PARTITION BY` puts nulls in the same partition, which is the null-safe
/// comparison the identity needs.
pub fn remove_duplicates(plan: &DedupePlan) -> String {
    let table = quote_ident(plan.table.name());
    let partition = column_list(plan.columns.iter().copied(), "");
    format!(
        "DELETE FROM {table} WHERE id IN (\
         SELECT id FROM (\
         SELECT id, ROW_NUMBER() OVER (PARTITION BY {partition} ORDER BY id) AS rn \
         FROM {table}) AS ranked \
         WHERE ranked.rn > 1)"
    )
}

/// Counts rows of a table
pub fn count_rows(table: Table) -> String {
    format!("SELECT COUNT(*) FROM {}", quote_ident(table.name()))
}

/// Counts sales rows with a linking identifier
pub fn count_linked_sales() -> String {
    format!(
        "SELECT COUNT(*) FROM {} WHERE {} IS NOT NULL",
        quote_ident(Table::Sales.name()),
        quote_ident("appl_no")
    )
}
