//! Table catalogue and typed cell values
//!
//! Every persisted table is described here once: its name, the ordered list
//! of loaded columns, and the derived aggregate column (if any). The SQL
//! generator, the in-memory store and the deduplicator all read from this
//! catalogue so the column order can never drift between them.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Free text, null when blank
    Text,
    /// Calendar date (`YYYY-MM-DD`)
    Date,
    /// Exact decimal (monetary amounts)
    Decimal,
    /// 64-bit integer
    Integer,
}

impl ColumnKind {
    /// PostgreSQL type used for this column
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnKind::Text => "TEXT",
            ColumnKind::Date => "DATE",
            ColumnKind::Decimal => "NUMERIC",
            ColumnKind::Integer => "BIGINT",
        }
    }
}

/// A loaded column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Column name in the store
    pub name: &'static str,
    /// Storage type
    pub kind: ColumnKind,
}

const fn text(name: &'static str) -> Column {
    Column {
        name,
        kind: ColumnKind::Text,
    }
}

const fn date(name: &'static str) -> Column {
    Column {
        name,
        kind: ColumnKind::Date,
    }
}

const fn decimal(name: &'static str) -> Column {
    Column {
        name,
        kind: ColumnKind::Decimal,
    }
}

const fn integer(name: &'static str) -> Column {
    Column {
        name,
        kind: ColumnKind::Integer,
    }
}

const PRODUCT_COLUMNS: &[Column] = &[
    text("appl_no"),
    text("appl_type"),
    text("ingredient"),
    text("dosage"),
    text("form"),
    text("route"),
    text("trade_name"),
    text("applicant"),
    text("strength"),
    text("te_code"),
    date("approval_date"),
    text("rld"),
    text("rs"),
    text("type"),
    text("applicant_full_name"),
];

const EXCLUSIVITY_COLUMNS: &[Column] = &[
    text("appl_no"),
    text("appl_type"),
    text("ingredient"),
    text("dosage"),
    text("form"),
    text("route"),
    text("trade_name"),
    text("strength"),
    text("exclusivity_code"),
    date("exclusivity_date"),
];

const PATENT_COLUMNS: &[Column] = &[
    text("appl_no"),
    text("appl_type"),
    text("ingredient"),
    text("dosage"),
    text("form"),
    text("route"),
    text("trade_name"),
    text("applicant"),
    text("strength"),
    text("patent_no"),
    text("patent_expire_date_text"),
    text("drug_substance_flag"),
    text("drug_product_flag"),
    text("patent_use_code"),
    date("submission_date"),
];

const SALES_COLUMNS: &[Column] = &[
    text("appl_no"),
    text("ingredient"),
    text("route"),
    text("route_extended"),
    text("dosage"),
    text("manufacturer"),
    text("strength"),
    integer("pack_quantity"),
    text("ndc_number"),
    text("labeler_code"),
    text("product_code"),
    decimal("sales"),
    integer("packs"),
    integer("quantity"),
    decimal("wac"),
    decimal("price"),
];

/// The four persisted tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Table {
    /// Approved products
    Products,
    /// Market-exclusivity grants
    Exclusivity,
    /// Patent listings
    Patents,
    /// Retail sales volumes
    Sales,
}

impl Table {
    /// All tables in load order
    pub const ALL: [Table; 4] = [
        Table::Products,
        Table::Exclusivity,
        Table::Patents,
        Table::Sales,
    ];

    /// Tables derived from approval data; these are deduplicated
    pub const APPROVAL_DERIVED: [Table; 3] = [Table::Products, Table::Exclusivity, Table::Patents];

    /// Name of the table in the store
    pub fn name(&self) -> &'static str {
        match self {
            Table::Products => "products",
            Table::Exclusivity => "exclusivity",
            Table::Patents => "patent",
            Table::Sales => "sales",
        }
    }

    /// Loaded columns, in insert order
    pub fn columns(&self) -> &'static [Column] {
        match self {
            Table::Products => PRODUCT_COLUMNS,
            Table::Exclusivity => EXCLUSIVITY_COLUMNS,
            Table::Patents => PATENT_COLUMNS,
            Table::Sales => SALES_COLUMNS,
        }
    }

    /// Derived aggregate column written by the aggregate populator
    pub fn derived_column(&self) -> Option<&'static str> {
        match self {
            Table::Products => Some("approval_count"),
            Table::Sales => Some("seller_count"),
            Table::Exclusivity | Table::Patents => None,
        }
    }

    /// Position of a loaded column
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns().iter().position(|c| c.name == name)
    }

    /// Whether the deduplicator runs over this table
    pub fn is_deduplicated(&self) -> bool {
        !matches!(self, Table::Sales)
    }

    /// Columns that make up a row's duplicate identity: every loaded
    /// column plus the derived aggregate column.
    pub fn business_columns(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.columns().iter().map(|c| c.name).collect();
        if let Some(derived) = self.derived_column() {
            names.push(derived);
        }
        names
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single typed, nullable cell
///
/// `None` is SQL `NULL`. Equality and hashing treat two nulls of the same
/// kind as equal, which is the null-safe comparison duplicate detection
/// needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellValue {
    /// Text cell
    Text(Option<String>),
    /// Date cell
    Date(Option<NaiveDate>),
    /// Decimal cell
    Decimal(Option<Decimal>),
    /// Integer cell
    Integer(Option<i64>),
}

impl CellValue {
    /// Whether the cell is null
    pub fn is_null(&self) -> bool {
        match self {
            CellValue::Text(v) => v.is_none(),
            CellValue::Date(v) => v.is_none(),
            CellValue::Decimal(v) => v.is_none(),
            CellValue::Integer(v) => v.is_none(),
        }
    }

    /// Text content, if this is a non-null text cell
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(Some(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Kind of the cell
    pub fn kind(&self) -> ColumnKind {
        match self {
            CellValue::Text(_) => ColumnKind::Text,
            CellValue::Date(_) => ColumnKind::Date,
            CellValue::Decimal(_) => ColumnKind::Decimal,
            CellValue::Integer(_) => ColumnKind::Integer,
        }
    }
}

/// One normalized row, ordered as [`Table::columns`]
pub type RowValues = Vec<CellValue>;
