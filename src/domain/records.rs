//! Normalized record types, one per persisted table
//!
//! Records are produced by the row mappers in [`crate::core::load`] and turned
//! into [`RowValues`] (ordered as [`Table::columns`]) just before batching.

use super::tables::{CellValue, RowValues, Table};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A record that can be written to one of the persisted tables
pub trait TableRecord {
    /// Target table
    const TABLE: Table;

    /// Converts the record into cells ordered as `Self::TABLE.columns()`
    fn into_values(self) -> RowValues;

    /// Application number linked through the cross-reference, for records
    /// that are linked rather than carrying their own.
    fn linking_identifier(&self) -> Option<&str> {
        None
    }
}

/// Approval record (`products`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub appl_no: Option<String>,
    pub appl_type: Option<String>,
    pub ingredient: Option<String>,
    pub dosage: Option<String>,
    pub form: Option<String>,
    pub route: Option<String>,
    pub trade_name: Option<String>,
    pub applicant: Option<String>,
    pub strength: Option<String>,
    pub te_code: Option<String>,
    /// Null for unapproved/pending products
    pub approval_date: Option<NaiveDate>,
    pub rld: Option<String>,
    pub rs: Option<String>,
    pub product_type: Option<String>,
    pub applicant_full_name: Option<String>,
}

impl TableRecord for ProductRecord {
    const TABLE: Table = Table::Products;

    fn into_values(self) -> RowValues {
        vec![
            CellValue::Text(self.appl_no),
            CellValue::Text(self.appl_type),
            CellValue::Text(self.ingredient),
            CellValue::Text(self.dosage),
            CellValue::Text(self.form),
            CellValue::Text(self.route),
            CellValue::Text(self.trade_name),
            CellValue::Text(self.applicant),
            CellValue::Text(self.strength),
            CellValue::Text(self.te_code),
            CellValue::Date(self.approval_date),
            CellValue::Text(self.rld),
            CellValue::Text(self.rs),
            CellValue::Text(self.product_type),
            CellValue::Text(self.applicant_full_name),
        ]
    }
}

/// Exclusivity record (`exclusivity`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusivityRecord {
    pub appl_no: Option<String>,
    pub appl_type: Option<String>,
    pub ingredient: Option<String>,
    pub dosage: Option<String>,
    pub form: Option<String>,
    pub route: Option<String>,
    pub trade_name: Option<String>,
    pub strength: Option<String>,
    pub exclusivity_code: Option<String>,
    pub exclusivity_date: Option<NaiveDate>,
}

impl TableRecord for ExclusivityRecord {
    const TABLE: Table = Table::Exclusivity;

    fn into_values(self) -> RowValues {
        vec![
            CellValue::Text(self.appl_no),
            CellValue::Text(self.appl_type),
            CellValue::Text(self.ingredient),
            CellValue::Text(self.dosage),
            CellValue::Text(self.form),
            CellValue::Text(self.route),
            CellValue::Text(self.trade_name),
            CellValue::Text(self.strength),
            CellValue::Text(self.exclusivity_code),
            CellValue::Date(self.exclusivity_date),
        ]
    }
}

/// Patent record (`patent`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatentRecord {
    pub appl_no: Option<String>,
    pub appl_type: Option<String>,
    pub ingredient: Option<String>,
    pub dosage: Option<String>,
    pub form: Option<String>,
    pub route: Option<String>,
    pub trade_name: Option<String>,
    pub applicant: Option<String>,
    pub strength: Option<String>,
    pub patent_no: Option<String>,
    /// Kept as text: the source sometimes annotates expiry dates
    pub patent_expire_date_text: Option<String>,
    pub drug_substance_flag: Option<String>,
    pub drug_product_flag: Option<String>,
    pub patent_use_code: Option<String>,
    pub submission_date: Option<NaiveDate>,
}

impl TableRecord for PatentRecord {
    const TABLE: Table = Table::Patents;

    fn into_values(self) -> RowValues {
        vec![
            CellValue::Text(self.appl_no),
            CellValue::Text(self.appl_type),
            CellValue::Text(self.ingredient),
            CellValue::Text(self.dosage),
            CellValue::Text(self.form),
            CellValue::Text(self.route),
            CellValue::Text(self.trade_name),
            CellValue::Text(self.applicant),
            CellValue::Text(self.strength),
            CellValue::Text(self.patent_no),
            CellValue::Text(self.patent_expire_date_text),
            CellValue::Text(self.drug_substance_flag),
            CellValue::Text(self.drug_product_flag),
            CellValue::Text(self.patent_use_code),
            CellValue::Date(self.submission_date),
        ]
    }
}

/// Sales record (`sales`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesRecord {
    /// Linking identifier; populated only when the cross-reference lookup hits
    pub appl_no: Option<String>,
    pub ingredient: Option<String>,
    pub route: Option<String>,
    pub route_extended: Option<String>,
    pub dosage: Option<String>,
    pub manufacturer: Option<String>,
    pub strength: Option<String>,
    pub pack_quantity: Option<i64>,
    pub ndc_number: Option<String>,
    pub labeler_code: Option<String>,
    pub product_code: Option<String>,
    pub sales: Option<Decimal>,
    pub packs: Option<i64>,
    pub quantity: Option<i64>,
    pub wac: Option<Decimal>,
    pub price: Option<Decimal>,
}

impl TableRecord for SalesRecord {
    const TABLE: Table = Table::Sales;

    fn into_values(self) -> RowValues {
        vec![
            CellValue::Text(self.appl_no),
            CellValue::Text(self.ingredient),
            CellValue::Text(self.route),
            CellValue::Text(self.route_extended),
            CellValue::Text(self.dosage),
            CellValue::Text(self.manufacturer),
            CellValue::Text(self.strength),
            CellValue::Integer(self.pack_quantity),
            CellValue::Text(self.ndc_number),
            CellValue::Text(self.labeler_code),
            CellValue::Text(self.product_code),
            CellValue::Decimal(self.sales),
            CellValue::Integer(self.packs),
            CellValue::Integer(self.quantity),
            CellValue::Decimal(self.wac),
            CellValue::Decimal(self.price),
        ]
    }

    fn linking_identifier(&self) -> Option<&str> {
        self.appl_no.as_deref()
    }
}
