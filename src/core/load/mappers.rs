//! Per-source row mappers
//!
//! Each mapper knows the column names of one extract and normalizes a raw
//! [`SourceRow`] into the record of its target table. Mapping never fails:
//! a cell that cannot be parsed becomes null.

use crate::adapters::source::SourceRow;
use crate::core::normalize::{
    parse_date, parse_decimal, parse_integer, parse_text, parse_trimmed_text, zero_pad,
};
use crate::core::xref::CrossReference;
use crate::domain::{
    ExclusivityRecord, PatentRecord, ProductRecord, SalesRecord, TableRecord,
    LABELER_CODE_WIDTH, PRODUCT_CODE_WIDTH,
};

/// Converts rows of one extract into records of one table
pub trait RowMapper {
    /// Record produced for every row
    type Record: TableRecord;

    /// Columns the extract is expected to carry
    fn source_columns(&self) -> &'static [&'static str];

    /// Normalizes one row
    fn map(&self, row: &SourceRow) -> Self::Record;
}

/// Approval extract columns
pub const PRODUCT_SOURCE_COLUMNS: &[&str] = &[
    "Appl_No",
    "Appl_Type",
    "Ingredient",
    "Dosage",
    "Form",
    "Route",
    "Trade_Name",
    "Applicant",
    "Strength",
    "TE_Code",
    "Approval_Date",
    "RLD",
    "RS",
    "Type",
    "Applicant_Full_Name",
];

/// Exclusivity extract columns
pub const EXCLUSIVITY_SOURCE_COLUMNS: &[&str] = &[
    "Appl_No",
    "Appl_Type",
    "Ingredient",
    "Dosage",
    "Form",
    "Route",
    "Trade_Name",
    "Strength",
    "Exclusivity_Code",
    "Exclusivity_Date",
];

/// Patent extract columns
pub const PATENT_SOURCE_COLUMNS: &[&str] = &[
    "Appl_No",
    "Appl_Type",
    "Ingredient",
    "Dosage",
    "Form",
    "Route",
    "Trade_Name",
    "Applicant",
    "Strength",
    "Patent_No",
    "Patent_Expire_Date_Text",
    "Drug_Substance_Flag",
    "Drug_Product_Flag",
    "Patent_Use_Code",
    "Submission_Date",
];

/// Sales extract columns
pub const SALES_SOURCE_COLUMNS: &[&str] = &[
    "Labeler Code",
    "Product Code",
    "Ingredient",
    "Route",
    "Route Ext",
    "Dosage",
    "Manufacturer",
    "Strength",
    "Pack_Quantity",
    "NDC Number",
    "Sales",
    "Packs",
    "Quantity",
    "WAC",
    "Price",
];

fn text(row: &SourceRow, column: &str) -> Option<String> {
    parse_text(row.get(column))
}

/// Approval extract → `products`
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductMapper;

impl RowMapper for ProductMapper {
    type Record = ProductRecord;

    fn source_columns(&self) -> &'static [&'static str] {
        PRODUCT_SOURCE_COLUMNS
    }

    fn map(&self, row: &SourceRow) -> ProductRecord {
        ProductRecord {
            appl_no: text(row, "Appl_No"),
            appl_type: text(row, "Appl_Type"),
            ingredient: text(row, "Ingredient"),
            dosage: text(row, "Dosage"),
            form: text(row, "Form"),
            route: text(row, "Route"),
            trade_name: text(row, "Trade_Name"),
            applicant: text(row, "Applicant"),
            strength: text(row, "Strength"),
            te_code: text(row, "TE_Code"),
            approval_date: parse_date(row.get("Approval_Date")),
            rld: text(row, "RLD"),
            rs: text(row, "RS"),
            product_type: text(row, "Type"),
            applicant_full_name: text(row, "Applicant_Full_Name"),
        }
    }
}

/// Exclusivity extract → `exclusivity`
#[derive(Debug, Clone, Copy, Default)]
pub struct ExclusivityMapper;

impl RowMapper for ExclusivityMapper {
    type Record = ExclusivityRecord;

    fn source_columns(&self) -> &'static [&'static str] {
        EXCLUSIVITY_SOURCE_COLUMNS
    }

    fn map(&self, row: &SourceRow) -> ExclusivityRecord {
        ExclusivityRecord {
            appl_no: text(row, "Appl_No"),
            appl_type: text(row, "Appl_Type"),
            ingredient: text(row, "Ingredient"),
            dosage: text(row, "Dosage"),
            form: text(row, "Form"),
            route: text(row, "Route"),
            trade_name: text(row, "Trade_Name"),
            strength: text(row, "Strength"),
            exclusivity_code: text(row, "Exclusivity_Code"),
            exclusivity_date: parse_date(row.get("Exclusivity_Date")),
        }
    }
}

/// Patent extract → `patent`
#[derive(Debug, Clone, Copy, Default)]
pub struct PatentMapper;

impl RowMapper for PatentMapper {
    type Record = PatentRecord;

    fn source_columns(&self) -> &'static [&'static str] {
        PATENT_SOURCE_COLUMNS
    }

    fn map(&self, row: &SourceRow) -> PatentRecord {
        PatentRecord {
            appl_no: text(row, "Appl_No"),
            appl_type: text(row, "Appl_Type"),
            ingredient: text(row, "Ingredient"),
            dosage: text(row, "Dosage"),
            form: text(row, "Form"),
            route: text(row, "Route"),
            trade_name: text(row, "Trade_Name"),
            applicant: text(row, "Applicant"),
            strength: text(row, "Strength"),
            patent_no: text(row, "Patent_No"),
            patent_expire_date_text: text(row, "Patent_Expire_Date_Text"),
            drug_substance_flag: text(row, "Drug_Substance_Flag"),
            drug_product_flag: text(row, "Drug_Product_Flag"),
            patent_use_code: text(row, "Patent_Use_Code"),
            submission_date: parse_date(row.get("Submission_Date")),
        }
    }
}

/// Sales extract → `sales`, linked through the cross-reference
#[derive(Debug, Clone, Copy)]
pub struct SalesMapper<'a> {
    xref: &'a CrossReference,
}

impl<'a> SalesMapper<'a> {
    /// Mapper resolving application numbers through `xref`
    pub fn new(xref: &'a CrossReference) -> Self {
        Self { xref }
    }
}

impl RowMapper for SalesMapper<'_> {
    type Record = SalesRecord;

    fn source_columns(&self) -> &'static [&'static str] {
        SALES_SOURCE_COLUMNS
    }

    fn map(&self, row: &SourceRow) -> SalesRecord {
        let labeler = row.get("Labeler Code");
        let product = row.get("Product Code");
        let appl_no = self.xref.resolve(labeler, product).map(str::to_string);

        SalesRecord {
            appl_no,
            ingredient: text(row, "Ingredient"),
            route: text(row, "Route"),
            route_extended: text(row, "Route Ext"),
            dosage: text(row, "Dosage"),
            manufacturer: text(row, "Manufacturer"),
            strength: text(row, "Strength"),
            pack_quantity: parse_integer(row.get("Pack_Quantity")),
            ndc_number: parse_trimmed_text(row.get("NDC Number")),
            labeler_code: zero_pad(labeler, LABELER_CODE_WIDTH),
            product_code: zero_pad(product, PRODUCT_CODE_WIDTH),
            sales: parse_decimal(row.get("Sales")),
            packs: parse_integer(row.get("Packs")),
            quantity: parse_integer(row.get("Quantity")),
            wac: parse_decimal(row.get("WAC")),
            price: parse_decimal(row.get("Price")),
        }
    }
}
