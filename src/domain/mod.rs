//! Domain models and types for Formulary.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Table catalogue** ([`Table`], [`Column`], [`CellValue`]) shared by every store
//! - **Record types** ([`ProductRecord`], [`ExclusivityRecord`], [`PatentRecord`], [`SalesRecord`])
//! - **Identifiers** ([`CodeKey`], the labeler/product composite key)
//! - **Error types** ([`FormularyError`]) and the [`Result`] alias
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, FormularyError>`]:
//!
//! ```rust
//! use formulary::domain::{FormularyError, Result};
//!
//! fn example() -> Result<()> {
//!     Err(FormularyError::Validation("batch size must be positive".to_string()))
//! }
//! ```

pub mod errors;
pub mod ids;
pub mod records;
pub mod result;
pub mod tables;

// Re-export commonly used types for convenience
pub use errors::FormularyError;
pub use ids::{CodeKey, LABELER_CODE_WIDTH, PRODUCT_CODE_WIDTH};
pub use records::{ExclusivityRecord, PatentRecord, ProductRecord, SalesRecord, TableRecord};
pub use result::Result;
pub use tables::{CellValue, Column, ColumnKind, RowValues, Table};
