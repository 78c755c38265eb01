//! Cross-reference builder
//!
//! Turns the identifier extract into an in-memory mapping from a normalized
//! (labeler code, product code) pair to one application number. The mapping
//! is built once per run and only read afterwards.
//!
//! Conflicting candidates are resolved first-write-wins: once a key holds a
//! non-empty application number, later rows for the same key are discarded
//! and counted in [`CrossReference::conflicts`].

use crate::adapters::source::ExtractReader;
use crate::core::normalize::{parse_trimmed_text, zero_pad};
use crate::domain::{CodeKey, Result, LABELER_CODE_WIDTH, PRODUCT_CODE_WIDTH};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Labeler code column of the identifier extract
pub const LABELER_CODE_COLUMN: &str = "Labeler Code";
/// Product code column of the identifier extract
pub const PRODUCT_CODE_COLUMN: &str = "Product Code";
/// Application number column of the identifier extract
pub const APPLICATION_NUMBER_COLUMN: &str = "Application Number";

/// Columns the identifier extract is expected to carry
pub const NDC_COLUMNS: &[&str] = &[
    LABELER_CODE_COLUMN,
    PRODUCT_CODE_COLUMN,
    APPLICATION_NUMBER_COLUMN,
];

/// Builds a composite key from raw code text
///
/// Returns `None` when either code is blank, so unpadded or empty codes
/// never participate in a match.
pub fn code_key(labeler: Option<&str>, product: Option<&str>) -> Option<CodeKey> {
    let labeler = zero_pad(labeler, LABELER_CODE_WIDTH)?;
    let product = zero_pad(product, PRODUCT_CODE_WIDTH)?;
    Some(CodeKey::from_normalized(labeler, product))
}

/// Read-only mapping from composite key to application number
#[derive(Debug, Clone, Default)]
pub struct CrossReference {
    entries: HashMap<CodeKey, String>,
    rows_read: usize,
    skipped: usize,
    conflicts: usize,
}

impl CrossReference {
    /// Creates an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers one candidate for a key.
    ///
    /// The candidate is stored when the key is absent or holds an empty
    /// value; otherwise it is discarded. A discarded candidate that differs
    /// from the stored value counts as a conflict.
    pub fn offer(&mut self, key: CodeKey, appl_no: String) {
        match self.entries.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(appl_no);
            }
            Entry::Occupied(mut slot) => {
                if slot.get().is_empty() {
                    slot.insert(appl_no);
                } else if *slot.get() != appl_no {
                    self.conflicts += 1;
                }
            }
        }
    }

    /// Application number linked to a key, if any
    pub fn lookup(&self, key: &CodeKey) -> Option<&str> {
        self.entries
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Resolves raw labeler/product code text directly
    pub fn resolve(&self, labeler: Option<&str>, product: Option<&str>) -> Option<&str> {
        code_key(labeler, product).and_then(|key| self.lookup(&key))
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping has no keys
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rows read from the identifier extract
    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    /// Rows skipped for a blank code or application number
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Candidates discarded because the key was already assigned
    pub fn conflicts(&self) -> usize {
        self.conflicts
    }
}

/// Consumes the identifier extract and builds the mapping
///
/// # Errors
///
/// Propagates `SourceRead` errors from the extract.
pub fn build_cross_reference(reader: &mut ExtractReader) -> Result<CrossReference> {
    reader.warn_missing_columns(NDC_COLUMNS);

    let mut xref = CrossReference::new();
    while let Some(row) = reader.next_row()? {
        xref.rows_read += 1;

        let key = code_key(row.get(LABELER_CODE_COLUMN), row.get(PRODUCT_CODE_COLUMN));
        let appl_no = parse_trimmed_text(row.get(APPLICATION_NUMBER_COLUMN));
        match (key, appl_no) {
            (Some(key), Some(appl_no)) => xref.offer(key, appl_no),
            _ => xref.skipped += 1,
        }
    }

    tracing::info!(
        source = reader.name(),
        rows = xref.rows_read,
        entries = xref.len(),
        skipped = xref.skipped,
        conflicts = xref.conflicts,
        "Cross-reference built"
    );

    Ok(xref)
}
