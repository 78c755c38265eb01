//! Identifier types
//!
//! Newtype wrappers for the identifiers that cross dataset boundaries.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of a normalized labeler code
pub const LABELER_CODE_WIDTH: usize = 5;

/// Width of a normalized product code
pub const PRODUCT_CODE_WIDTH: usize = 4;

/// Composite key joining sales rows to approval records
///
/// Both parts are already zero-padded (5 digits for the labeler code,
/// 4 for the product code). Construct it through
/// [`crate::core::xref::code_key`] so unpadded or blank codes can never
/// form a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CodeKey {
    labeler: String,
    product: String,
}

impl CodeKey {
    /// Creates a key from two already-normalized codes
    pub(crate) fn from_normalized(labeler: String, product: String) -> Self {
        Self { labeler, product }
    }

    /// Normalized labeler code
    pub fn labeler(&self) -> &str {
        &self.labeler
    }

    /// Normalized product code
    pub fn product(&self) -> &str {
        &self.product
    }
}

impl fmt::Display for CodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.labeler, self.product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_key_display() {
        let key = CodeKey::from_normalized("00123".to_string(), "0045".to_string());
        assert_eq!(key.to_string(), "00123-0045");
        assert_eq!(key.labeler(), "00123");
        assert_eq!(key.product(), "0045");
    }
}
