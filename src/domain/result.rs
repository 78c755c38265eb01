//! Result type alias for Formulary
//!
//! This module provides a convenient Result type alias that uses
//! `FormularyError` as the error type.

use super::errors::FormularyError;

/// Result type alias for Formulary operations
///
/// # Examples
///
/// ```
/// use formulary::domain::result::Result;
/// use formulary::domain::errors::FormularyError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(FormularyError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, FormularyError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::FormularyError;

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(FormularyError::Validation("test error".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }
}
