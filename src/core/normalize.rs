//! Field normalization
//!
//! Total functions that turn raw cell text into typed values. The regulatory
//! and commercial extracts are of uneven quality, so a cell that cannot be
//! parsed becomes `None` instead of failing the row or the run.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Text passthrough: blank or whitespace-only cells become `None`.
pub fn parse_text(raw: Option<&str>) -> Option<String> {
    match raw {
        Some(value) if !value.trim().is_empty() => Some(value.to_string()),
        _ => None,
    }
}

/// Like [`parse_text`] but trims the surrounding whitespace.
pub fn parse_trimmed_text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Parses a date written exactly as `YYYY-MM-DD`.
///
/// Surrounding whitespace is ignored. Any other layout (including
/// unpadded months or days) and impossible dates yield `None`.
pub fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    let value = raw?.trim();
    let bytes = value.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    let digits_ok = bytes
        .iter()
        .enumerate()
        .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !digits_ok {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Parses a decimal amount.
///
/// Currency symbols, thousands separators and all whitespace are removed
/// before parsing, so `"$1,234.50"` reads as `1234.50`.
pub fn parse_decimal(raw: Option<&str>) -> Option<Decimal> {
    let cleaned: String = raw?
        .chars()
        .filter(|c| !matches!(c, '$' | '€' | '£' | '¥' | ',') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}

/// Parses an integer, ignoring thousands separators.
pub fn parse_integer(raw: Option<&str>) -> Option<i64> {
    let cleaned = raw?.replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<i64>().ok()
}

/// Trims a code and left-pads it with zeros to `width`.
///
/// Blank input yields `None`. Codes already at or above `width` are
/// returned unchanged (trimmed).
pub fn zero_pad(raw: Option<&str>, width: usize) -> Option<String> {
    let value = raw?.trim();
    if value.is_empty() {
        return None;
    }
    Some(format!("{value:0>width$}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(None ; "absent")]
    #[test_case(Some("") ; "empty")]
    #[test_case(Some("   ") ; "whitespace")]
    #[test_case(Some("01/02/2020") ; "us layout")]
    #[test_case(Some("2020-1-2") ; "unpadded")]
    #[test_case(Some("2020-02-30") ; "impossible day")]
    #[test_case(Some("Jan 1, 2020") ; "prose")]
    #[test_case(Some("2020-01-02T00:00:00") ; "timestamp")]
    fn test_parse_date_rejects(raw: Option<&str>) {
        assert_eq!(parse_date(raw), None);
    }

    #[test]
    fn test_parse_date_accepts_iso() {
        assert_eq!(
            parse_date(Some("2021-07-15")),
            NaiveDate::from_ymd_opt(2021, 7, 15)
        );
        assert_eq!(
            parse_date(Some(" 1982-01-01 ")),
            NaiveDate::from_ymd_opt(1982, 1, 1)
        );
    }

    #[test_case(Some("$1,234.50"), "1234.50" ; "currency and separators")]
    #[test_case(Some(" 12 345.6 "), "12345.6" ; "inner whitespace")]
    #[test_case(Some("-3.25"), "-3.25" ; "negative")]
    #[test_case(Some("42"), "42" ; "integer text")]
    #[test_case(Some("1e3"), "1000" ; "scientific")]
    fn test_parse_decimal_accepts(raw: Option<&str>, expected: &str) {
        assert_eq!(parse_decimal(raw), Some(Decimal::from_str(expected).unwrap()));
    }

    #[test_case(None ; "absent")]
    #[test_case(Some("") ; "empty")]
    #[test_case(Some("$") ; "symbol only")]
    #[test_case(Some("n/a") ; "garbage")]
    #[test_case(Some("12.3.4") ; "two points")]
    fn test_parse_decimal_rejects(raw: Option<&str>) {
        assert_eq!(parse_decimal(raw), None);
    }

    #[test_case(Some("1,000"), 1000 ; "thousands")]
    #[test_case(Some(" 7 "), 7 ; "padded")]
    #[test_case(Some("-12"), -12 ; "negative")]
    fn test_parse_integer_accepts(raw: Option<&str>, expected: i64) {
        assert_eq!(parse_integer(raw), Some(expected));
    }

    #[test_case(None ; "absent")]
    #[test_case(Some("") ; "empty")]
    #[test_case(Some("  ") ; "whitespace")]
    #[test_case(Some("12.5") ; "fractional")]
    #[test_case(Some("abc") ; "garbage")]
    #[test_case(Some("1 000") ; "inner space")]
    fn test_parse_integer_rejects(raw: Option<&str>) {
        assert_eq!(parse_integer(raw), None);
    }

    #[test]
    fn test_zero_pad() {
        assert_eq!(zero_pad(Some("123"), 5), Some("00123".to_string()));
        assert_eq!(zero_pad(Some(" 45 "), 4), Some("0045".to_string()));
        assert_eq!(zero_pad(Some("123456"), 5), Some("123456".to_string()));
        assert_eq!(zero_pad(Some(""), 5), None);
        assert_eq!(zero_pad(Some("   "), 5), None);
        assert_eq!(zero_pad(None, 5), None);
    }

    #[test]
    fn test_parse_text() {
        assert_eq!(parse_text(Some("ASPIRIN")), Some("ASPIRIN".to_string()));
        assert_eq!(parse_text(Some(" keep ")), Some(" keep ".to_string()));
        assert_eq!(parse_text(Some("  ")), None);
        assert_eq!(parse_text(None), None);
        assert_eq!(
            parse_trimmed_text(Some(" 0001-2345-67 ")),
            Some("0001-2345-67".to_string())
        );
        assert_eq!(parse_trimmed_text(Some(" ")), None);
    }
}
