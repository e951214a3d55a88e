//! Permissive numeric parsing of cell text.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::SeriesValue;

/// Longest numeric prefix after leading whitespace.
static NUMERIC_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([+-]?(?:Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?))")
        .expect("valid numeric regex")
});

/// Parse a cell as a float, the way spreadsheet exports are usually read.
///
/// Leading whitespace is skipped and the longest numeric prefix is used, so
/// `"12.5 kWh"` reads as `12.5`. Text with no numeric prefix, the empty
/// string included, is [`SeriesValue::NotANumber`].
pub fn parse_number(cell: &str) -> SeriesValue {
    NUMERIC_PREFIX
        .captures(cell)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map(SeriesValue::Number)
        .unwrap_or(SeriesValue::NotANumber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_numbers() {
        assert_eq!(parse_number("5"), SeriesValue::Number(5.0));
        assert_eq!(parse_number("-2.5"), SeriesValue::Number(-2.5));
        assert_eq!(parse_number(".5"), SeriesValue::Number(0.5));
        assert_eq!(parse_number("5."), SeriesValue::Number(5.0));
        assert_eq!(parse_number("1.5e3"), SeriesValue::Number(1500.0));
    }

    #[test]
    fn test_prefix_and_whitespace() {
        assert_eq!(parse_number("  42"), SeriesValue::Number(42.0));
        assert_eq!(parse_number("12.5 kWh"), SeriesValue::Number(12.5));
        assert_eq!(parse_number("3e"), SeriesValue::Number(3.0));
        assert_eq!(parse_number("1,5"), SeriesValue::Number(1.0));
    }

    #[test]
    fn test_infinity() {
        assert_eq!(parse_number("Infinity"), SeriesValue::Number(f64::INFINITY));
        assert_eq!(parse_number("-Infinity"), SeriesValue::Number(f64::NEG_INFINITY));
    }

    #[test]
    fn test_not_a_number() {
        assert_eq!(parse_number(""), SeriesValue::NotANumber);
        assert_eq!(parse_number("abc"), SeriesValue::NotANumber);
        assert_eq!(parse_number("NaN"), SeriesValue::NotANumber);
        assert_eq!(parse_number("-"), SeriesValue::NotANumber);
        assert_eq!(parse_number("inf"), SeriesValue::NotANumber);
    }
}
