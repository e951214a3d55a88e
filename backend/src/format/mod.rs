//! Date format translation.
//!
//! Data sets describe their index column with a `%`-escaped format such as
//! `%Y-%m-%d %H:%M`. Index cells are parsed with the token notation instead
//! (`YYYY-MM-DD HH:mm`), so stored formats go through [`translate`] first.
//!
//! - `symbols`: Fixed escape-letter to token table
//! - `date`: Token format parser and timestamp reader
//!
//! ## Example
//!
//! ```rust
//! use dataset_series::format::translate;
//!
//! assert_eq!(translate(Some("%Y-%m-%d")).unwrap(), "YYYY-MM-DD");
//! assert_eq!(translate(None).unwrap(), "X");
//! ```

pub mod date;
pub mod symbols;

pub use date::{DateFormat, FormatItem};
pub use symbols::FormatSymbol;

use crate::error::{FormatError, FormatResult};

/// Escape marker of the source notation.
pub const ESCAPE: char = '%';

/// Token format meaning "index values are Unix epoch seconds".
pub const EPOCH_SECONDS: &str = "X";

/// Translate a `%`-escaped format into the token notation.
///
/// `None` yields [`EPOCH_SECONDS`]. Characters outside an escape are copied
/// unchanged. A trailing bare `%` and escapes with no table entry (`%%`
/// included) are rejected.
pub fn translate(source: Option<&str>) -> FormatResult<String> {
    let Some(source) = source else {
        return Ok(EPOCH_SECONDS.to_string());
    };

    let mut output = String::with_capacity(source.len() * 2);
    let mut chars = source.chars().enumerate();

    while let Some((position, c)) = chars.next() {
        if c != ESCAPE {
            output.push(c);
            continue;
        }

        let (_, token) = chars
            .next()
            .ok_or(FormatError::DanglingEscape { position })?;
        let symbol = FormatSymbol::from_escape(token)
            .ok_or(FormatError::UnknownToken { token, position })?;
        output.push_str(symbol.token());
    }

    Ok(output)
}

/// Resolve the format index cells are parsed with.
///
/// Absent formats and formats still holding a `%` escape are translated;
/// anything else is already in token notation and used as-is.
pub fn effective_format(date_format: Option<&str>) -> FormatResult<String> {
    match date_format {
        Some(format) if !format.contains(ESCAPE) => Ok(format.to_string()),
        other => translate(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_is_epoch() {
        assert_eq!(translate(None).unwrap(), "X");
    }

    #[test]
    fn test_date_only() {
        assert_eq!(translate(Some("%Y-%m-%d")).unwrap(), "YYYY-MM-DD");
    }

    #[test]
    fn test_full_datetime() {
        assert_eq!(
            translate(Some("%d/%m/%y %H:%M:%S.%f")).unwrap(),
            "DD/MM/YY HH:mm:ss.SSS"
        );
    }

    #[test]
    fn test_literals_pass_through() {
        assert_eq!(translate(Some("plain-text")).unwrap(), "plain-text");
        assert_eq!(translate(Some("")).unwrap(), "");
        assert_eq!(translate(Some("%Y年%m月")).unwrap(), "YYYY年MM月");
    }

    #[test]
    fn test_dangling_escape() {
        assert_eq!(
            translate(Some("%Y-%")),
            Err(FormatError::DanglingEscape { position: 3 })
        );
    }

    #[test]
    fn test_unknown_token() {
        assert_eq!(
            translate(Some("%Y %b")),
            Err(FormatError::UnknownToken {
                token: 'b',
                position: 3
            })
        );
        assert!(matches!(
            translate(Some("100%%")),
            Err(FormatError::UnknownToken { token: '%', .. })
        ));
    }

    #[test]
    fn test_effective_format() {
        assert_eq!(effective_format(None).unwrap(), "X");
        assert_eq!(effective_format(Some("%Y")).unwrap(), "YYYY");
        assert_eq!(effective_format(Some("YYYY-MM")).unwrap(), "YYYY-MM");
    }
}
