//! Token date formats and timestamp parsing.
//!
//! A token format is a sequence of [`FormatSymbol`] tokens (`YYYY`, `MM`, ...)
//! and literal text. Literal text may be wrapped in `[...]` to keep letters
//! from being read as tokens. The single token `X` means epoch seconds.
//!
//! Parsing is strict about literals and trailing input, lenient about digit
//! counts: `MM` accepts `7` as well as `07`. Fields the format does not name
//! default to 1970-01-01 00:00:00.000, and every timestamp is read as UTC.

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use super::symbols::FormatSymbol;
use super::EPOCH_SECONDS;
use crate::error::{FormatError, FormatResult};

static EPOCH_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)$").expect("valid epoch regex"));

/// One element of a token format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatItem {
    Symbol(FormatSymbol),
    Literal(String),
}

/// A parsed token format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateFormat {
    /// Cells are Unix epoch seconds, optionally fractional.
    EpochSeconds,
    /// Cells follow a token pattern.
    Pattern(Vec<FormatItem>),
}

#[derive(Debug, Default)]
struct Fields {
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
    hour: Option<u32>,
    minute: Option<u32>,
    second: Option<u32>,
    millisecond: Option<u32>,
}

impl DateFormat {
    /// Parse a token format.
    pub fn parse(format: &str) -> FormatResult<Self> {
        if format == EPOCH_SECONDS {
            return Ok(DateFormat::EpochSeconds);
        }

        let symbols = FormatSymbol::by_token_length();
        let mut items: Vec<FormatItem> = Vec::new();
        let mut rest = format;
        let mut position = 0;

        while !rest.is_empty() {
            if let Some(bracketed) = rest.strip_prefix('[') {
                let end = bracketed
                    .find(']')
                    .ok_or(FormatError::UnclosedLiteral { position })?;
                push_literal(&mut items, &bracketed[..end]);
                position += bracketed[..end].chars().count() + 2;
                rest = &bracketed[end + 1..];
                continue;
            }

            if let Some(symbol) = symbols.iter().find(|s| rest.starts_with(s.token())) {
                items.push(FormatItem::Symbol(*symbol));
                position += symbol.token().len();
                rest = &rest[symbol.token().len()..];
                continue;
            }

            let mut chars = rest.chars();
            if let Some(c) = chars.next() {
                push_literal(&mut items, c.encode_utf8(&mut [0; 4]));
                position += 1;
            }
            rest = chars.as_str();
        }

        Ok(DateFormat::Pattern(items))
    }

    pub fn is_epoch(&self) -> bool {
        matches!(self, DateFormat::EpochSeconds)
    }

    /// Read a cell as a UTC timestamp.
    pub fn parse_timestamp(&self, raw: &str) -> Result<DateTime<Utc>, String> {
        let input = raw.trim();
        if input.is_empty() {
            return Err("empty value".to_string());
        }

        match self {
            DateFormat::EpochSeconds => parse_epoch_seconds(input),
            DateFormat::Pattern(items) => parse_pattern(items, input),
        }
    }
}

fn push_literal(items: &mut Vec<FormatItem>, text: &str) {
    if let Some(FormatItem::Literal(last)) = items.last_mut() {
        last.push_str(text);
    } else if !text.is_empty() {
        items.push(FormatItem::Literal(text.to_string()));
    }
}

fn parse_epoch_seconds(input: &str) -> Result<DateTime<Utc>, String> {
    if !EPOCH_PATTERN.is_match(input) {
        return Err("not a number of seconds".to_string());
    }

    let seconds: f64 = input
        .parse()
        .map_err(|e| format!("not a number of seconds: {}", e))?;
    let millis = (seconds * 1000.0).round();
    if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
        return Err("timestamp out of range".to_string());
    }

    DateTime::from_timestamp_millis(millis as i64).ok_or_else(|| "timestamp out of range".to_string())
}

fn parse_pattern(items: &[FormatItem], input: &str) -> Result<DateTime<Utc>, String> {
    let mut fields = Fields::default();
    let mut rest = input;

    for item in items {
        match item {
            FormatItem::Literal(text) => {
                rest = rest
                    .strip_prefix(text.as_str())
                    .ok_or_else(|| format!("expected '{}'", text))?;
            }
            FormatItem::Symbol(symbol) => {
                let digits = rest
                    .bytes()
                    .take(symbol.width())
                    .take_while(|b| b.is_ascii_digit())
                    .count();
                if digits == 0 {
                    return Err(format!("expected digits for {}", symbol.token()));
                }
                let value: u32 = rest[..digits]
                    .parse()
                    .map_err(|e| format!("invalid {}: {}", symbol.token(), e))?;
                rest = &rest[digits..];
                assign(&mut fields, *symbol, value, digits);
            }
        }
    }

    if !rest.is_empty() {
        return Err(format!("unexpected trailing input '{}'", rest));
    }

    let date = NaiveDate::from_ymd_opt(
        fields.year.unwrap_or(1970),
        fields.month.unwrap_or(1),
        fields.day.unwrap_or(1),
    )
    .ok_or_else(|| "invalid calendar date".to_string())?;

    let datetime = date
        .and_hms_milli_opt(
            fields.hour.unwrap_or(0),
            fields.minute.unwrap_or(0),
            fields.second.unwrap_or(0),
            fields.millisecond.unwrap_or(0),
        )
        .ok_or_else(|| "invalid time of day".to_string())?;

    Ok(datetime.and_utc())
}

fn assign(fields: &mut Fields, symbol: FormatSymbol, value: u32, digits: usize) {
    match symbol {
        FormatSymbol::Year4 => fields.year = Some(value as i32),
        // 69-99 are the 1900s, 00-68 the 2000s
        FormatSymbol::Year2 => {
            let century = if value > 68 { 1900 } else { 2000 };
            fields.year = Some(century + value as i32);
        }
        FormatSymbol::Month => fields.month = Some(value),
        FormatSymbol::Day => fields.day = Some(value),
        FormatSymbol::Hour24 => fields.hour = Some(value),
        FormatSymbol::Minute => fields.minute = Some(value),
        FormatSymbol::Second => fields.second = Some(value),
        // fractional digits: "5" is 500ms, "05" is 50ms
        FormatSymbol::Millisecond => {
            fields.millisecond = Some(value * 10u32.pow((3 - digits) as u32));
        }
    }
}
