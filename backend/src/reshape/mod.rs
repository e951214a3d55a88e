//! Tabular payload to chartable series.
//!
//! Every non-index column becomes one [`Series`]; the index column provides
//! the timestamp of each point. Gaps can be forward-filled with the last
//! resolved value of the same column.
//!
//! ## Example
//!
//! ```rust
//! use dataset_series::models::{SeriesValue, TabularPayload};
//! use dataset_series::reshape::{reshape, ReshapeOptions};
//!
//! let payload = TabularPayload::from_rows(
//!     vec!["t".into(), "a".into()],
//!     vec![
//!         vec!["0".into(), "5".into()],
//!         vec!["1".into(), "".into()],
//!         vec!["2".into(), "9".into()],
//!     ],
//! );
//!
//! let reshaped = reshape(&payload, &ReshapeOptions::default()).unwrap().unwrap();
//! assert_eq!(
//!     reshaped.series[0].values(),
//!     vec![SeriesValue::Number(5.0), SeriesValue::Number(5.0), SeriesValue::Number(9.0)]
//! );
//! ```

pub mod numeric;

pub use numeric::parse_number;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ParseError, ReshapeError, ReshapeResult};
use crate::format::{effective_format, DateFormat};
use crate::models::{Series, SeriesPoint, SeriesValue, TabularPayload};

/// What to do with an index cell that is not a timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexErrorPolicy {
    /// Drop the row, as if it were blank, and report it.
    #[default]
    Skip,
    /// Fail the whole reshape.
    Abort,
}

impl std::str::FromStr for IndexErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "skip" => Ok(IndexErrorPolicy::Skip),
            "abort" => Ok(IndexErrorPolicy::Abort),
            other => Err(format!("unknown index error policy '{}'", other)),
        }
    }
}

/// Options for [`reshape`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReshapeOptions {
    /// Carry the last resolved value into empty cells.
    pub fill_gaps: bool,
    /// Handling of unparseable index cells.
    pub on_index_error: IndexErrorPolicy,
}

impl Default for ReshapeOptions {
    fn default() -> Self {
        Self {
            fill_gaps: true,
            on_index_error: IndexErrorPolicy::Skip,
        }
    }
}

/// Series built from a payload, plus the rows dropped on the way.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reshaped {
    /// One series per non-index column, in column order.
    pub series: Vec<Series>,
    /// Rows whose index cell could not be parsed.
    pub skipped: Vec<ParseError>,
}

/// Reshape a payload into one series per non-index column.
///
/// Returns `Ok(None)` when `columns`, `index_column` or `data` is absent.
/// Points keep row order; timestamps are not sorted.
pub fn reshape(payload: &TabularPayload, options: &ReshapeOptions) -> ReshapeResult<Option<Reshaped>> {
    let (Some(columns), Some(index_column), Some(data)) =
        (&payload.columns, &payload.index_column, &payload.data)
    else {
        return Ok(None);
    };

    // last occurrence wins for duplicated names
    let index_position = columns
        .iter()
        .rposition(|c| c == index_column)
        .ok_or_else(|| ReshapeError::UnknownIndexColumn(index_column.clone()))?;

    let value_columns: Vec<(usize, &String)> = columns
        .iter()
        .enumerate()
        .filter(|(_, c)| *c != index_column)
        .collect();

    let format = effective_format(payload.date_format.as_deref())?;
    let date_format = DateFormat::parse(&format)?;
    debug!(
        source = payload.date_format.as_deref().unwrap_or("<none>"),
        effective = %format,
        "resolved index date format"
    );

    let mut series: Vec<Series> = value_columns
        .iter()
        .map(|(_, column)| Series {
            name: payload.label_for(column).to_string(),
            column: column.to_string(),
            points: Vec::with_capacity(data.len()),
        })
        .collect();
    let mut last_values = vec![SeriesValue::Missing; value_columns.len()];
    let mut skipped = Vec::new();

    for (row_idx, row) in data.iter().enumerate() {
        if row.len() == 1 {
            continue;
        }

        let raw_index = row.get(index_position).map(String::as_str).unwrap_or_default();
        let timestamp = match date_format.parse_timestamp(raw_index) {
            Ok(ts) => ts,
            Err(message) => {
                let err = ParseError::new(row_idx, raw_index, message);
                match options.on_index_error {
                    IndexErrorPolicy::Abort => return Err(err.into()),
                    IndexErrorPolicy::Skip => {
                        warn!(row = row_idx, value = raw_index, "skipping row: {}", err.message);
                        skipped.push(err);
                        continue;
                    }
                }
            }
        };

        for (slot, (position, _)) in value_columns.iter().enumerate() {
            let cell = row.get(*position).map(String::as_str).unwrap_or_default();
            let value = if cell.is_empty() && options.fill_gaps {
                last_values[slot]
            } else {
                parse_number(cell)
            };

            series[slot].points.push(SeriesPoint { timestamp, value });
            last_values[slot] = value;
        }
    }

    debug!(
        series = series.len(),
        rows = data.len(),
        skipped = skipped.len(),
        "reshaped payload"
    );

    Ok(Some(Reshaped { series, skipped }))
}
