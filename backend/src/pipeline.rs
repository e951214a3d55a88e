//! High-level API: from a file, bytes or a stored record to series.
//!
//! Combines ingestion, optional caller overrides and reshaping.
//!
//! # Example
//!
//! ```rust,ignore
//! use dataset_series::pipeline::{series_from_file, SeriesOverrides};
//! use dataset_series::reshape::ReshapeOptions;
//!
//! let overrides = SeriesOverrides {
//!     date_format: Some("%Y-%m-%d".into()),
//!     ..Default::default()
//! };
//! let result = series_from_file("readings.csv", &overrides, &ReshapeOptions::default())?;
//! println!("{} series", result.series.len());
//! ```

use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

use crate::client::DataSetClient;
use crate::error::{ParseError, PipelineError, PipelineResult};
use crate::models::{DataSetRecord, Series, TabularPayload};
use crate::parser::{parse_bytes_auto, parse_file_auto, ParseResult};
use crate::reshape::{reshape, ReshapeOptions};

/// Caller choices applied on top of an ingested payload.
#[derive(Debug, Clone, Default)]
pub struct SeriesOverrides {
    pub index_column: Option<String>,
    pub date_format: Option<String>,
    /// Column name to display label.
    pub column_mapping: HashMap<String, String>,
}

impl SeriesOverrides {
    pub fn apply(&self, payload: &mut TabularPayload) {
        if let Some(index_column) = &self.index_column {
            payload.index_column = Some(index_column.clone());
        }
        if let Some(date_format) = &self.date_format {
            payload.date_format = Some(date_format.clone());
        }
        for (column, label) in &self.column_mapping {
            payload
                .column_mapping
                .insert(column.clone(), Some(label.clone()));
        }
    }
}

/// CSV file information
#[derive(Debug, Clone, Serialize)]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

impl From<&ParseResult> for CsvInfo {
    fn from(result: &ParseResult) -> Self {
        Self {
            encoding: result.encoding.clone(),
            delimiter: result.delimiter,
            headers: result.headers().to_vec(),
            row_count: result.row_count(),
        }
    }
}

/// Series plus what was learned on the way.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesResult {
    pub series: Vec<Series>,
    /// Rows dropped because their index cell was not a timestamp.
    pub skipped: Vec<ParseError>,
    /// Present when the payload came from delimited text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv_info: Option<CsvInfo>,
}

/// Parse a delimited file and reshape it.
pub fn series_from_file<P: AsRef<Path>>(
    path: P,
    overrides: &SeriesOverrides,
    options: &ReshapeOptions,
) -> PipelineResult<SeriesResult> {
    let parsed = parse_file_auto(path.as_ref())?;
    info!(path = %path.as_ref().display(), "read delimited file");
    series_from_parsed(parsed, overrides, options)
}

/// Parse delimited bytes and reshape them.
pub fn series_from_bytes(
    bytes: &[u8],
    overrides: &SeriesOverrides,
    options: &ReshapeOptions,
) -> PipelineResult<SeriesResult> {
    series_from_parsed(parse_bytes_auto(bytes)?, overrides, options)
}

fn series_from_parsed(
    parsed: ParseResult,
    overrides: &SeriesOverrides,
    options: &ReshapeOptions,
) -> PipelineResult<SeriesResult> {
    info!(
        encoding = %parsed.encoding,
        delimiter = %format_delimiter(parsed.delimiter),
        columns = parsed.headers().len(),
        rows = parsed.row_count(),
        "parsed delimited text"
    );

    let csv_info = CsvInfo::from(&parsed);
    let mut result = series_from_payload(parsed.payload, overrides, options)?;
    result.csv_info = Some(csv_info);
    Ok(result)
}

/// Reshape a time-series record fetched from the API.
pub fn series_from_record(
    record: &DataSetRecord,
    overrides: &SeriesOverrides,
    options: &ReshapeOptions,
) -> PipelineResult<SeriesResult> {
    let payload = record.time_series_payload()?;
    series_from_payload(payload, overrides, options)
}

/// Fetch a record by id and reshape it.
pub async fn fetch_series(
    client: &DataSetClient,
    id: &str,
    overrides: &SeriesOverrides,
    options: &ReshapeOptions,
) -> PipelineResult<SeriesResult> {
    let record = client.get_data_set(id).await?;
    series_from_record(&record, overrides, options)
}

/// Apply overrides to a payload and reshape it.
pub fn series_from_payload(
    mut payload: TabularPayload,
    overrides: &SeriesOverrides,
    options: &ReshapeOptions,
) -> PipelineResult<SeriesResult> {
    overrides.apply(&mut payload);

    if let Err(problems) = payload.check_shape() {
        for problem in &problems {
            warn!("{}", problem);
        }
    }

    let reshaped = reshape(&payload, options)?.ok_or(PipelineError::NothingToPlot)?;
    if !reshaped.skipped.is_empty() {
        warn!(count = reshaped.skipped.len(), "rows skipped on unparseable index");
    }

    Ok(SeriesResult {
        series: reshaped.series,
        skipped: reshaped.skipped,
        csv_info: None,
    })
}

/// Format delimiter for display
fn format_delimiter(d: char) -> &'static str {
    match d {
        ';' => ";",
        ',' => ",",
        '\t' => "TAB",
        '|' => "|",
        _ => "?",
    }
}
