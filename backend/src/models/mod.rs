//! Domain models shared by the ingestion, reshaping and client modules.
//!
//! - [`TabularPayload`] - Column-oriented CSV content of a time-series data set
//! - [`Series`] / [`SeriesPoint`] / [`SeriesValue`] - Reshaped, chartable output
//! - [`DataType`] - Kind of data set (time series, image, JSON, binary)
//! - [`DataSetRecord`] - A stored data set as returned by the REST API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::path::Path;

// =============================================================================
// Tabular Payload
// =============================================================================

/// One line of delimited text, split into raw cells.
///
/// A row holding exactly one cell is the marker for a blank line.
pub type Row = Vec<String>;

/// Column-oriented payload of a time-series data set.
///
/// Every field is optional because stored records may be incomplete; a
/// payload missing `columns`, `index_column` or `data` has nothing to plot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabularPayload {
    /// Column names in file order.
    pub columns: Option<Vec<String>>,
    /// Column whose values are the timestamps of every series.
    pub index_column: Option<String>,
    /// Data rows, positionally aligned with `columns`.
    pub data: Option<Vec<Row>>,
    /// `%`-escaped or token date format of the index column.
    pub date_format: Option<String>,
    /// Display labels per column.
    #[serde(default, deserialize_with = "null_as_default")]
    pub column_mapping: HashMap<String, Option<String>>,
}

impl TabularPayload {
    /// Build a payload from a header and rows, with every label blank.
    pub fn from_rows(columns: Vec<String>, data: Vec<Row>) -> Self {
        let column_mapping = columns
            .iter()
            .map(|c| (c.clone(), Some(String::new())))
            .collect();
        Self {
            index_column: columns.first().cloned(),
            columns: Some(columns),
            data: Some(data),
            date_format: None,
            column_mapping,
        }
    }

    /// Display label of a column: its mapped label if non-empty, else its name.
    pub fn label_for<'a>(&'a self, column: &'a str) -> &'a str {
        match self.column_mapping.get(column) {
            Some(Some(label)) if !label.is_empty() => label.as_str(),
            _ => column,
        }
    }

    /// Drop labels that are blank after trimming.
    pub fn clean_column_mapping(&mut self) {
        self.column_mapping
            .retain(|_, label| label.as_deref().is_some_and(|l| !l.trim().is_empty()));
    }

    /// Check the structural invariants the JSON schema cannot express.
    ///
    /// Columns must be unique, the index column must be one of them, and
    /// every row must be a blank-line marker or exactly as wide as `columns`.
    pub fn check_shape(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        let Some(columns) = &self.columns else {
            return Ok(());
        };

        let mut seen = HashSet::new();
        for column in columns {
            if !seen.insert(column.as_str()) {
                errors.push(format!("Duplicate column '{}'", column));
            }
        }

        if let Some(index) = &self.index_column {
            if !columns.contains(index) {
                errors.push(format!("Index column '{}' is not a column", index));
            }
        }

        if let Some(data) = &self.data {
            for (i, row) in data.iter().enumerate() {
                if row.len() != 1 && row.len() != columns.len() {
                    errors.push(format!(
                        "Row {} has {} cells, expected {}",
                        i,
                        row.len(),
                        columns.len()
                    ));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// Series
// =============================================================================

/// Value of one series point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeriesValue {
    /// A parsed number.
    Number(f64),
    /// The cell held text with no numeric prefix.
    NotANumber,
    /// A gap with no earlier value to carry forward.
    Missing,
}

impl SeriesValue {
    /// The numeric value, if there is one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            SeriesValue::Number(n) => Some(*n),
            SeriesValue::NotANumber | SeriesValue::Missing => None,
        }
    }

    pub fn is_nan(&self) -> bool {
        matches!(self, SeriesValue::NotANumber)
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, SeriesValue::Missing)
    }
}

/// Serialized as a JSON number, the string `"NaN"`, or `null`.
impl Serialize for SeriesValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SeriesValue::Number(n) if n.is_finite() => serializer.serialize_f64(*n),
            SeriesValue::Number(n) if *n > 0.0 => serializer.serialize_str("Infinity"),
            SeriesValue::Number(_) => serializer.serialize_str("-Infinity"),
            SeriesValue::NotANumber => serializer.serialize_str("NaN"),
            SeriesValue::Missing => serializer.serialize_none(),
        }
    }
}

/// A single (timestamp, value) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub value: SeriesValue,
}

/// One chartable series, derived from a non-index column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    /// Display label.
    pub name: String,
    /// Raw column name the series was built from.
    pub column: String,
    /// Points in row order.
    pub points: Vec<SeriesPoint>,
}

impl Series {
    pub fn values(&self) -> Vec<SeriesValue> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.points.iter().map(|p| p.timestamp).collect()
    }
}

// =============================================================================
// Data Types
// =============================================================================

/// Kind of a data set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    TimeSeries,
    Image,
    Json,
    Binary,
}

impl DataType {
    /// All types, in detection order.
    pub const ALL: [DataType; 4] = [
        DataType::TimeSeries,
        DataType::Image,
        DataType::Json,
        DataType::Binary,
    ];

    /// Identifier used by the REST API.
    pub fn id(&self) -> &'static str {
        match self {
            DataType::TimeSeries => "TIME_SERIES",
            DataType::Image => "IMAGE",
            DataType::Json => "JSON",
            DataType::Binary => "BINARY",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DataType::TimeSeries => "Time Series",
            DataType::Image => "Single Image",
            DataType::Json => "JSON Data",
            DataType::Binary => "Binary File",
        }
    }

    /// MIME types accepted for this type. Binary accepts anything.
    pub fn mime_types(&self) -> &'static [&'static str] {
        match self {
            DataType::TimeSeries => &["text/csv"],
            DataType::Image => &["image/jpg", "image/jpeg", "image/png"],
            DataType::Json => &["application/json"],
            DataType::Binary => &[],
        }
    }

    /// Detect the data type of an uploaded file.
    ///
    /// A `.csv` file name wins over whatever MIME type the client reported,
    /// since some platforms report CSV as `application/vnd.ms-excel`.
    pub fn detect(file_name: &str, mime: &str) -> DataType {
        let mime = if file_name.to_lowercase().ends_with(".csv") {
            "text/csv"
        } else {
            mime
        };

        Self::ALL
            .into_iter()
            .find(|t| t.mime_types().contains(&mime))
            .unwrap_or(DataType::Binary)
    }

    /// Detect the data type of a local file from its extension.
    pub fn from_path(path: &Path) -> DataType {
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        Self::detect(file_name, guess_mime(path))
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext.as_deref() {
        Some("csv") => "text/csv",
        Some("jpg") => "image/jpg",
        Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}

// =============================================================================
// Stored Records
// =============================================================================

/// A data set as stored by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSetRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
    #[serde(default)]
    pub payload: Value,
    /// Remaining backend fields (assignments, relations, owner, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
