//! # dataset-series - time-series data sets to chartable series
//!
//! Turns tabular time-series payloads (a header row, string cells, an index
//! column and an optional `%`-escaped date format) into one numeric series
//! per value column, ready for a line chart.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV / API  │────▶│   Payload   │────▶│   Reshape   │────▶│   Series /  │
//! │   record    │     │ (+override) │     │ (fmt, fill) │     │    Figure   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use dataset_series::{reshape, translate, ReshapeOptions, TabularPayload};
//!
//! assert_eq!(translate(Some("%Y-%m-%d")).unwrap(), "YYYY-MM-DD");
//!
//! let payload = TabularPayload::from_rows(
//!     vec!["t".into(), "a".into()],
//!     vec![vec!["0".into(), "5".into()], vec!["1".into(), "".into()]],
//! );
//! let reshaped = reshape(&payload, &ReshapeOptions::default()).unwrap().unwrap();
//! assert_eq!(reshaped.series[0].points.len(), 2);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`format`] - `%`-escaped format translation and timestamp parsing
//! - [`models`] - Payload, series and data-set record types
//! - [`reshape`] - Payload to series, with gap filling
//! - [`parser`] - Delimited text ingestion with auto-detection
//! - [`validation`] - JSON Schema check of stored payloads
//! - [`client`] - Data-set REST API client
//! - [`chart`] - Line-chart figures
//! - [`pipeline`] - File, bytes or record to series
//! - [`config`] - Environment settings
//! - [`telemetry`] - Tracing setup

// Core modules
pub mod error;
pub mod models;

// Reshaping
pub mod format;
pub mod reshape;

// Ingestion
pub mod parser;
pub mod validation;

// Remote records
pub mod client;

// Output
pub mod chart;
pub mod pipeline;

// Runtime
pub mod config;
pub mod telemetry;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ClientError, ConfigError, CsvError, FormatError, ParseError, PipelineError, ReshapeError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{DataSetRecord, DataType, Series, SeriesPoint, SeriesValue, TabularPayload};

// =============================================================================
// Re-exports - Format & reshape
// =============================================================================

pub use format::{effective_format, translate, DateFormat};
pub use reshape::{reshape, IndexErrorPolicy, ReshapeOptions, Reshaped};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use chart::{ChartLayout, PlotFigure};
pub use client::{DataSetClient, ListQuery};
pub use config::Settings;
pub use pipeline::{
    fetch_series, series_from_bytes, series_from_file, series_from_payload, series_from_record,
    CsvInfo, SeriesOverrides, SeriesResult,
};
