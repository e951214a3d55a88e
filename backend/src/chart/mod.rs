//! Line-chart figures for a plotting front end.
//!
//! A [`PlotFigure`] serializes to the `{ data, layout }` object a Plotly-style
//! renderer expects. Values that are not numbers become `null`, which the
//! renderer draws as a gap.

use serde::{Deserialize, Serialize};

use crate::models::Series;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Size and decoration of a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartLayout {
    pub width: u32,
    pub height: u32,
    pub title: String,
    #[serde(rename = "showlegend")]
    pub show_legend: bool,
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
            title: "Chart".to_string(),
            show_legend: false,
        }
    }
}

impl ChartLayout {
    /// Layout of the inline data-set preview.
    pub fn preview() -> Self {
        Self {
            width: 740,
            height: 350,
            show_legend: true,
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// One line of the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub x: Vec<String>,
    pub y: Vec<Option<f64>>,
    pub name: String,
}

impl Trace {
    pub fn line(series: &Series) -> Self {
        Self {
            kind: "line",
            x: series
                .points
                .iter()
                .map(|p| p.timestamp.format(TIMESTAMP_FORMAT).to_string())
                .collect(),
            y: series.points.iter().map(|p| p.value.as_number()).collect(),
            name: series.name.clone(),
        }
    }
}

/// A complete figure, one trace per series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotFigure {
    pub data: Vec<Trace>,
    pub layout: ChartLayout,
}

impl PlotFigure {
    pub fn from_series(series: &[Series], layout: ChartLayout) -> Self {
        Self {
            data: series.iter().map(Trace::line).collect(),
            layout,
        }
    }
}
