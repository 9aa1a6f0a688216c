//! Visualization data model
//!
//! A [`VisualizationResult`] is what the model produces and what the version
//! stack and history store keep. On the wire and on disk the content is
//! flattened next to the common fields with a `visualizationType`
//! discriminator, e.g.
//!
//! ```json
//! { "title": "Login", "explanation": "...", "visualizationType": "diagram",
//!   "mermaidCode": "graph TD\n  A --> B" }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single generated visualization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualizationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub explanation: String,
    /// Prompt that produced this version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(flatten)]
    pub content: VisualizationContent,
}

impl VisualizationResult {
    pub fn new(title: impl Into<String>, content: VisualizationContent) -> Self {
        Self {
            id: None,
            title: title.into(),
            explanation: String::new(),
            prompt: None,
            content,
        }
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn kind(&self) -> VisualizationKind {
        self.content.kind()
    }

    /// Editable source text of the content (chart configs as pretty JSON)
    pub fn source_text(&self) -> crate::Result<String> {
        Ok(match &self.content {
            VisualizationContent::Diagram { mermaid_code } => mermaid_code.clone(),
            VisualizationContent::Chart { chart_config } => {
                serde_json::to_string_pretty(chart_config)?
            }
            VisualizationContent::RawImage { svg_code } => svg_code.clone(),
        })
    }
}

/// Type-specific payload, selected by `visualizationType`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "visualizationType", rename_all = "camelCase")]
pub enum VisualizationContent {
    #[serde(rename_all = "camelCase")]
    Diagram { mermaid_code: String },
    #[serde(rename_all = "camelCase")]
    Chart { chart_config: ChartConfig },
    #[serde(rename_all = "camelCase")]
    RawImage { svg_code: String },
}

impl VisualizationContent {
    pub fn kind(&self) -> VisualizationKind {
        match self {
            Self::Diagram { .. } => VisualizationKind::Diagram,
            Self::Chart { .. } => VisualizationKind::Chart,
            Self::RawImage { .. } => VisualizationKind::RawImage,
        }
    }
}

/// Discriminator values of `visualizationType`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VisualizationKind {
    Diagram,
    Chart,
    RawImage,
}

impl VisualizationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Diagram => "diagram",
            Self::Chart => "chart",
            Self::RawImage => "rawImage",
        }
    }
}

impl fmt::Display for VisualizationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chart kinds the charting library can draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Area,
    Pie,
    Scatter,
    Radar,
}

impl ChartKind {
    pub const ALL: [ChartKind; 6] = [
        ChartKind::Bar,
        ChartKind::Line,
        ChartKind::Area,
        ChartKind::Pie,
        ChartKind::Scatter,
        ChartKind::Radar,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Area => "area",
            Self::Pie => "pie",
            Self::Scatter => "scatter",
            Self::Radar => "radar",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One plotted series of a chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSpec {
    /// Record key holding this series' values
    pub data_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Series sharing a stack id are stacked (bar/area)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_id: Option<String>,
}

impl SeriesSpec {
    pub fn new(data_key: impl Into<String>) -> Self {
        Self {
            data_key: data_key.into(),
            name: None,
            color: None,
            stack_id: None,
        }
    }
}

/// Structured description of a statistical chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub data: Vec<Map<String, Value>>,
    pub series: Vec<SeriesSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_axis_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_legend: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_grid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_tooltip: Option<bool>,
}

impl ChartConfig {
    pub fn new(kind: ChartKind) -> Self {
        Self {
            kind,
            data: Vec::new(),
            series: Vec::new(),
            x_axis_key: None,
            show_legend: None,
            show_grid: None,
            show_tooltip: None,
        }
    }

    pub fn series_mut(&mut self, data_key: &str) -> Option<&mut SeriesSpec> {
        self.series.iter_mut().find(|s| s.data_key == data_key)
    }

    /// Sum of the numeric values stored under `data_key` across all records.
    ///
    /// Numeric strings such as `"70"` or `"70%"` are counted too; anything
    /// else is skipped.
    pub fn series_total(&self, data_key: &str) -> f64 {
        self.data
            .iter()
            .filter_map(|record| record.get(data_key))
            .filter_map(|value| match value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
                _ => None,
            })
            .sum()
    }
}
