//! Local customization actions
//!
//! Customizations change a visualization without a model round trip. They
//! never mutate the input; the session pushes the returned copy as a new
//! version.

use crate::error::{Result, VizError};
use crate::types::{ChartConfig, ChartKind, VisualizationContent, VisualizationResult};

/// A user-driven tweak to the displayed visualization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Customization {
    /// Redraw the chart data as a different chart kind
    ChartKind(ChartKind),
    SeriesColor { data_key: String, color: String },
    Legend(bool),
    Grid(bool),
    Tooltip(bool),
    Title(String),
}

impl Customization {
    /// Apply to a copy of `result`
    pub fn apply(&self, result: &VisualizationResult) -> Result<VisualizationResult> {
        let mut updated = result.clone();

        if let Self::Title(title) = self {
            let title = title.trim();
            if title.is_empty() {
                return Err(VizError::validation("Title must not be empty."));
            }
            updated.title = title.to_string();
            return Ok(updated);
        }

        let VisualizationContent::Chart { chart_config } = &mut updated.content else {
            return Err(VizError::validation(format!(
                "This customization only applies to charts, not to a {}.",
                result.kind()
            )));
        };
        self.apply_to_chart(chart_config)?;
        Ok(updated)
    }

    fn apply_to_chart(&self, config: &mut ChartConfig) -> Result<()> {
        match self {
            Self::ChartKind(kind) => config.kind = *kind,
            Self::SeriesColor { data_key, color } => {
                let color = color.trim();
                if !is_color(color) {
                    return Err(VizError::validation(format!("'{}' is not a color.", color)));
                }
                let series = config.series_mut(data_key).ok_or_else(|| {
                    VizError::validation(format!("The chart has no series '{}'.", data_key))
                })?;
                series.color = Some(color.to_string());
            }
            Self::Legend(on) => config.show_legend = Some(*on),
            Self::Grid(on) => config.show_grid = Some(*on),
            Self::Tooltip(on) => config.show_tooltip = Some(*on),
            Self::Title(_) => {}
        }
        Ok(())
    }
}

/// `#rgb`, `#rrggbb`, `#rrggbbaa`, or a plain CSS color name
fn is_color(value: &str) -> bool {
    if let Some(hex) = value.strip_prefix('#') {
        return matches!(hex.len(), 3 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphabetic())
}
