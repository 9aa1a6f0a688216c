//! Validation of hand-edited visualization source
//!
//! Edits are checked against the kind of the visualization being edited and
//! turned into new content. Nothing is rendered here; the checks only catch
//! what would obviously fail downstream.

use crate::error::{Result, VizError};
use crate::normalize::normalize_diagram;
use crate::types::{ChartConfig, VisualizationContent, VisualizationKind};

/// Parse edited `text` as new content of the given kind
pub fn parse_edited_source(kind: VisualizationKind, text: &str) -> Result<VisualizationContent> {
    if text.trim().is_empty() {
        return Err(VizError::validation("The source is empty."));
    }

    match kind {
        VisualizationKind::Diagram => Ok(VisualizationContent::Diagram {
            mermaid_code: normalize_diagram(text),
        }),
        VisualizationKind::Chart => {
            let chart_config = parse_chart_config(text)?;
            Ok(VisualizationContent::Chart { chart_config })
        }
        VisualizationKind::RawImage => {
            validate_svg(text)?;
            Ok(VisualizationContent::RawImage {
                svg_code: text.trim().to_string(),
            })
        }
    }
}

/// Chart configs must be valid JSON matching the config shape
pub fn parse_chart_config(text: &str) -> Result<ChartConfig> {
    let config: ChartConfig = serde_json::from_str(text)
        .map_err(|e| VizError::validation(format!("Invalid chart JSON: {}", e)))?;

    if config.series.is_empty() {
        return Err(VizError::validation(
            "Invalid chart JSON: at least one series is required.",
        ));
    }
    Ok(config)
}

fn validate_svg(text: &str) -> Result<()> {
    let lower = text.to_ascii_lowercase();
    let Some(start) = lower.find("<svg") else {
        return Err(VizError::validation("SVG markup must contain an <svg> element."));
    };
    let self_closing = lower[start..]
        .find('>')
        .is_some_and(|end| lower[start..start + end].ends_with('/'));
    if !self_closing && !lower.contains("</svg>") {
        return Err(VizError::validation("SVG markup is missing its closing </svg> tag."));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChartKind;

    #[test]
    fn test_diagram_edits_are_normalized() {
        let content = parse_edited_source(VisualizationKind::Diagram, "graph TD\nA[Go]").unwrap();
        assert_eq!(
            content,
            VisualizationContent::Diagram {
                mermaid_code: "graph TD\nA[\"Go\"]".to_string()
            }
        );
    }

    #[test]
    fn test_empty_source_rejected() {
        let err = parse_edited_source(VisualizationKind::Diagram, "   \n").unwrap_err();
        assert!(matches!(err, VizError::Validation(_)));
    }

    #[test]
    fn test_chart_edit_requires_valid_json() {
        let err = parse_edited_source(VisualizationKind::Chart, "{\"type\": \"bar\",").unwrap_err();
        assert!(err.user_message().starts_with("Invalid chart JSON"));

        let content = parse_edited_source(
            VisualizationKind::Chart,
            r#"{"type": "line", "data": [{"x": 1, "y": 2}], "series": [{"dataKey": "y"}]}"#,
        )
        .unwrap();
        let VisualizationContent::Chart { chart_config } = content else {
            panic!("expected chart");
        };
        assert_eq!(chart_config.kind, ChartKind::Line);
    }

    #[test]
    fn test_chart_without_series_rejected() {
        let err = parse_chart_config(r#"{"type": "bar", "data": [], "series": []}"#).unwrap_err();
        assert!(matches!(err, VizError::Validation(_)));
    }

    #[test]
    fn test_svg_checks() {
        assert!(parse_edited_source(VisualizationKind::RawImage, "<svg viewBox=\"0 0 1 1\"></svg>").is_ok());
        assert!(parse_edited_source(VisualizationKind::RawImage, "<SVG/>").is_ok());
        assert!(parse_edited_source(VisualizationKind::RawImage, "<div></div>").is_err());
        assert!(parse_edited_source(VisualizationKind::RawImage, "<svg><rect/>").is_err());
    }
}
