//! Decoding of the model's answer into a [`VisualizationResult`]

use serde::Deserialize;
use serde_json::Value;

use viz_engine::normalize::{clean_transport_artifacts, header_token, normalize_diagram};
use viz_engine::{ChartConfig, GenerationError, VisualizationContent, VisualizationResult};

use crate::constants::UNSUPPORTED_DIAGRAMS;

/// The JSON object the model is asked to produce. Everything is optional
/// here so a missing field is reported by name instead of as a serde error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVisualization {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    visualization_type: Option<String>,
    #[serde(default)]
    mermaid_code: Option<String>,
    #[serde(default)]
    chart_config: Option<Value>,
    #[serde(default)]
    svg_code: Option<String>,
}

/// Turn candidate text into a visualization.
///
/// Diagram source comes back already normalized.
pub fn decode_visualization(text: &str) -> Result<VisualizationResult, GenerationError> {
    let json = strip_json_fence(text);
    if json.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    let raw: RawVisualization = serde_json::from_str(json)
        .map_err(|e| GenerationError::MalformedResponse(format!("invalid JSON: {}", e)))?;

    let kind = raw
        .visualization_type
        .as_deref()
        .ok_or_else(|| missing("visualizationType"))?;

    let content = match kind {
        "diagram" => {
            let code = non_blank(raw.mermaid_code).ok_or_else(|| missing("mermaidCode"))?;
            reject_unsupported(&code)?;
            VisualizationContent::Diagram {
                mermaid_code: normalize_diagram(&code),
            }
        }
        "chart" => {
            let value = raw.chart_config.ok_or_else(|| missing("chartConfig"))?;
            let chart_config: ChartConfig = serde_json::from_value(value).map_err(|e| {
                GenerationError::MalformedResponse(format!("invalid chartConfig: {}", e))
            })?;
            VisualizationContent::Chart { chart_config }
        }
        "rawImage" => {
            let svg_code = non_blank(raw.svg_code).ok_or_else(|| missing("svgCode"))?;
            VisualizationContent::RawImage { svg_code }
        }
        other => {
            return Err(GenerationError::MalformedResponse(format!(
                "unknown visualizationType '{}'",
                other
            )))
        }
    };

    let mut result = VisualizationResult::new(raw.title.unwrap_or_default(), content);
    result.explanation = raw.explanation.unwrap_or_default();
    result.id = non_blank(raw.id);
    Ok(result)
}

fn reject_unsupported(code: &str) -> Result<(), GenerationError> {
    let header = header_token(&clean_transport_artifacts(code));
    if UNSUPPORTED_DIAGRAMS
        .iter()
        .any(|family| header.eq_ignore_ascii_case(family))
    {
        log::warn!("Model produced unsupported diagram family '{}'", header);
        return Err(GenerationError::UnsupportedDiagram(header));
    }
    Ok(())
}

/// Models sometimes wrap JSON output in a ```json fence despite the MIME type
fn strip_json_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest.trim_start_matches("json"),
    };
    body.trim_end().trim_end_matches("```").trim()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn missing(field: &str) -> GenerationError {
    GenerationError::MalformedResponse(format!("missing {}", field))
}

#[cfg(test)]
mod tests {
    use viz_engine::ChartKind;

    use super::*;

    #[test]
    fn test_decode_diagram_is_normalized() {
        let text = r#"{
            "title": "Login",
            "explanation": "How a user logs in.",
            "visualizationType": "diagram",
            "mermaidCode": "graph TD\n  A[Start] --> B{Valid?}"
        }"#;
        let result = decode_visualization(text).unwrap();
        assert_eq!(result.title, "Login");
        assert_eq!(result.explanation, "How a user logs in.");
        assert!(result.id.is_none());
        assert_eq!(
            result.content,
            VisualizationContent::Diagram {
                mermaid_code: "graph TD\n  A[\"Start\"] --> B{\"Valid?\"}".to_string()
            }
        );
    }

    #[test]
    fn test_decode_chart() {
        let text = r#"```json
{"title":"Share","explanation":"","visualizationType":"chart",
 "chartConfig":{"type":"pie","data":[{"name":"A","value":60},{"name":"B","value":40}],
 "series":[{"dataKey":"value"}]}}
```"#;
        let result = decode_visualization(text).unwrap();
        let VisualizationContent::Chart { chart_config } = result.content else {
            panic!("expected chart");
        };
        assert_eq!(chart_config.kind, ChartKind::Pie);
        assert_eq!(chart_config.series_total("value"), 100.0);
    }

    #[test]
    fn test_decode_raw_image() {
        let text = r#"{"title":"Dot","visualizationType":"rawImage","svgCode":"<svg><circle r=\"1\"/></svg>"}"#;
        let result = decode_visualization(text).unwrap();
        assert_eq!(result.kind().as_str(), "rawImage");
        assert_eq!(result.explanation, "");
    }

    #[test]
    fn test_empty_and_malformed() {
        assert_eq!(decode_visualization("  "), Err(GenerationError::EmptyResponse));
        assert!(matches!(
            decode_visualization("not json"),
            Err(GenerationError::MalformedResponse(_))
        ));
        assert_eq!(
            decode_visualization(r#"{"title":"x","visualizationType":"chart"}"#),
            Err(GenerationError::MalformedResponse("missing chartConfig".to_string()))
        );
        assert_eq!(
            decode_visualization(r#"{"title":"x","visualizationType":"diagram","mermaidCode":" "}"#),
            Err(GenerationError::MalformedResponse("missing mermaidCode".to_string()))
        );
        assert!(matches!(
            decode_visualization(r#"{"title":"x","visualizationType":"video"}"#),
            Err(GenerationError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_unsupported_diagram_families() {
        let zenuml = r#"{"title":"x","visualizationType":"diagram","mermaidCode":"zenuml\n  A.call()"}"#;
        assert_eq!(
            decode_visualization(zenuml),
            Err(GenerationError::UnsupportedDiagram("zenuml".to_string()))
        );

        let architecture = r#"{"title":"x","visualizationType":"diagram","mermaidCode":"```mermaid\narchitecture-beta\n  service db(database)\n```"}"#;
        assert_eq!(
            decode_visualization(architecture),
            Err(GenerationError::UnsupportedDiagram("architecture-beta".to_string()))
        );
    }

    #[test]
    fn test_strip_json_fence() {
        assert_eq!(strip_json_fence("```json\n{}\n```"), "{}");
        assert_eq!(strip_json_fence("```{}```"), "{}");
        assert_eq!(strip_json_fence(" {} "), "{}");
    }
}
