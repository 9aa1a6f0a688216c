//! Wire types for the `generateContent` endpoint

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Request body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub system_instruction: Content,
    pub contents: Vec<Content>,
    pub generation_config: GenerationParameters,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn text(role: Option<&str>, text: impl Into<String>) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: Some(text.into()),
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParameters {
    pub response_mime_type: String,
    /// Plain JSON Schema; unlike `responseSchema` it allows records with
    /// arbitrary keys through `additionalProperties`
    #[serde(rename = "responseJsonSchema")]
    pub response_schema: Value,
    pub temperature: f32,
}

/// Response body; only the fields we read
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        Some(text)
    }
}

/// Error envelope returned with non-success statuses
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: String,
}

/// Schema the model's JSON answer must follow.
///
/// Chart records are open objects: the model picks the category and value
/// keys, and `series[].dataKey` / `xAxisKey` refer to them.
pub fn response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "title": { "type": "string" },
            "explanation": { "type": "string" },
            "visualizationType": {
                "type": "string",
                "enum": ["diagram", "chart", "rawImage"]
            },
            "mermaidCode": { "type": "string" },
            "svgCode": { "type": "string" },
            "chartConfig": {
                "type": "object",
                "properties": {
                    "type": {
                        "type": "string",
                        "enum": ["bar", "line", "area", "pie", "scatter", "radar"]
                    },
                    "data": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "additionalProperties": { "type": ["string", "number"] }
                        }
                    },
                    "series": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "dataKey": { "type": "string" },
                                "name": { "type": "string" },
                                "color": { "type": "string" },
                                "stackId": { "type": "string" }
                            },
                            "required": ["dataKey"]
                        }
                    },
                    "xAxisKey": { "type": "string" },
                    "showLegend": { "type": "boolean" },
                    "showGrid": { "type": "boolean" },
                    "showTooltip": { "type": "boolean" }
                },
                "required": ["type", "data", "series"]
            }
        },
        "required": ["title", "explanation", "visualizationType"]
    })
}
