//! Source export of the current visualization

use crate::error::Result;
use crate::types::{VisualizationContent, VisualizationResult};

/// A downloadable file produced from a visualization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub contents: String,
}

/// Build the source file for `result`: `.mmd` for diagrams, `.json` for
/// chart configs and `.svg` for raw markup.
pub fn export_source(result: &VisualizationResult) -> Result<ExportFile> {
    let stem = slugify(&result.title);

    let (extension, mime_type, contents) = match &result.content {
        VisualizationContent::Diagram { mermaid_code } => {
            ("mmd", "text/vnd.mermaid", mermaid_code.clone())
        }
        VisualizationContent::Chart { chart_config } => (
            "json",
            "application/json",
            serde_json::to_string_pretty(chart_config)?,
        ),
        VisualizationContent::RawImage { svg_code } => ("svg", "image/svg+xml", svg_code.clone()),
    };

    let mut contents = contents;
    if !contents.ends_with('\n') {
        contents.push('\n');
    }

    Ok(ExportFile {
        file_name: format!("{stem}.{extension}"),
        mime_type,
        contents,
    })
}

/// Lowercase ASCII words joined by `-`
pub fn slugify(title: &str) -> String {
    let words: Vec<String> = title
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| word.to_ascii_lowercase())
        .collect();

    if words.is_empty() {
        "visualization".to_string()
    } else {
        words.join("-")
    }
}
