//! Heuristic repair of model-generated Mermaid source
//!
//! Models regularly emit diagram code that is almost, but not quite, what
//! the renderer accepts. This module cleans up transport artifacts and then
//! applies a small set of per-family line rewrites. It is a patch layer, not a
//! parser: the output is never checked for well-formedness.

mod class;
mod flowchart;
mod usecase;

use std::fmt;

pub use flowchart::normalize_flowchart_labels;

/// Structural syntax selected by the first token of a diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramFamily {
    Flowchart,
    Class,
    UseCase,
    Sequence,
    State,
    EntityRelationship,
    Other,
}

impl DiagramFamily {
    /// Classify source by the leading token of its first non-blank line
    pub fn detect(source: &str) -> Self {
        Self::from_header_token(&header_token(source))
    }

    fn from_header_token(token: &str) -> Self {
        let token = token.to_ascii_lowercase();
        match token.as_str() {
            "graph" | "flowchart" | "flowchart-elk" => Self::Flowchart,
            "classdiagram" | "classdiagram-v2" => Self::Class,
            "usecasediagram" | "usecase" => Self::UseCase,
            "sequencediagram" => Self::Sequence,
            "statediagram" | "statediagram-v2" => Self::State,
            "erdiagram" => Self::EntityRelationship,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for DiagramFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Flowchart => "flowchart",
            Self::Class => "class",
            Self::UseCase => "use-case",
            Self::Sequence => "sequence",
            Self::State => "state",
            Self::EntityRelationship => "er",
            Self::Other => "other",
        })
    }
}

/// Leading token of the first non-blank line, e.g. `graph` for `graph TD;`
pub fn header_token(source: &str) -> String {
    source
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .and_then(|line| line.split_whitespace().next())
        .map(|token| token.trim_end_matches(';').to_string())
        .unwrap_or_default()
}

/// Clean up and repair diagram source produced by a model.
///
/// Unknown families come back with only the transport cleanup applied.
pub fn normalize_diagram(raw: &str) -> String {
    let cleaned = clean_transport_artifacts(raw);

    let family = DiagramFamily::detect(&cleaned);
    log::debug!("Normalizing {} diagram ({} bytes)", family, cleaned.len());

    match family {
        DiagramFamily::Class => class::normalize(&cleaned),
        DiagramFamily::UseCase => usecase::normalize(&cleaned),
        DiagramFamily::Flowchart => flowchart::normalize_flowchart_labels(&cleaned),
        _ => cleaned,
    }
}

/// Undo escaping and wrapping that happens between the model and us:
/// escaped newlines, CR line endings, non-breaking spaces and code fences.
pub fn clean_transport_artifacts(raw: &str) -> String {
    let text = raw
        .replace("\\r\\n", "\n")
        .replace("\\n", "\n")
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\u{a0}', " ");

    strip_code_fence(text.trim()).trim().to_string()
}

fn strip_code_fence(text: &str) -> &str {
    let mut body = text;

    if body.starts_with("```") {
        body = match body.find('\n') {
            Some(pos) => &body[pos + 1..],
            // Fence with nothing after it
            None => "",
        };
    }

    let trimmed = body.trim_end();
    match trimmed.strip_suffix("```") {
        Some(rest) => rest,
        None => body,
    }
}
