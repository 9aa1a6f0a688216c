//! Prompt text sent to the model

use viz_engine::GenerationRequest;

/// Instructions sent as the system turn of every request
pub const SYSTEM_PROMPT: &str = r#"You turn descriptions into visualizations.

Answer with a single JSON object and nothing else. Choose one visualizationType:

- "diagram": processes, structures, relationships, timelines. Put valid Mermaid source in "mermaidCode".
  Use flowchart, sequenceDiagram, classDiagram, stateDiagram-v2, erDiagram, gantt, mindmap, timeline, pie or usecaseDiagram.
  Never use zenuml or architecture-beta.
  Always wrap node labels in double quotes, e.g. A["Start here"].
  In class diagrams write enumerations as `class Name { <<enumeration>> }` and inheritance as `Child --|> Parent`.
- "chart": quantitative data. Put a chart definition in "chartConfig" with:
  "type" (bar, line, area, pie, scatter or radar), "data" (an array of flat records),
  "series" (an array of {"dataKey", "name", "color"}) and "xAxisKey" for the category field.
  For pie charts use one series; the values should sum to 100 when they are percentages.
- "rawImage": icons, logos or illustrations that neither of the above can express. Put a complete, self-contained <svg> element in "svgCode".

Always include a short "title" and a one or two sentence "explanation".
When an existing visualization is provided, revise it according to the request and keep everything the request does not mention."#;

/// User turn text for `request`
pub fn build_user_prompt(request: &GenerationRequest) -> String {
    match &request.context {
        Some(context) => format!(
            "Current visualization:\n{}\n\nRevise it as follows:\n{}",
            context, request.prompt
        ),
        None => request.prompt.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_prompt_passes_through() {
        let request = GenerationRequest::new("Flowchart of a user login process");
        assert_eq!(build_user_prompt(&request), "Flowchart of a user login process");
    }

    #[test]
    fn test_refinement_includes_context() {
        let request = GenerationRequest {
            prompt: "make it blue".to_string(),
            context: Some("{\"title\":\"Sales\"}".to_string()),
        };
        let text = build_user_prompt(&request);
        assert!(text.starts_with("Current visualization:\n{\"title\":\"Sales\"}"));
        assert!(text.ends_with("Revise it as follows:\nmake it blue"));
    }
}
