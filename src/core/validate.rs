//! Boundary checks for documents produced by the model.
//!
//! Top-level required fields are strict: a document missing one is rejected.
//! The animation script is coerced instead, so playback always has something
//! renderable (possibly an empty sequence).

use crate::core::{
    AnimationData, AnimationNode, CodeSummary, CompilerAnalysis, ExecutionStep, HighlightEvent,
    HighlightSequence, KeywordDetail, NoteData,
};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("response does not match the expected schema: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// Analysis fields that are validated strictly
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisBody {
    ascii_flow: String,
    state_table: Vec<ExecutionStep>,
    execution_logic: String,
    mermaid_chart: String,
    narration: Vec<String>,
    output: String,
    #[serde(default)]
    summary: Option<CodeSummary>,
    #[serde(default)]
    animation_data: Option<Value>,
}

/// Empty model output is read as an empty object
fn non_empty(text: &str) -> &str {
    if text.trim().is_empty() {
        "{}"
    } else {
        text
    }
}

pub fn parse_analysis(text: &str) -> Result<CompilerAnalysis, SchemaError> {
    let body: AnalysisBody = serde_json::from_str(non_empty(text))?;
    let animation_data = coerce_animation(body.animation_data.as_ref());

    let dangling = animation_data.dangling_references();
    if dangling > 0 {
        warn!("{} highlight events reference unknown nodes", dangling);
    }

    Ok(CompilerAnalysis {
        ascii_flow: body.ascii_flow,
        state_table: body.state_table,
        execution_logic: body.execution_logic,
        mermaid_chart: body.mermaid_chart,
        narration: body.narration,
        output: body.output,
        summary: body.summary,
        animation_data,
    })
}

/// Coerce a raw `animationData` value. Never fails.
pub fn coerce_animation(raw: Option<&Value>) -> AnimationData {
    let Some(Value::Object(obj)) = raw else {
        warn!("animationData missing or not an object, using an empty animation");
        return AnimationData::default();
    };

    let nodes = match obj.get("nodes") {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .filter_map(|(idx, item)| {
                AnimationNode::deserialize(item)
                    .map_err(|e| warn!("Dropping animation node {}: {}", idx, e))
                    .ok()
            })
            .collect(),
        _ => {
            warn!("animationData.nodes is not an array");
            Vec::new()
        }
    };

    AnimationData {
        nodes,
        highlight_sequence: coerce_sequence(obj.get("highlightSequence")),
    }
}

/// A sequence with any malformed entry is treated as empty as a whole.
pub fn coerce_sequence(raw: Option<&Value>) -> HighlightSequence {
    let Some(Value::Array(items)) = raw else {
        warn!("highlightSequence missing or not an array");
        return Vec::new();
    };

    let mut sequence = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        let Some(node_id) = item.get("nodeId").and_then(Value::as_str) else {
            warn!("Highlight entry {} has no string nodeId, discarding sequence", idx);
            return Vec::new();
        };
        let event = HighlightEvent::new(node_id);
        sequence.push(match item.get("value").filter(|v| !v.is_null()) {
            Some(value) => event.with_value(value.clone()),
            None => event,
        });
    }
    sequence
}

pub fn parse_notes(text: &str) -> Result<NoteData, SchemaError> {
    let mut notes: NoteData = serde_json::from_str(non_empty(text))?;

    let before = notes.quiz.len();
    notes.quiz.retain(|q| q.correct_answer < q.options.len());
    if notes.quiz.len() != before {
        warn!(
            "Dropped {} quiz questions with an out-of-range answer",
            before - notes.quiz.len()
        );
    }
    Ok(notes)
}

pub fn parse_keywords(text: &str) -> Result<Vec<String>, SchemaError> {
    let text = if text.trim().is_empty() { "[]" } else { text };
    Ok(serde_json::from_str(text)?)
}

pub fn parse_keyword_detail(text: &str) -> Result<KeywordDetail, SchemaError> {
    Ok(serde_json::from_str(non_empty(text))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn analysis_json(animation: Value) -> String {
        json!({
            "asciiFlow": "start -> loop -> end",
            "stateTable": [
                {"step": 1, "line": 1, "variables": [{"name": "sum", "value": "0"}], "description": "init"}
            ],
            "executionLogic": "adds numbers",
            "mermaidChart": "graph TD; A-->B",
            "narration": ["sum starts at 0"],
            "output": "15",
            "animationData": animation
        })
        .to_string()
    }

    #[test]
    fn test_parse_valid_analysis() {
        let text = analysis_json(json!({
            "nodes": [
                {"id": "sum", "label": "sum", "type": "variable"},
                {"id": "loop", "label": "for i", "type": "loop"}
            ],
            "highlightSequence": [
                {"nodeId": "sum", "value": "0"},
                {"nodeId": "loop"},
                {"nodeId": "sum", "value": null}
            ]
        }));

        let analysis = parse_analysis(&text).unwrap();
        assert_eq!(analysis.state_table.len(), 1);
        assert_eq!(analysis.animation_data.nodes.len(), 2);

        let seq = &analysis.animation_data.highlight_sequence;
        assert_eq!(seq.len(), 3);
        assert_eq!(seq[0].value, Some(json!("0")));
        assert_eq!(seq[1].value, None);
        assert_eq!(seq[2].value, None);
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let text = json!({"asciiFlow": "x"}).to_string();
        assert!(parse_analysis(&text).is_err());
        assert!(parse_analysis("").is_err());
        assert!(parse_analysis("not json").is_err());
    }

    #[test]
    fn test_malformed_sequence_becomes_empty() {
        let text = analysis_json(json!({
            "nodes": [{"id": "a", "label": "a", "type": "variable"}],
            "highlightSequence": [{"nodeId": "a"}, {"node": "a"}, 7]
        }));
        let analysis = parse_analysis(&text).unwrap();
        assert!(analysis.animation_data.highlight_sequence.is_empty());
        assert_eq!(analysis.animation_data.nodes.len(), 1);
    }

    #[test]
    fn test_missing_animation_data_is_empty() {
        let mut doc: Value = serde_json::from_str(&analysis_json(json!(null))).unwrap();
        doc.as_object_mut().unwrap().remove("animationData");

        let analysis = parse_analysis(&doc.to_string()).unwrap();
        assert_eq!(analysis.animation_data, AnimationData::default());
    }

    #[test]
    fn test_bad_nodes_dropped_individually() {
        let data = coerce_animation(Some(&json!({
            "nodes": [
                {"id": "a", "label": "a", "type": "io"},
                {"id": "b"},
            ],
            "highlightSequence": "nope"
        })));
        assert_eq!(data.nodes.len(), 1);
        assert!(data.highlight_sequence.is_empty());
    }

    #[test]
    fn test_keywords_empty_text() {
        assert!(parse_keywords("").unwrap().is_empty());
        assert_eq!(
            parse_keywords(r#"["let", "for"]"#).unwrap(),
            vec!["let".to_string(), "for".to_string()]
        );
        assert!(parse_keywords(r#"{"a": 1}"#).is_err());
    }

    #[test]
    fn test_notes_drop_out_of_range_answers() {
        let text = json!({
            "concept": "loops",
            "syntax": "for (;;) {}",
            "flowchartMermaid": "graph TD; A-->B",
            "exampleProgram": "for (let i = 0; i < 3; i++) {}",
            "errorProneProgram": "for (;;) {}",
            "howToUse": "repeat work",
            "restrictions": "terminate",
            "useCases": ["iteration"],
            "quiz": [
                {"question": "ok", "options": ["a", "b"], "correctAnswer": 1, "explanation": ""},
                {"question": "bad", "options": ["a"], "correctAnswer": 3, "explanation": ""}
            ]
        })
        .to_string();

        let notes = parse_notes(&text).unwrap();
        assert_eq!(notes.quiz.len(), 1);
        assert_eq!(notes.types, None);
    }
}
