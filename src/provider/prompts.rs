//! Prompts and response schemas for each structured request.
//!
//! Schemas use the upper-case type names of the Gemini `responseSchema` dialect.

use super::{RequestKind, StructuredRequest};
use serde_json::{json, Value};

fn string() -> Value {
    json!({ "type": "STRING" })
}

fn integer() -> Value {
    json!({ "type": "INTEGER" })
}

fn array_of(items: Value) -> Value {
    json!({ "type": "ARRAY", "items": items })
}

fn object(properties: Value, required: &[&str]) -> Value {
    json!({ "type": "OBJECT", "properties": properties, "required": required })
}

pub fn notes(topic: &str) -> StructuredRequest {
    let quiz_question = object(
        json!({
            "question": string(),
            "options": array_of(string()),
            "correctAnswer": {
                "type": "INTEGER",
                "description": "Index of the correct option (0-based)"
            },
            "explanation": string(),
        }),
        &["question", "options", "correctAnswer", "explanation"],
    );

    let schema = object(
        json!({
            "concept": string(),
            "types": array_of(string()),
            "syntax": string(),
            "flowchartMermaid": string(),
            "exampleProgram": string(),
            "errorProneProgram": string(),
            "howToUse": string(),
            "restrictions": string(),
            "useCases": array_of(string()),
            "quiz": array_of(quiz_question),
        }),
        &[
            "concept",
            "syntax",
            "flowchartMermaid",
            "exampleProgram",
            "errorProneProgram",
            "howToUse",
            "restrictions",
            "useCases",
            "quiz",
        ],
    );

    StructuredRequest {
        kind: RequestKind::Notes,
        prompt: format!(
            "Generate comprehensive programming notes for the topic: \"{topic}\".\n\
             The output must strictly follow this JSON format. Use Mermaid syntax for the flowchart.\n\
             Include an \"Exam\" section with 3-5 challenging multiple choice questions."
        ),
        schema,
    }
}

pub fn keywords(language: &str) -> StructuredRequest {
    StructuredRequest {
        kind: RequestKind::Keywords,
        prompt: format!(
            "List the most important reserved keywords and built-in functions for the \
             programming language: {language}. Return them as a simple JSON array of strings."
        ),
        schema: array_of(string()),
    }
}

pub fn keyword_detail(language: &str, keyword: &str) -> StructuredRequest {
    StructuredRequest {
        kind: RequestKind::KeywordDetail,
        prompt: format!("Explain the keyword or built-in \"{keyword}\" in the language {language}."),
        schema: object(
            json!({
                "keyword": string(),
                "concept": string(),
                "howToUse": string(),
                "whereToUse": string(),
                "example": string(),
            }),
            &["keyword", "concept", "howToUse", "whereToUse", "example"],
        ),
    }
}

pub fn analysis(code: &str, language: &str, input: &str) -> StructuredRequest {
    let variable = object(json!({ "name": string(), "value": string() }), &["name", "value"]);
    let step = object(
        json!({
            "step": integer(),
            "line": integer(),
            "variables": array_of(variable),
            "description": string(),
        }),
        &["step", "line", "variables", "description"],
    );
    let node = object(
        json!({ "id": string(), "label": string(), "type": string() }),
        &["id", "label", "type"],
    );
    let highlight = object(json!({ "nodeId": string(), "value": string() }), &["nodeId"]);

    let schema = object(
        json!({
            "asciiFlow": string(),
            "stateTable": array_of(step),
            "executionLogic": string(),
            "mermaidChart": string(),
            "narration": array_of(string()),
            "output": string(),
            "animationData": object(
                json!({
                    "nodes": array_of(node),
                    "highlightSequence": array_of(highlight),
                }),
                &["nodes", "highlightSequence"],
            ),
        }),
        &[
            "asciiFlow",
            "stateTable",
            "executionLogic",
            "mermaidChart",
            "narration",
            "output",
            "animationData",
        ],
    );

    StructuredRequest {
        kind: RequestKind::Analysis,
        prompt: format!(
            "Act as a visualizer compiler for the following code:\n\
             Language: {language}\n\
             Input: {input}\n\
             Code:\n\
             {code}\n\n\
             Perform a deep execution analysis and return a structured JSON response.\n\
             - stateTable: A step-by-step trace of variable changes. 'variables' should be an \
             array of {{name: string, value: string}} objects.\n\
             - asciiFlow: A simple text/ASCII visualization of the control path.\n\
             - mermaidChart: Advanced flow of logic (Mermaid string).\n\
             - narration: Array of human-readable steps.\n\
             - executionLogic: A detailed explanation of the logic, AND include a relatable \
             real-world analogy/example for better understanding.\n\
             - animationData: Specific sequence for UI nodes highlighting (variables, loops). \
             Node types are one of variable, loop, condition, io."
        ),
        schema,
    }
}
