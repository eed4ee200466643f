use super::{ProviderError, RequestKind, StructuredRequest, StudyProvider};
use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Offline provider returning canned documents
///
/// Used for `--offline` runs and tests. The analysis answer can be replaced
/// and the provider can be switched into a failing state.
pub struct MockProvider {
    analysis: Option<String>,
    failing: AtomicBool,
    requests: AtomicUsize,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            analysis: None,
            failing: AtomicBool::new(false),
            requests: AtomicUsize::new(0),
        }
    }

    /// Answer analysis requests with this raw text instead of the sample
    #[cfg(test)]
    pub fn with_analysis(mut self, raw: impl Into<String>) -> Self {
        self.analysis = Some(raw.into());
        self
    }

    #[cfg(test)]
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of requests served so far (failed ones included)
    #[cfg(test)]
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn canned(&self, request: &StructuredRequest) -> String {
        match request.kind {
            RequestKind::Notes => sample_notes(),
            RequestKind::Keywords => json!([
                "let", "const", "var", "if", "else", "for", "while", "function", "return",
                "class", "console.log", "Array.map"
            ])
            .to_string(),
            RequestKind::KeywordDetail => {
                let keyword = quoted_word(&request.prompt).unwrap_or("let");
                json!({
                    "keyword": keyword,
                    "concept": format!("`{}` is a core building block of the language.", keyword),
                    "howToUse": format!("Write `{}` where the grammar expects it.", keyword),
                    "whereToUse": "Anywhere the construct makes the intent clearer.",
                    "example": format!("// using {}\n", keyword)
                })
                .to_string()
            }
            RequestKind::Analysis => self.analysis.clone().unwrap_or_else(sample_analysis),
        }
    }
}

/// First `"..."` quoted word in a prompt
fn quoted_word(prompt: &str) -> Option<&str> {
    let start = prompt.find('"')? + 1;
    let len = prompt[start..].find('"')?;
    Some(&prompt[start..start + len])
}

#[async_trait]
impl StudyProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "canned"
    }

    async fn generate(&self, request: &StructuredRequest) -> Result<String, ProviderError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ProviderError::Unavailable("mock provider set to fail".to_string()));
        }
        Ok(self.canned(request))
    }
}

fn sample_notes() -> String {
    json!({
        "concept": "A for loop repeats a block while a condition holds, updating a counter each pass.",
        "types": ["for", "for...of", "for...in"],
        "syntax": "for (init; condition; update) {\n  body\n}",
        "flowchartMermaid": "graph TD\n  A[init] --> B{condition}\n  B -- true --> C[body]\n  C --> D[update]\n  D --> B\n  B -- false --> E[end]",
        "exampleProgram": "for (let i = 1; i <= 3; i++) {\n  console.log(i);\n}",
        "errorProneProgram": "for (let i = 1; i <= 3; i--) {\n  console.log(i);\n}",
        "howToUse": "Pick a counter, a stopping condition and an update that moves toward it.",
        "restrictions": "The update must eventually make the condition false.",
        "useCases": ["Summing values", "Walking an array", "Retrying a bounded number of times"],
        "quiz": [
            {
                "question": "How many times does `for (let i = 0; i < 3; i++)` run its body?",
                "options": ["2", "3", "4", "Forever"],
                "correctAnswer": 1,
                "explanation": "i takes the values 0, 1 and 2."
            },
            {
                "question": "Which part of a for loop runs after every iteration?",
                "options": ["init", "condition", "update", "none"],
                "correctAnswer": 2,
                "explanation": "The update expression runs after the body, before the next condition check."
            },
            {
                "question": "What happens if the condition never becomes false?",
                "options": ["Compile error", "Infinite loop", "The loop runs once", "It is skipped"],
                "correctAnswer": 1,
                "explanation": "Nothing stops the loop, so it runs forever."
            }
        ]
    })
    .to_string()
}

fn sample_analysis() -> String {
    let mut state_table = vec![json!({
        "step": 1, "line": 2,
        "variables": [{"name": "sum", "value": "0"}],
        "description": "sum is initialised to 0"
    })];
    let mut sequence = vec![json!({"nodeId": "sum", "value": "0"})];
    let mut narration = vec!["We start with sum = 0.".to_string()];
    let mut sum = 0;
    for i in 1..=5 {
        sum += i;
        state_table.push(json!({
            "step": i + 1, "line": 4,
            "variables": [{"name": "i", "value": i.to_string()}, {"name": "sum", "value": sum.to_string()}],
            "description": format!("add {} to sum", i)
        }));
        sequence.push(json!({"nodeId": "loop", "value": i.to_string()}));
        sequence.push(json!({"nodeId": "cond", "value": "true"}));
        sequence.push(json!({"nodeId": "sum", "value": sum.to_string()}));
        narration.push(format!("i is {}, so sum becomes {}.", i, sum));
    }
    sequence.push(json!({"nodeId": "cond", "value": "false"}));
    sequence.push(json!({"nodeId": "out", "value": sum.to_string()}));
    narration.push(format!("The loop ends and {} is printed.", sum));

    json!({
        "asciiFlow": "[sum = 0]\n    |\n    v\n[i <= 5?] --no--> [print sum]\n    | yes\n    v\n[sum += i; i++] --> back to [i <= 5?]",
        "stateTable": state_table,
        "executionLogic": "The loop visits i = 1..5 and accumulates each value into sum.\n\nReal-world analogy: dropping five coins of value 1, 2, 3, 4 and 5 into a jar one at a time, then counting the jar.",
        "mermaidChart": "graph TD\n  A[sum = 0] --> B{i <= 5}\n  B -- yes --> C[sum += i]\n  C --> D[i++]\n  D --> B\n  B -- no --> E[print sum]",
        "narration": narration,
        "output": sum.to_string(),
        "summary": {"functions": ["console.log"], "variables": ["sum", "i"], "inputs": []},
        "animationData": {
            "nodes": [
                {"id": "sum", "label": "sum", "type": "variable"},
                {"id": "loop", "label": "for i", "type": "loop"},
                {"id": "cond", "label": "i <= 5", "type": "condition"},
                {"id": "out", "label": "console.log", "type": "io"}
            ],
            "highlightSequence": sequence
        }
    })
    .to_string()
}
