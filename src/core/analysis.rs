use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One moment of an execution trace where a single node is in focus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightEvent {
    /// Id of the animation node to highlight
    pub node_id: String,

    /// Value shown next to the node, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl HighlightEvent {
    pub fn new(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Value annotation in its JSON form (strings keep their quotes)
    pub fn display_value(&self) -> Option<String> {
        self.value.as_ref().map(|v| v.to_string())
    }
}

/// Ordered highlight events of one analysis
pub type HighlightSequence = Vec<HighlightEvent>;

/// Kind of node in the animation diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Variable,
    Loop,
    Condition,
    Io,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
}

/// Animation script: the diagram nodes and the order they light up in
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationData {
    pub nodes: Vec<AnimationNode>,
    pub highlight_sequence: HighlightSequence,
}

impl AnimationData {
    pub fn node(&self, id: &str) -> Option<&AnimationNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Number of highlight events pointing at ids that are not in `nodes`
    pub fn dangling_references(&self) -> usize {
        self.highlight_sequence
            .iter()
            .filter(|e| self.node(&e.node_id).is_none())
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableEntry {
    pub name: String,
    pub value: String,
}

/// A row of the state table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStep {
    pub step: i64,
    pub line: i64,
    pub variables: Vec<VariableEntry>,
    pub description: String,
}

impl ExecutionStep {
    /// Variables as `name=value; name=value`
    pub fn variables_inline(&self) -> String {
        self.variables
            .iter()
            .map(|v| format!("{}={}", v.name, v.value))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeSummary {
    #[serde(default)]
    pub functions: Vec<String>,
    #[serde(default)]
    pub variables: Vec<String>,
    #[serde(default)]
    pub inputs: Vec<String>,
}

/// Full analysis document returned for one code sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerAnalysis {
    pub ascii_flow: String,
    pub state_table: Vec<ExecutionStep>,
    pub execution_logic: String,
    pub mermaid_chart: String,
    pub narration: Vec<String>,
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<CodeSummary>,
    pub animation_data: AnimationData,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_value_matches_json_form() {
        assert_eq!(HighlightEvent::new("a").display_value(), None);
        assert_eq!(
            HighlightEvent::new("a").with_value("3").display_value().as_deref(),
            Some("\"3\"")
        );
        assert_eq!(
            HighlightEvent::new("a").with_value(15).display_value().as_deref(),
            Some("15")
        );
    }

    #[test]
    fn test_unknown_node_kind_is_preserved_as_other() {
        let node: AnimationNode =
            serde_json::from_value(json!({"id": "f", "label": "fn", "type": "function"})).unwrap();
        assert_eq!(node.kind, NodeKind::Other);

        let node: AnimationNode =
            serde_json::from_value(json!({"id": "i", "label": "i", "type": "loop"})).unwrap();
        assert_eq!(node.kind, NodeKind::Loop);
    }

    #[test]
    fn test_dangling_references() {
        let data = AnimationData {
            nodes: vec![AnimationNode {
                id: "sum".to_string(),
                label: "sum".to_string(),
                kind: NodeKind::Variable,
            }],
            highlight_sequence: vec![HighlightEvent::new("sum"), HighlightEvent::new("ghost")],
        };
        assert_eq!(data.dangling_references(), 1);
    }

    #[test]
    fn test_variables_inline() {
        let step = ExecutionStep {
            step: 1,
            line: 2,
            variables: vec![
                VariableEntry { name: "sum".to_string(), value: "0".to_string() },
                VariableEntry { name: "i".to_string(), value: "1".to_string() },
            ],
            description: "init".to_string(),
        };
        assert_eq!(step.variables_inline(), "sum=0; i=1");
    }
}
