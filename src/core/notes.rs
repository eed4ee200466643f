use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    /// Index of the correct option (0-based)
    pub correct_answer: usize,
    pub explanation: String,
}

/// Generated notes for a programming topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteData {
    pub concept: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<String>>,
    pub syntax: String,
    pub flowchart_mermaid: String,
    pub example_program: String,
    pub error_prone_program: String,
    pub how_to_use: String,
    pub restrictions: String,
    pub use_cases: Vec<String>,
    pub quiz: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordDetail {
    pub keyword: String,
    pub concept: String,
    pub how_to_use: String,
    pub where_to_use: String,
    pub example: String,
}

/// Answers given to a quiz, keyed by question index
#[derive(Debug, Clone, Default)]
pub struct QuizSession {
    answers: HashMap<usize, usize>,
    submitted: bool,
}

impl QuizSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select an option; replaces any earlier choice. Ignored after submit.
    pub fn select(&mut self, question: usize, option: usize) {
        if self.submitted {
            return;
        }
        self.answers.insert(question, option);
    }

    pub fn answer(&self, question: usize) -> Option<usize> {
        self.answers.get(&question).copied()
    }

    pub fn submit(&mut self) {
        self.submitted = true;
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn reset(&mut self) {
        self.answers.clear();
        self.submitted = false;
    }

    /// Number of questions answered correctly
    pub fn score(&self, quiz: &[QuizQuestion]) -> usize {
        quiz.iter()
            .enumerate()
            .filter(|(idx, q)| self.answer(*idx) == Some(q.correct_answer))
            .count()
    }
}
