pub mod analysis;
pub mod notes;
pub mod validate;

pub use analysis::{
    AnimationData, AnimationNode, CodeSummary, CompilerAnalysis, ExecutionStep, HighlightEvent,
    HighlightSequence, NodeKind, VariableEntry,
};
pub use notes::{KeywordDetail, NoteData, QuizQuestion, QuizSession};
pub use validate::SchemaError;
