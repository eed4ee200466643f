use crate::core::{
    AnimationData, CompilerAnalysis, ExecutionStep, KeywordDetail, NodeKind, NoteData,
    QuizQuestion, QuizSession,
};
use crate::playback::PlaybackSnapshot;
use crate::ui::Tab;

/// Nodes per row of the animation grid
const GRID_COLUMNS: usize = 3;
const CELL_WIDTH: usize = 20;
const MAX_LABEL: usize = 14;

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
        cut.push('~');
        cut
    }
}

fn heading(title: &str) -> String {
    format!("== {} ==", title)
}

fn kind_marker(kind: NodeKind) -> char {
    match kind {
        NodeKind::Variable => 'v',
        NodeKind::Loop => 'L',
        NodeKind::Condition => '?',
        NodeKind::Io => '>',
        NodeKind::Other => '*',
    }
}

pub fn transport_line(snapshot: &PlaybackSnapshot) -> String {
    let state = &snapshot.state;
    if snapshot.len == 0 {
        return format!("No animation steps | {} ms/step", state.speed_ms);
    }
    let mode = if state.is_playing { "> Playing" } else { "|| Paused" };
    format!(
        "{} | Step {} / {} | {} ms/step",
        mode,
        state.current_index + 1,
        snapshot.len,
        state.speed_ms
    )
}

/// Node grid with the focused node bracketed and its value underneath
pub fn render_animation(data: &AnimationData, snapshot: &PlaybackSnapshot) -> String {
    let active = snapshot.event.as_ref();
    let mut lines = vec![heading(Tab::Animation.title())];

    if data.nodes.is_empty() {
        lines.push("(no nodes)".to_string());
    }

    for row in data.nodes.chunks(GRID_COLUMNS) {
        let mut labels = String::new();
        let mut values = String::new();
        for node in row {
            let is_active = active.is_some_and(|e| e.node_id == node.id);
            let label = format!("{} {}", kind_marker(node.kind), truncate(&node.label, MAX_LABEL));
            let cell = if is_active {
                format!("[{}]", label)
            } else {
                format!(" {} ", label)
            };
            labels.push_str(&format!("{:<width$}", cell, width = CELL_WIDTH));

            let value = active
                .filter(|_| is_active)
                .and_then(|e| e.display_value())
                .map(|v| format!("  = {}", truncate(&v, MAX_LABEL)))
                .unwrap_or_default();
            values.push_str(&format!("{:<width$}", value, width = CELL_WIDTH));
        }
        lines.push(labels.trim_end().to_string());
        if !values.trim().is_empty() {
            lines.push(values.trim_end().to_string());
        }
    }

    if let Some(event) = active {
        if data.node(&event.node_id).is_none() {
            lines.push(format!("Focus: {} (not in diagram)", event.node_id));
        }
    }
    lines.push(transport_line(snapshot));
    lines.join("\n")
}

pub fn render_state_table(steps: &[ExecutionStep]) -> String {
    let mut lines = vec![
        heading(Tab::StateTable.title()),
        format!("{:>4}  {:>4}  {:<32}  {}", "Step", "Line", "Variables", "Action"),
    ];
    if steps.is_empty() {
        lines.push("(empty)".to_string());
    }
    for step in steps {
        lines.push(format!(
            "{:>4}  {:>4}  {:<32}  {}",
            step.step,
            step.line,
            step.variables_inline(),
            step.description
        ));
    }
    lines.join("\n")
}

pub fn render_narration(narration: &[String]) -> String {
    let mut lines = vec![heading(Tab::Narration.title())];
    for (idx, step) in narration.iter().enumerate() {
        lines.push(format!("{:>3}. {}", idx + 1, step));
    }
    lines.join("\n")
}

/// Render one analysis view. The animation view needs the playback snapshot.
pub fn render_tab(analysis: &CompilerAnalysis, tab: Tab, snapshot: &PlaybackSnapshot) -> String {
    match tab {
        Tab::Flowchart => format!("{}\n{}", heading(tab.title()), analysis.mermaid_chart),
        Tab::AsciiFlow => format!("{}\n{}", heading(tab.title()), analysis.ascii_flow),
        Tab::StateTable => render_state_table(&analysis.state_table),
        Tab::Logic => {
            let mut text = format!("{}\n{}", heading(tab.title()), analysis.execution_logic);
            if let Some(summary) = &analysis.summary {
                text.push_str(&format!(
                    "\n\nFunctions: {}\nVariables: {}\nInputs: {}",
                    summary.functions.join(", "),
                    summary.variables.join(", "),
                    summary.inputs.join(", ")
                ));
            }
            text
        }
        Tab::Animation => render_animation(&analysis.animation_data, snapshot),
        Tab::Narration => render_narration(&analysis.narration),
        Tab::Output => {
            let output = if analysis.output.is_empty() {
                "(no standard output generated)"
            } else {
                analysis.output.as_str()
            };
            format!("{}\n{}", heading(tab.title()), output)
        }
    }
}

pub fn render_notes(topic: &str, notes: &NoteData) -> String {
    let mut lines = vec![heading(topic), notes.concept.clone()];

    if let Some(types) = notes.types.as_ref().filter(|t| !t.is_empty()) {
        lines.push(String::new());
        lines.push("Types:".to_string());
        lines.extend(types.iter().map(|t| format!("  - {}", t)));
    }

    let sections = [
        ("Syntax", &notes.syntax),
        ("Flowchart (Mermaid)", &notes.flowchart_mermaid),
        ("Example", &notes.example_program),
        ("Common mistake", &notes.error_prone_program),
        ("How to use", &notes.how_to_use),
        ("Restrictions", &notes.restrictions),
    ];
    for (title, body) in sections {
        lines.push(String::new());
        lines.push(format!("{}:", title));
        lines.push(body.to_string());
    }

    lines.push(String::new());
    lines.push("Use cases:".to_string());
    lines.extend(notes.use_cases.iter().map(|u| format!("  - {}", u)));
    lines.join("\n")
}

pub fn render_question(index: usize, question: &QuizQuestion) -> String {
    let mut lines = vec![format!("Q{}. {}", index + 1, question.question)];
    for (idx, option) in question.options.iter().enumerate() {
        lines.push(format!("  {}) {}", idx + 1, option));
    }
    lines.join("\n")
}

pub fn render_quiz_result(quiz: &[QuizQuestion], session: &QuizSession) -> String {
    if !session.is_submitted() {
        let answered = (0..quiz.len()).filter(|idx| session.answer(*idx).is_some()).count();
        return format!("Not submitted yet, {} / {} answered", answered, quiz.len());
    }
    let mut lines = Vec::new();
    for (idx, question) in quiz.iter().enumerate() {
        let correct = question
            .options
            .get(question.correct_answer)
            .map(String::as_str)
            .unwrap_or("?");
        let verdict = match session.answer(idx) {
            Some(answer) if answer == question.correct_answer => "correct".to_string(),
            Some(_) => format!("wrong, answer: {}", correct),
            None => format!("skipped, answer: {}", correct),
        };
        lines.push(format!("Q{}: {}. {}", idx + 1, verdict, question.explanation));
    }
    lines.push(format!("Score: {} / {}", session.score(quiz), quiz.len()));
    lines.join("\n")
}

pub fn render_keywords(language: &str, keywords: &[String]) -> String {
    let mut lines = vec![heading(&format!("{} keywords", language))];
    for row in keywords.chunks(4) {
        let cells: Vec<String> = row.iter().map(|k| format!("{:<18}", k)).collect();
        lines.push(cells.concat().trim_end().to_string());
    }
    lines.join("\n")
}

pub fn render_keyword_detail(detail: &KeywordDetail) -> String {
    [
        heading(&detail.keyword),
        detail.concept.clone(),
        String::new(),
        "How to use:".to_string(),
        detail.how_to_use.clone(),
        String::new(),
        "Where to use:".to_string(),
        detail.where_to_use.clone(),
        String::new(),
        "Example:".to_string(),
        detail.example.clone(),
    ]
    .join("\n")
}
