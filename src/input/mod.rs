use crate::core::{validate, CompilerAnalysis};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

/// A code sample read from disk
#[derive(Debug, Clone)]
pub struct CodeSource {
    pub code: String,
    pub language: String,
}

/// Guess the language tag from a file extension
pub fn detect_language(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let language = match ext.as_str() {
        "js" | "mjs" | "cjs" => "JavaScript",
        "ts" => "TypeScript",
        "py" => "Python",
        "java" => "Java",
        "php" => "PHP",
        "r" => "R",
        "c" | "h" => "C",
        "cpp" | "cc" | "cxx" | "hpp" => "C++",
        "cs" => "C#",
        "rb" => "Ruby",
        "go" => "Go",
        "rs" => "Rust",
        "swift" => "Swift",
        "sql" => "SQL",
        _ => return None,
    };
    Some(language)
}

/// Load a code file. An explicit language wins over the extension, which
/// wins over `fallback_language`.
pub fn load_code(
    path: &Path,
    language: Option<&str>,
    fallback_language: &str,
) -> Result<CodeSource> {
    let code = fs::read_to_string(path)
        .with_context(|| format!("Failed to read code from {}", path.display()))?;
    if code.trim().is_empty() {
        anyhow::bail!("{} is empty", path.display());
    }

    let language = language
        .or_else(|| detect_language(path))
        .unwrap_or(fallback_language)
        .to_string();
    info!("Loaded {} bytes of {} from {}", code.len(), language, path.display());

    Ok(CodeSource { code, language })
}

/// Load a saved analysis document, applying the same checks as a live response
pub fn load_analysis(path: &Path) -> Result<CompilerAnalysis> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read analysis from {}", path.display()))?;
    validate::parse_analysis(&text)
        .with_context(|| format!("Invalid analysis document {}", path.display()))
}

pub fn save_analysis(path: &Path, analysis: &CompilerAnalysis) -> Result<()> {
    let json = serde_json::to_string_pretty(analysis)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Saved analysis to {}", path.display());
    Ok(())
}
