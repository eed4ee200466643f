pub mod gemini;
pub mod mock;
pub mod prompts;

pub use gemini::GeminiProvider;
pub use mock::MockProvider;

use crate::config::{AppSettings, ProviderKind};
use crate::core::{validate, CompilerAnalysis, KeywordDetail, NoteData, SchemaError};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;
use tracing::info;

/// Errors that can occur while asking the model for content
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Provider returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("No API key found in ${0}")]
    MissingApiKey(String),

    #[error("Provider returned no candidates")]
    EmptyResponse,

    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

/// Which document a structured request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Notes,
    Keywords,
    KeywordDetail,
    Analysis,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestKind::Notes => "notes",
            RequestKind::Keywords => "keyword list",
            RequestKind::KeywordDetail => "keyword explanation",
            RequestKind::Analysis => "code analysis",
        };
        f.write_str(name)
    }
}

/// A prompt plus the JSON schema the answer must follow
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    pub kind: RequestKind,
    pub prompt: String,
    pub schema: serde_json::Value,
}

/// Source of generated learning content.
///
/// Implementations only provide [`StudyProvider::generate`], which returns the
/// raw JSON text; the typed calls validate it at this boundary.
#[async_trait]
pub trait StudyProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model used for generation
    fn model(&self) -> &str;

    /// Run one structured-output request and return the response text
    async fn generate(&self, request: &StructuredRequest) -> Result<String, ProviderError>;

    async fn generate_notes(&self, topic: &str) -> Result<NoteData, ProviderError> {
        let text = self.generate(&prompts::notes(topic)).await?;
        Ok(validate::parse_notes(&text)?)
    }

    async fn list_keywords(&self, language: &str) -> Result<Vec<String>, ProviderError> {
        let text = self.generate(&prompts::keywords(language)).await?;
        Ok(validate::parse_keywords(&text)?)
    }

    async fn explain_keyword(
        &self,
        language: &str,
        keyword: &str,
    ) -> Result<KeywordDetail, ProviderError> {
        let text = self.generate(&prompts::keyword_detail(language, keyword)).await?;
        Ok(validate::parse_keyword_detail(&text)?)
    }

    async fn analyze_code(
        &self,
        code: &str,
        language: &str,
        input: &str,
    ) -> Result<CompilerAnalysis, ProviderError> {
        let text = self.generate(&prompts::analysis(code, language, input)).await?;
        Ok(validate::parse_analysis(&text)?)
    }
}

/// Build the provider selected by the settings
pub fn from_settings(
    settings: &AppSettings,
    offline: bool,
) -> Result<Box<dyn StudyProvider>, ProviderError> {
    let kind = if offline { ProviderKind::Mock } else { settings.provider };
    info!("Using {:?} provider", kind);

    match kind {
        ProviderKind::Mock => Ok(Box::new(MockProvider::new())),
        ProviderKind::Gemini => {
            let api_key = settings.api_key()?;
            Ok(Box::new(GeminiProvider::new(
                api_key,
                &settings.model,
                &settings.api_base_url,
                settings.request_timeout(),
            )?))
        }
    }
}
