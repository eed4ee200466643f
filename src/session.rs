use crate::core::CompilerAnalysis;
use crate::playback::PlaybackEngine;
use crate::provider::{ProviderError, StudyProvider};
use chrono::{DateTime, Utc};
use tracing::{error, info};

/// An analysis together with when it arrived
#[derive(Debug, Clone)]
pub struct LoadedAnalysis {
    pub analysis: CompilerAnalysis,
    pub received_at: DateTime<Utc>,
}

/// The code visualizer view: one provider, the latest analysis and its playback.
///
/// `analyze` takes `&mut self`, so a session never has two requests in flight.
pub struct VisualizerSession {
    provider: Box<dyn StudyProvider>,
    current: Option<LoadedAnalysis>,
    playback: PlaybackEngine,
}

impl VisualizerSession {
    pub fn new(provider: Box<dyn StudyProvider>, speed_ms: u64) -> Self {
        Self {
            provider,
            current: None,
            playback: PlaybackEngine::new(speed_ms),
        }
    }

    pub fn current(&self) -> Option<&LoadedAnalysis> {
        self.current.as_ref()
    }

    pub fn playback(&self) -> &PlaybackEngine {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut PlaybackEngine {
        &mut self.playback
    }

    /// Ask the provider for a fresh analysis. On failure the previous
    /// analysis and its playback are left as they were.
    pub async fn analyze(
        &mut self,
        code: &str,
        language: &str,
        input: &str,
    ) -> Result<&LoadedAnalysis, ProviderError> {
        info!(
            "Analyzing {} lines of {} with {}/{}",
            code.lines().count(),
            language,
            self.provider.name(),
            self.provider.model()
        );
        let result = self.provider.analyze_code(code, language, input).await;
        match result {
            Ok(analysis) => Ok(self.replay(analysis)),
            Err(e) => {
                error!("Analysis failed: {}", e);
                Err(e)
            }
        }
    }

    /// Show an analysis without asking the provider
    pub fn replay(&mut self, analysis: CompilerAnalysis) -> &LoadedAnalysis {
        self.playback.load(analysis.animation_data.highlight_sequence.clone());
        info!(
            "Loaded analysis: {} trace steps, {} highlight events",
            analysis.state_table.len(),
            self.playback.len()
        );
        self.current.insert(LoadedAnalysis {
            analysis,
            received_at: Utc::now(),
        })
    }
}
