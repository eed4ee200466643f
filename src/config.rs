use crate::playback::{clamp_speed, DEFAULT_SPEED_MS};
use crate::provider::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::provider::ProviderError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Fallback variable consulted when the configured one is unset
const FALLBACK_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    Mock,
}

/// Persistent application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub provider: ProviderKind,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub default_language: String,
    pub playback_speed_ms: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Gemini,
            model: DEFAULT_MODEL.to_string(),
            api_key_env: "API_KEY".to_string(),
            api_base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 120,
            default_language: "JavaScript".to_string(),
            playback_speed_ms: DEFAULT_SPEED_MS,
        }
    }
}

impl AppSettings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ai-mentor").join("settings.json"))
    }

    /// Load from the default location, falling back to defaults
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path).unwrap_or_else(|e| {
                warn!("Ignoring settings file: {:#}", e);
                Self::default()
            }),
            _ => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut settings: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        settings.playback_speed_ms = clamp_speed(settings.playback_speed_ms);
        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path().context("No configuration directory on this system")?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Read the API key from the configured variable, then the fallback
    pub fn api_key(&self) -> Result<String, ProviderError> {
        [self.api_key_env.as_str(), FALLBACK_KEY_ENV]
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|key| !key.trim().is_empty())
            .ok_or_else(|| ProviderError::MissingApiKey(self.api_key_env.clone()))
    }
}
