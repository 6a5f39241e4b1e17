//! OpenAI configuration

use docqa_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";

/// Configuration for the OpenAI client
///
/// The API key is optional here on purpose: a missing credential only
/// surfaces when a request needs it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAIConfig {
    #[serde(skip_serializing, default)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub chat_model: String,
    pub embedding_model: String,
    pub temperature: Option<f32>,
    pub timeout_secs: Option<u64>,
}

impl OpenAIConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("OPENAI_API_KEY").filter(|key| !key.trim().is_empty());

        let base_url = lookup("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = normalize_base_url(&base_url)?;

        let chat_model = lookup("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string());

        let embedding_model = lookup("OPENAI_EMBEDDING_MODEL")
            .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string());

        let timeout_secs = match lookup("OPENAI_TIMEOUT_SECS") {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
                Error::Configuration(format!("OPENAI_TIMEOUT_SECS must be a whole number, got '{}'", raw))
            })?),
            None => None,
        };

        Ok(Self {
            api_key,
            base_url,
            chat_model,
            embedding_model,
            temperature: Some(0.1),
            timeout_secs,
        })
    }

    /// Create configuration with explicit values
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            base_url: DEFAULT_BASE_URL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            temperature: Some(0.1),
            timeout_secs: None,
        }
    }

    /// Point the client at another OpenAI-compatible endpoint
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.base_url = normalize_base_url(base_url)?;
        Ok(self)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let parsed = url::Url::parse(raw.trim())
        .map_err(|e| Error::Configuration(format!("invalid OPENAI_BASE_URL '{}': {}", raw, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::Configuration(format!(
            "OPENAI_BASE_URL must use http or https, got '{}'",
            parsed.scheme()
        )));
    }
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}
