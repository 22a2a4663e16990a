// Generation Service
// Article and story writing through the remote chat model

use thiserror::Error;
use tracing::{info, warn};

use super::providers::{ChatOptions, ProviderClient, ProviderError, TokenUsage};

const ARTICLE_SYSTEM_PROMPT: &str = "You are a professional article writer. Create well-structured, engaging articles with proper formatting. Always write at least 300 words.";

const STORY_SYSTEM_PROMPT: &str = "You are a creative writer who generates engaging stories and articles. Always provide well-structured, creative content that matches the user's requested style and length.";

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("API configuration error. Please check your OpenAI API key.")]
    Configuration,
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,
    #[error("Upstream error: {0}")]
    Upstream(String),
    #[error("No content received from AI")]
    EmptyContent,
}

impl From<ProviderError> for GenerationError {
    fn from(err: ProviderError) -> Self {
        match &err {
            ProviderError::MissingApiKey => return GenerationError::Configuration,
            ProviderError::MissingContent => return GenerationError::EmptyContent,
            _ => {}
        }
        match err.status() {
            Some(401) | Some(403) => return GenerationError::Configuration,
            Some(429) => return GenerationError::RateLimited,
            _ => {}
        }
        let message = err.to_string();
        let lower = message.to_lowercase();
        if lower.contains("api key") || lower.contains("authorization") {
            GenerationError::Configuration
        } else if lower.contains("rate limit") {
            GenerationError::RateLimited
        } else {
            GenerationError::Upstream(message)
        }
    }
}

/// Sampling and validation limits for generation.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub model: String,
    pub max_topic_chars: usize,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: super::providers::OPENAI_DEFAULT_MODEL.to_string(),
            max_topic_chars: 100,
            max_tokens: 1000,
            temperature: 0.7,
        }
    }
}

/// Trimmed topic, or the reason it cannot be used.
pub fn validate_topic(topic: &str, max_chars: usize) -> Result<&str, GenerationError> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(GenerationError::InvalidInput("Topic is required".to_string()));
    }
    if topic.chars().count() > max_chars {
        return Err(GenerationError::InvalidInput(format!(
            "Topic must be {} characters or less",
            max_chars
        )));
    }
    Ok(topic)
}

pub fn build_article_prompt(topic: &str) -> String {
    format!("Write a comprehensive article about: {}", topic)
}

pub async fn generate_article(
    client: &ProviderClient,
    api_key: Option<&str>,
    topic: &str,
    settings: &GenerationSettings,
) -> Result<String, GenerationError> {
    let topic = validate_topic(topic, settings.max_topic_chars)?;
    let api_key = api_key.ok_or(GenerationError::Configuration)?;

    info!(topic_chars = topic.chars().count(), model = %settings.model, "[GENERATE] article requested");

    let options = ChatOptions {
        max_tokens: settings.max_tokens,
        temperature: settings.temperature,
    };
    let result = client
        .call_chat(&settings.model, api_key, ARTICLE_SYSTEM_PROMPT, &build_article_prompt(topic), options)
        .await
        .map_err(|e| {
            warn!(error = %e, "[GENERATE] article generation failed");
            GenerationError::from(e)
        })?;

    info!(latency_ms = result.latency_ms, "[GENERATE] article done");
    Ok(result.content)
}

/// Free-form generation; `max_tokens`/`temperature` override the settings.
pub async fn generate_story(
    client: &ProviderClient,
    api_key: Option<&str>,
    prompt: &str,
    max_tokens: Option<u32>,
    temperature: Option<f64>,
    settings: &GenerationSettings,
) -> Result<(String, Option<TokenUsage>), GenerationError> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(GenerationError::InvalidInput("Prompt is required".to_string()));
    }
    let api_key = api_key.ok_or(GenerationError::Configuration)?;

    let options = ChatOptions {
        max_tokens: max_tokens.filter(|t| *t > 0).unwrap_or(settings.max_tokens),
        temperature: temperature
            .filter(|t| t.is_finite())
            .map(|t| t.clamp(0.0, 2.0))
            .unwrap_or(settings.temperature),
    };

    let result = client
        .call_chat(&settings.model, api_key, STORY_SYSTEM_PROMPT, prompt, options)
        .await
        .map_err(|e| {
            warn!(error = %e, "[GENERATE] story generation failed");
            GenerationError::from(e)
        })?;

    Ok((result.content, result.usage))
}
