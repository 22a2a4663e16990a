// AI Provider Service
// OpenAI-compatible chat completion calls

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::{Duration, Instant};
use thiserror::Error;

pub const OPENAI_DEFAULT_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_PROVIDER: &str = "openai";

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
    #[error("Missing content in response")]
    MissingContent,
    #[error("JSON parse error: {0}")]
    JsonError(String),
    #[error("API key not configured")]
    MissingApiKey,
}

impl ProviderError {
    /// HTTP status reported by the upstream, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::ApiError { status, .. } => Some(*status),
            ProviderError::HttpError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderSpec {
    pub name: String,
    pub model: String,
}

/// Parse `name[:model]`; a missing model falls back to the provider default.
pub fn parse_provider(spec: &str) -> ProviderSpec {
    let spec = spec.trim();
    let (name, model) = match spec.split_once(':') {
        Some((name, model)) => (name.trim(), model.trim()),
        None => (spec, ""),
    };
    let name = if name.is_empty() { DEFAULT_PROVIDER } else { name };
    let model = if model.is_empty() && name == DEFAULT_PROVIDER {
        OPENAI_DEFAULT_MODEL
    } else {
        model
    };
    ProviderSpec {
        name: name.to_string(),
        model: model.to_string(),
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Option<Vec<ChatChoice>>,
    usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessageResponse>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

/// Token accounting as reported by the upstream.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    #[serde(default, alias = "prompt_tokens")]
    pub prompt_tokens: u32,
    #[serde(default, alias = "completion_tokens")]
    pub completion_tokens: u32,
    #[serde(default, alias = "total_tokens")]
    pub total_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResult {
    pub content: String,
    pub latency_ms: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

/// Sampling settings for one call.
#[derive(Debug, Clone, Copy)]
pub struct ChatOptions {
    pub max_tokens: u32,
    pub temperature: f64,
}

#[derive(Debug, Clone)]
pub struct ProviderClient {
    client: Client,
    chat_url: String,
}

impl ProviderClient {
    /// Build a client with an explicit endpoint, timeout and optional proxy.
    pub fn with_settings(
        chat_url: &str,
        timeout: Duration,
        proxy_url: Option<&str>,
    ) -> Result<Self, ProviderError> {
        let mut builder = Client::builder().timeout(timeout);
        if let Some(proxy_url) = proxy_url {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }
        Ok(Self {
            client: builder.build()?,
            chat_url: chat_url.to_string(),
        })
    }

    /// Single system + user turn against the chat completion endpoint.
    pub async fn call_chat(
        &self,
        model: &str,
        api_key: &str,
        system: &str,
        user: &str,
        options: ChatOptions,
    ) -> Result<ChatResult, ProviderError> {
        if api_key.trim().is_empty() {
            return Err(ProviderError::MissingApiKey);
        }

        let request = ChatRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            max_tokens: options.max_tokens,
            temperature: options.temperature,
        };

        let start = Instant::now();

        let response = self
            .client
            .post(&self.chat_url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let latency_ms = start.elapsed().as_millis() as i64;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        let data: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::JsonError(e.to_string()))?;

        let content = data
            .choices
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_deref())
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .ok_or(ProviderError::MissingContent)?;

        Ok(ChatResult {
            content,
            latency_ms,
            usage: data.usage,
        })
    }
}

/// Prefer `error.message` from an OpenAI-style error body, else the raw body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .and_then(|e| e.message)
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                "Unknown error".to_string()
            } else {
                body.trim().to_string()
            }
        })
}

/// Environment variables consulted for a provider's key, in order.
fn api_key_env_vars(provider: &str) -> &'static [&'static str] {
    match provider {
        "openai" => &["OPENAI_API_KEY", "AUTHORCHECK_OPENAI_API_KEY"],
        _ => &[],
    }
}

/// API key from the environment only.
pub fn api_key_from_env(provider: &str) -> Option<String> {
    api_key_env_vars(provider)
        .iter()
        .filter_map(|key| env::var(key).ok())
        .map(|val| val.trim().to_string())
        .find(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_provider() {
        let spec = parse_provider("openai:gpt-4o-mini");
        assert_eq!(spec.name, "openai");
        assert_eq!(spec.model, "gpt-4o-mini");

        let spec2 = parse_provider("openai");
        assert_eq!(spec2.model, OPENAI_DEFAULT_MODEL);

        let spec3 = parse_provider("");
        assert_eq!(spec3.name, DEFAULT_PROVIDER);
    }

    #[test]
    fn test_api_error_message() {
        let body = r#"{"error": {"message": "Incorrect API key provided"}}"#;
        assert_eq!(api_error_message(body), "Incorrect API key provided");
        assert_eq!(api_error_message("bad gateway"), "bad gateway");
        assert_eq!(api_error_message(""), "Unknown error");
    }

    #[test]
    fn test_usage_accepts_snake_case() {
        let usage: TokenUsage =
            serde_json::from_str(r#"{"prompt_tokens": 3, "completion_tokens": 5, "total_tokens": 8}"#).unwrap();
        assert_eq!(usage.total_tokens, 8);
    }

    #[tokio::test]
    async fn test_missing_api_key_short_circuits() {
        let client = ProviderClient::with_settings("http://127.0.0.1:9", Duration::from_secs(1), None).unwrap();
        let options = ChatOptions { max_tokens: 10, temperature: 0.0 };
        let err = client.call_chat("m", " ", "s", "u", options).await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingApiKey));
    }
}
