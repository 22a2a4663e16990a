// Command-style entry points
// Each function validates input, resolves configuration and returns either a
// serializable response or a user-facing error string.

use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{
    ArticleResponse, DetectRequest, DetectResponse, DistributionResult, StoryRequest, StoryResponse,
    TextStatistics,
};
use crate::services::config_store::{AppConfig, ConfigStore};
use crate::services::detection::{
    classify_offline, classify_with_model, DetectionError, DetectionOutcome, DetectionSettings,
};
use crate::services::generation::{self, GenerationSettings};
use crate::services::providers::{parse_provider, ProviderClient, ProviderSpec};
use crate::services::text_processor::compute_text_statistics;

/// Configuration from the default location with environment overrides
/// applied; defaults when the file is unavailable.
pub fn load_config() -> AppConfig {
    let mut config = match ConfigStore::open_default().map(|store| store.load()) {
        Some(Ok(config)) => config,
        Some(Err(e)) => {
            warn!("Config load failed, using defaults: {}", e);
            AppConfig::default()
        }
        None => AppConfig::default(),
    };
    config.apply_env_overrides();
    config
}

fn resolve_provider(config: &AppConfig, requested: Option<&str>) -> ProviderSpec {
    let raw = requested
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| config.provider_spec());
    let mut spec = parse_provider(&raw);
    if !raw.contains(':') {
        if let Some(model) = config.provider_model(&spec.name) {
            spec.model = model;
        }
    }
    spec
}

fn build_client(config: &AppConfig, provider: &str) -> Result<ProviderClient, String> {
    ProviderClient::with_settings(
        &config.chat_url(provider),
        config.request_timeout(),
        config.proxy_url(),
    )
    .map_err(|e| e.to_string())
}

fn detection_settings(config: &AppConfig, model: String) -> DetectionSettings {
    DetectionSettings {
        model,
        max_words: config.detection.max_words,
        max_chars: config.detection.max_chars,
        prompt_char_limit: config.detection.prompt_char_limit,
        confidence_floor: config.detection.confidence_floor,
        max_tokens: config.detection.max_tokens,
        temperature: config.detection.temperature,
    }
}

fn generation_settings(config: &AppConfig, model: String) -> GenerationSettings {
    GenerationSettings {
        model,
        max_topic_chars: config.generation.max_topic_chars,
        max_tokens: config.generation.max_tokens,
        temperature: config.generation.temperature,
    }
}

/// Reject texts below the configured minimum length.
pub fn validate_detect_text(text: &str, config: &AppConfig) -> Result<(), DetectionError> {
    let len = text.trim().chars().count();
    if len == 0 {
        return Err(DetectionError::InvalidInput("Text is required".to_string()));
    }
    if len < config.detection.min_chars {
        return Err(DetectionError::InvalidInput(format!(
            "Text must be at least {} characters long",
            config.detection.min_chars
        )));
    }
    Ok(())
}

pub async fn detect_text(request: DetectRequest) -> Result<DetectResponse, String> {
    let config = load_config();
    detect_text_with_config(request, &config).await
}

/// Classify a text. Upstream problems never surface here: they resolve to the
/// heuristic verdict. Only invalid input is returned as `Err`.
pub async fn detect_text_with_config(
    request: DetectRequest,
    config: &AppConfig,
) -> Result<DetectResponse, String> {
    let request_id = Uuid::new_v4().to_string();
    validate_detect_text(&request.text, config).map_err(|e| e.to_string())?;

    let spec = resolve_provider(config, request.provider.as_deref());
    let settings = detection_settings(config, spec.model.clone());

    info!(
        request_id = %request_id,
        text_chars = request.text.chars().count(),
        provider = %spec.name,
        model = %spec.model,
        offline = request.offline,
        "[DETECT] request"
    );

    let outcome: Result<DetectionOutcome, DetectionError> = if request.offline {
        classify_offline(&request.text, &settings)
    } else {
        match build_client(config, &spec.name) {
            Ok(client) => {
                let api_key = config.api_key(&spec.name);
                classify_with_model(&client, api_key.as_deref(), &request.text, &settings).await
            }
            Err(e) => {
                warn!(request_id = %request_id, error = %e, "[DETECT] client setup failed");
                classify_offline(&request.text, &settings)
            }
        }
    };
    let outcome = outcome.map_err(|e| e.to_string())?;

    info!(
        request_id = %request_id,
        source = ?outcome.source,
        is_ai = outcome.result.is_ai,
        confidence = outcome.result.confidence,
        "[DETECT] done"
    );

    Ok(DetectResponse {
        distribution: DistributionResult::from(&outcome.result),
        result: outcome.result,
        source: outcome.source,
        request_id,
        analyzed_words: outcome.analyzed_words,
        truncated: outcome.truncated,
    })
}

pub fn text_statistics(text: &str) -> Result<TextStatistics, String> {
    compute_text_statistics(text).map_err(|e| e.to_string())
}

pub async fn generate_article(topic: String) -> Result<ArticleResponse, String> {
    let config = load_config();
    generate_article_with_config(topic, &config).await
}

pub async fn generate_article_with_config(
    topic: String,
    config: &AppConfig,
) -> Result<ArticleResponse, String> {
    let spec = resolve_provider(config, None);
    let client = build_client(config, &spec.name)?;
    let api_key = config.api_key(&spec.name);
    let settings = generation_settings(config, spec.model);

    let article = generation::generate_article(&client, api_key.as_deref(), &topic, &settings)
        .await
        .map_err(|e| e.to_string())?;
    Ok(ArticleResponse { article })
}

pub async fn generate_story(request: StoryRequest) -> Result<StoryResponse, String> {
    let config = load_config();
    generate_story_with_config(request, &config).await
}

pub async fn generate_story_with_config(
    request: StoryRequest,
    config: &AppConfig,
) -> Result<StoryResponse, String> {
    let spec = resolve_provider(config, None);
    let client = build_client(config, &spec.name)?;
    let api_key = config.api_key(&spec.name);
    let settings = generation_settings(config, spec.model);

    let (story, usage) = generation::generate_story(
        &client,
        api_key.as_deref(),
        &request.prompt,
        request.max_tokens,
        request.temperature,
        &settings,
    )
    .await
    .map_err(|e| e.to_string())?;
    Ok(StoryResponse { story, usage })
}

pub fn get_config() -> Result<AppConfig, String> {
    match ConfigStore::open_default() {
        Some(store) => store.load(),
        None => Ok(AppConfig::default()),
    }
}

pub fn save_config(config: AppConfig) -> Result<(), String> {
    let store = ConfigStore::open_default().ok_or("No config directory available")?;
    store.save(&config)
}

pub fn store_api_key(provider: String, key: String) -> Result<(), String> {
    let store = ConfigStore::open_default().ok_or("No config directory available")?;
    store.set_api_key(&provider, key.trim())
}

pub fn delete_api_key(provider: String) -> Result<(), String> {
    let store = ConfigStore::open_default().ok_or("No config directory available")?;
    store.delete_api_key(&provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::config_store::ProviderConfig;

    #[test]
    fn test_short_text_is_rejected() {
        let config = AppConfig::default();
        let err = validate_detect_text("too short", &config).unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: Text must be at least 50 characters long");
    }

    #[test]
    fn test_resolve_provider_prefers_configured_model() {
        let mut config = AppConfig::default();
        config.providers.insert(
            "openai".to_string(),
            ProviderConfig {
                enabled: true,
                model: Some("gpt-4o-mini".to_string()),
                base_url: None,
            },
        );
        assert_eq!(resolve_provider(&config, None).model, "gpt-4o-mini");
        assert_eq!(resolve_provider(&config, Some("openai:gpt-4o")).model, "gpt-4o");
    }

    #[tokio::test]
    async fn test_missing_key_in_config_falls_back_without_network() {
        let mut config = AppConfig::default();
        config.providers.insert(
            "openai".to_string(),
            ProviderConfig {
                enabled: true,
                model: None,
                base_url: Some("http://127.0.0.1:9/v1/chat/completions".to_string()),
            },
        );
        let text = "I love my dog. My dog loves me too. We walk every day in the park near our house.";
        let resp = detect_text_with_config(DetectRequest::new(text), &config).await.unwrap();
        assert_eq!(resp.source, crate::models::ResultSource::Heuristic);
    }

    #[tokio::test]
    async fn test_offline_detection() {
        let config = AppConfig::default();
        let text = "I love my dog. My dog loves me too. We walk every day in the park near our house.";
        let mut request = DetectRequest::new(text);
        request.offline = true;
        let resp = detect_text_with_config(request, &config).await.unwrap();
        assert!(!resp.result.is_ai);
        assert_eq!(resp.source, crate::models::ResultSource::Heuristic);
        assert!((resp.distribution.human + resp.distribution.ai - 1.0).abs() < 1e-12);
    }
}
