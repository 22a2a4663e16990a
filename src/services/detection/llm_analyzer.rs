// LLM Analyzer
// Asks the remote chat model for an authorship verdict and degrades to the
// heuristic classifier whenever the model is unavailable or its reply cannot
// be validated.

use tracing::{info, warn};

use crate::models::{ClassificationResult, ResultSource};
use crate::services::providers::{ChatOptions, ProviderClient, ProviderError};
use crate::services::text_processor::{split_words, truncate_chars, truncate_words};

use super::errors::DetectionError;
use super::heuristic::classify_heuristic;
use super::normalizer::ResponseNormalizer;

/// System prompt for single-text AI detection
const DETECTION_SYSTEM_PROMPT: &str =
    "You are an AI content detector. Always respond with valid JSON only, no other text.";

/// Per-request detection settings.
#[derive(Debug, Clone)]
pub struct DetectionSettings {
    pub model: String,
    pub max_words: usize,
    pub max_chars: usize,
    pub prompt_char_limit: usize,
    pub confidence_floor: f64,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            model: crate::services::providers::OPENAI_DEFAULT_MODEL.to_string(),
            max_words: 1500,
            max_chars: 4000,
            prompt_char_limit: 2000,
            confidence_floor: 0.0,
            max_tokens: 300,
            temperature: 0.1,
        }
    }
}

/// Verdict plus the path that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionOutcome {
    pub result: ClassificationResult,
    pub source: ResultSource,
    pub analyzed_words: usize,
    pub truncated: bool,
}

/// Text sent upstream: word cap first, then character cap.
pub fn prepare_submission(text: &str, settings: &DetectionSettings) -> (String, bool) {
    let by_words = truncate_words(text.trim(), settings.max_words);
    let submission = truncate_chars(&by_words, settings.max_chars).to_string();
    let truncated = submission.len() < text.trim().len();
    (submission, truncated)
}

pub fn build_detection_prompt(text: &str, prompt_char_limit: usize) -> String {
    format!(
        "Analyze this text and determine if it was AI-generated or human-written.\n\
         Return ONLY a JSON object with this exact format:\n\
         {{\n    \"isAI\": true or false,\n    \"confidence\": 0.85,\n    \"reasoning\": \"Brief explanation here\"\n}}\n\n\
         Text to analyze: \"{}\"",
        truncate_chars(text, prompt_char_limit)
    )
}

/// Turn the outcome of the remote call into a verdict.
///
/// Upstream failures and malformed replies resolve to the heuristic
/// classification of `text`; only invalid input is returned as an error.
pub fn resolve_reply(
    text: &str,
    reply: Result<String, ProviderError>,
    normalizer: &ResponseNormalizer,
) -> Result<(ClassificationResult, ResultSource), DetectionError> {
    let failure = match reply {
        Ok(raw) => match normalizer.normalize(&raw) {
            Ok(result) => return Ok((result, ResultSource::Model)),
            Err(e) => e,
        },
        Err(e) => DetectionError::from(e),
    };

    warn!(error = %failure, "[DETECT] falling back to heuristic classifier");
    let result = classify_heuristic(text)?;
    Ok((result, ResultSource::Heuristic))
}

/// Classify `text` with the remote model, falling back to the heuristic.
///
/// `api_key` of `None` counts as an unavailable upstream.
pub async fn classify_with_model(
    client: &ProviderClient,
    api_key: Option<&str>,
    text: &str,
    settings: &DetectionSettings,
) -> Result<DetectionOutcome, DetectionError> {
    if text.trim().is_empty() {
        return Err(DetectionError::InvalidInput("Text is required".to_string()));
    }

    let (submission, truncated) = prepare_submission(text, settings);
    let analyzed_words = split_words(&submission).len();

    let reply = match api_key {
        Some(key) => {
            let prompt = build_detection_prompt(&submission, settings.prompt_char_limit);
            let options = ChatOptions {
                max_tokens: settings.max_tokens,
                temperature: settings.temperature,
            };
            client
                .call_chat(&settings.model, key, DETECTION_SYSTEM_PROMPT, &prompt, options)
                .await
                .map(|r| {
                    info!(
                        model = %settings.model,
                        latency_ms = r.latency_ms,
                        reply_chars = r.content.chars().count(),
                        "[DETECT] model replied"
                    );
                    r.content
                })
        }
        None => Err(ProviderError::MissingApiKey),
    };

    let normalizer = ResponseNormalizer::with_confidence_floor(settings.confidence_floor);
    let (result, source) = resolve_reply(text, reply, &normalizer)?;

    Ok(DetectionOutcome {
        result,
        source,
        analyzed_words,
        truncated,
    })
}

/// Heuristic-only classification with the same outcome shape.
pub fn classify_offline(text: &str, settings: &DetectionSettings) -> Result<DetectionOutcome, DetectionError> {
    let (submission, truncated) = prepare_submission(text, settings);
    let result = classify_heuristic(text)?;
    Ok(DetectionOutcome {
        result,
        source: ResultSource::Heuristic,
        analyzed_words: split_words(&submission).len(),
        truncated,
    })
}
