// AuthorCheck Data Models

use serde::{Deserialize, Serialize};

pub use crate::services::providers::TokenUsage;
pub use crate::services::text_processor::TextStatistics;

// ============ Detection ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectRequest {
    pub text: String,
    /// `name[:model]`; the configured default provider when absent.
    #[serde(default)]
    pub provider: Option<String>,
    /// Skip the remote model and use the heuristic classifier directly.
    #[serde(default)]
    pub offline: bool,
}

impl DetectRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            provider: None,
            offline: false,
        }
    }
}

/// Canonical authorship verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    #[serde(rename = "isAI", alias = "is_ai")]
    pub is_ai: bool,
    /// Always within [0, 1].
    pub confidence: f64,
    pub reasoning: String,
}

/// Probability-split view of a [`ClassificationResult`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributionResult {
    pub human: f64,
    pub ai: f64,
    pub confidence: f64,
}

impl From<&ClassificationResult> for DistributionResult {
    fn from(result: &ClassificationResult) -> Self {
        let confidence = result.confidence.clamp(0.0, 1.0);
        // Probability of the chosen label, in [0.5, 1].
        let chosen = 0.5 + confidence / 2.0;
        let ai = if result.is_ai { chosen } else { 1.0 - chosen };
        Self {
            human: 1.0 - ai,
            ai,
            confidence,
        }
    }
}

/// Which path produced a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    Model,
    Heuristic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectResponse {
    #[serde(flatten)]
    pub result: ClassificationResult,
    pub source: ResultSource,
    pub distribution: DistributionResult,
    pub request_id: String,
    /// Words actually analyzed after truncation.
    pub analyzed_words: usize,
    pub truncated: bool,
}

// ============ Generation ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleResponse {
    pub article: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryRequest {
    pub prompt: String,
    #[serde(default, alias = "max_tokens")]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryResponse {
    pub story: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}
