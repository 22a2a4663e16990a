// Response Normalizer
// Turns an untrusted model reply into a validated ClassificationResult.
//
// Steps: strip code fences -> locate the JSON object -> parse into a map ->
// resolve the authorship field -> resolve and clamp confidence -> default
// reasoning.

use serde_json::{Map, Value};

use crate::models::ClassificationResult;

use super::errors::DetectionError;

pub const DEFAULT_REASONING: &str = "No reasoning provided";

const AUTHORSHIP_KEYS: [&str; 3] = ["isAI", "is_ai", "isAi"];
const PROBABILITY_KEYS: [&str; 3] = ["probability", "aiProbability", "ai_probability"];

/// Remove a leading ```` ```json ```` / ```` ``` ```` fence and a trailing ```` ``` ````.
pub fn strip_code_fences(content: &str) -> &str {
    let mut s = content.trim();
    if let Some(rest) = s.strip_prefix("```") {
        // Optional language tag directly after the opening fence.
        let tag_len = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        s = &rest[tag_len..];
    }
    if let Some(rest) = s.trim_end().strip_suffix("```") {
        s = rest;
    }
    s.trim()
}

/// Outermost `{ ... }` span of the reply, ignoring any prose around it.
fn extract_json(content: &str) -> Result<&str, DetectionError> {
    match (content.find('{'), content.rfind('}')) {
        (Some(start), Some(end)) if end > start => Ok(&content[start..=end]),
        _ => Err(DetectionError::MalformedUpstreamReply(
            "No JSON object in reply".to_string(),
        )),
    }
}

fn parse_object(content: &str) -> Result<Map<String, Value>, DetectionError> {
    let stripped = strip_code_fences(content);
    let json_str = extract_json(stripped)?;
    match serde_json::from_str::<Value>(json_str) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(DetectionError::MalformedUpstreamReply(format!(
            "Expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(DetectionError::MalformedUpstreamReply(format!(
            "JSON parse error: {}",
            e
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// First alias holding a boolean; aliases with other types are skipped.
fn first_bool(map: &Map<String, Value>, keys: &[&str]) -> Option<bool> {
    keys.iter().find_map(|k| map.get(*k).and_then(Value::as_bool))
}

/// Probability in [0, 1], rejecting anything outside that range.
fn unit_number(value: Option<&Value>) -> Option<f64> {
    value
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite() && (0.0..=1.0).contains(v))
}

/// AI probability from the distribution siblings (`ai`/`human`) or a
/// `probability` field.
fn ai_probability(map: &Map<String, Value>) -> Option<f64> {
    let ai = unit_number(map.get("ai"));
    let human = unit_number(map.get("human"));
    match (ai, human) {
        (Some(a), Some(h)) if a + h > 0.0 => Some(a / (a + h)),
        (Some(a), _) => Some(a),
        (None, Some(h)) => Some(1.0 - h),
        (None, None) => PROBABILITY_KEYS.iter().find_map(|k| unit_number(map.get(*k))),
    }
}

/// Validates and repairs model replies.
#[derive(Debug, Clone, Copy)]
pub struct ResponseNormalizer {
    confidence_floor: f64,
}

impl Default for ResponseNormalizer {
    fn default() -> Self {
        Self { confidence_floor: 0.0 }
    }
}

impl ResponseNormalizer {
    /// `floor` is clamped into [0, 1].
    pub fn with_confidence_floor(floor: f64) -> Self {
        let confidence_floor = if floor.is_finite() { floor.clamp(0.0, 1.0) } else { 0.0 };
        Self { confidence_floor }
    }

    pub fn confidence_floor(&self) -> f64 {
        self.confidence_floor
    }

    pub fn clamp_confidence(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.confidence_floor;
        }
        value.clamp(self.confidence_floor, 1.0)
    }

    /// Normalize a raw reply. Any error means the caller must fall back to
    /// the heuristic classifier.
    pub fn normalize(&self, raw: &str) -> Result<ClassificationResult, DetectionError> {
        let map = parse_object(raw)?;
        let probability = ai_probability(&map);

        let is_ai = match first_bool(&map, &AUTHORSHIP_KEYS) {
            Some(b) => b,
            None => match probability {
                Some(p) => p > 0.5,
                None => {
                    return Err(DetectionError::MalformedUpstreamReply(
                        "Missing boolean isAI field and no derivable probability".to_string(),
                    ))
                }
            },
        };

        let confidence = match map.get("confidence").and_then(Value::as_f64) {
            Some(c) => c,
            None => match probability {
                Some(p) => (p - 0.5).abs() * 2.0,
                None => {
                    return Err(DetectionError::MalformedUpstreamReply(
                        "Missing numeric confidence and no derivable probability".to_string(),
                    ))
                }
            },
        };

        let reasoning = map
            .get("reasoning")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_REASONING)
            .to_string();

        Ok(ClassificationResult {
            is_ai,
            confidence: self.clamp_confidence(confidence),
            reasoning,
        })
    }
}

/// Normalize with the default [0, 1] confidence range.
pub fn normalize_reply(raw: &str) -> Result<ClassificationResult, DetectionError> {
    ResponseNormalizer::default().normalize(raw)
}
