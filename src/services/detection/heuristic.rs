// Heuristic Classifier
// Rule-based authorship scoring used when the remote model cannot answer.
//
// Each rule contributes a fixed weight; the weights sum to 1.0. The result is
// deliberately low-trust: confidence never leaves [0.4, 0.8].

use crate::models::ClassificationResult;
use crate::services::text_processor::{compute_text_statistics, TextStatistics};

use super::errors::DetectionError;

/// Average sentence length band (words) treated as "uniform", lower bound inclusive.
const SENTENCE_BAND_MIN: f64 = 15.0;
/// Upper bound of the sentence band, exclusive.
const SENTENCE_BAND_MAX: f64 = 25.0;
const SENTENCE_BAND_WEIGHT: f64 = 0.4;

const LOW_PRONOUN_RATE: f64 = 0.01;
const LOW_PRONOUN_WEIGHT: f64 = 0.3;

const TRANSITION_RATE: f64 = 0.005;
const TRANSITION_WEIGHT: f64 = 0.3;

const DECISION_THRESHOLD: f64 = 0.5;
const CONFIDENCE_BASE: f64 = 0.4;
const CONFIDENCE_SLOPE: f64 = 0.4;
const CONFIDENCE_CAP: f64 = 0.8;

pub const HEURISTIC_REASONING: &str =
    "Analysis using fallback heuristics (sentence uniformity, pronoun usage, transition words) because the AI model was unavailable";

/// Per-rule breakdown of a heuristic score.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeuristicScore {
    pub sentence_band: bool,
    pub low_pronouns: bool,
    pub transitions: bool,
}

impl HeuristicScore {
    pub fn from_statistics(stats: &TextStatistics) -> Self {
        Self {
            sentence_band: stats.avg_sentence_length >= SENTENCE_BAND_MIN
                && stats.avg_sentence_length < SENTENCE_BAND_MAX,
            low_pronouns: stats.personal_pronoun_rate < LOW_PRONOUN_RATE,
            transitions: stats.transition_word_rate > TRANSITION_RATE,
        }
    }

    /// Accumulated AI-likelihood in [0, 1].
    pub fn value(&self) -> f64 {
        let mut score = 0.0;
        if self.sentence_band {
            score += SENTENCE_BAND_WEIGHT;
        }
        if self.low_pronouns {
            score += LOW_PRONOUN_WEIGHT;
        }
        if self.transitions {
            score += TRANSITION_WEIGHT;
        }
        score.clamp(0.0, 1.0)
    }

    pub fn is_ai(&self) -> bool {
        self.value() > DECISION_THRESHOLD
    }

    pub fn confidence(&self) -> f64 {
        (CONFIDENCE_BASE + self.value() * CONFIDENCE_SLOPE).min(CONFIDENCE_CAP)
    }
}

/// Classify from precomputed statistics.
pub fn classify_statistics(stats: &TextStatistics) -> ClassificationResult {
    // No words means nothing to judge; policy is "not AI" at the floor confidence.
    let score = if stats.word_count == 0 {
        HeuristicScore::default()
    } else {
        HeuristicScore::from_statistics(stats)
    };

    ClassificationResult {
        is_ai: score.is_ai(),
        confidence: score.confidence(),
        reasoning: HEURISTIC_REASONING.to_string(),
    }
}

/// Classify a text with the heuristic rules only.
pub fn classify_heuristic(text: &str) -> Result<ClassificationResult, DetectionError> {
    let stats = compute_text_statistics(text)?;
    Ok(classify_statistics(&stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Six sentences of twenty words, no pronouns, two transition words.
    fn formal_passage() -> String {
        (0..6)
            .map(|i| {
                let mut words: Vec<String> = (0..20).map(|j| format!("term{}", j)).collect();
                match i {
                    0 => words[0] = "However,".to_string(),
                    3 => words[0] = "Moreover,".to_string(),
                    _ => {}
                }
                format!("{}.", words.join(" "))
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_formal_passage_scores_full_weight() {
        let text = formal_passage();
        let stats = compute_text_statistics(&text).unwrap();
        assert_eq!(stats.word_count, 120);
        assert_eq!(stats.personal_pronoun_rate, 0.0);
        assert!(stats.transition_word_rate > 0.005);

        let score = HeuristicScore::from_statistics(&stats);
        assert!((score.value() - 1.0).abs() < 1e-9);

        let result = classify_heuristic(&text).unwrap();
        assert!(result.is_ai);
        assert!((result.confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_personal_text_is_not_ai() {
        let result = classify_heuristic("I love my dog. My dog loves me too.").unwrap();
        assert!(!result.is_ai);
        assert!((result.confidence - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_low_pronouns_alone_stay_below_threshold() {
        // Short sentences, no pronouns, no transitions: score 0.3.
        let result = classify_heuristic("Rain fell. Wind blew. Trees bent.").unwrap();
        assert!(!result.is_ai);
        assert!((result.confidence - 0.52).abs() < 1e-9);
    }

    #[test]
    fn test_sentence_band_bounds() {
        let mut stats = TextStatistics {
            word_count: 100,
            avg_sentence_length: 15.0,
            personal_pronoun_rate: 0.5,
            ..Default::default()
        };
        assert!(HeuristicScore::from_statistics(&stats).sentence_band);
        stats.avg_sentence_length = 25.0;
        assert!(!HeuristicScore::from_statistics(&stats).sentence_band);
    }

    #[test]
    fn test_symbol_only_text_gets_floor_result() {
        let result = classify_heuristic("1234 5678 90").unwrap();
        // Numbers have no pronouns, so only the pronoun rule fires.
        assert!(!result.is_ai);
        assert!(result.confidence >= 0.4 && result.confidence <= 0.8);
    }

    #[test]
    fn test_no_words_is_floor_policy() {
        let stats = TextStatistics::default();
        let result = classify_statistics(&stats);
        assert!(!result.is_ai);
        assert_eq!(result.confidence, 0.4);
    }

    #[test]
    fn test_deterministic() {
        let text = formal_passage();
        let a = serde_json::to_string(&classify_heuristic(&text).unwrap()).unwrap();
        let b = serde_json::to_string(&classify_heuristic(&text).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_confidence_range_over_all_rule_combinations() {
        for mask in 0..8u8 {
            let score = HeuristicScore {
                sentence_band: mask & 1 != 0,
                low_pronouns: mask & 2 != 0,
                transitions: mask & 4 != 0,
            };
            let c = score.confidence();
            assert!((0.4..=0.8).contains(&c), "mask {} gave {}", mask, c);
        }
    }

    #[test]
    fn test_empty_text_is_invalid() {
        assert!(matches!(classify_heuristic(""), Err(DetectionError::InvalidInput(_))));
    }
}
