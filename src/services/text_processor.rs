// Text Processing Service
// Word/sentence statistics and input truncation helpers

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

use super::detection::DetectionError;

fn sentence_split_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]+").expect("sentence regex"))
}

fn pronoun_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(i|me|my|mine|we|us|our|ours)\b").expect("pronoun regex"))
}

fn transition_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(however|moreover|furthermore|additionally|in\s+conclusion)\b")
            .expect("transition regex")
    })
}

/// Surface statistics used by the heuristic classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TextStatistics {
    pub word_count: usize,
    pub sentence_count: usize,
    pub avg_sentence_length: f64,
    pub unique_word_ratio: f64,
    /// Spread (max - min) of sentence lengths in words.
    pub sentence_length_variance: f64,
    pub personal_pronoun_rate: f64,
    pub transition_word_rate: f64,
}

/// Whitespace-delimited words.
pub fn split_words(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Sentence segments split on runs of `.`, `!` and `?`.
/// Blank segments are dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    sentence_split_re()
        .split(text)
        .filter(|s| !s.trim().is_empty())
        .collect()
}

/// Compute statistics for a non-empty text.
pub fn compute_text_statistics(text: &str) -> Result<TextStatistics, DetectionError> {
    if text.trim().is_empty() {
        return Err(DetectionError::InvalidInput("Text is empty".to_string()));
    }

    let words = split_words(text);
    let word_count = words.len();

    let sentences = split_sentences(text);
    let sentence_lengths: Vec<usize> = sentences
        .iter()
        .map(|s| s.split_whitespace().count())
        .collect();
    // Guard against division by zero for text without any sentence content.
    let sentence_count = sentences.len().max(1);

    let avg_sentence_length = word_count as f64 / sentence_count as f64;

    let unique_word_ratio = if word_count == 0 {
        0.0
    } else {
        let unique: HashSet<String> = words.iter().map(|w| w.to_lowercase()).collect();
        unique.len() as f64 / word_count as f64
    };

    let sentence_length_variance = match (sentence_lengths.iter().max(), sentence_lengths.iter().min()) {
        (Some(max), Some(min)) => (max - min) as f64,
        _ => 0.0,
    };

    let per_word = |count: usize| {
        if word_count == 0 {
            0.0
        } else {
            count as f64 / word_count as f64
        }
    };

    Ok(TextStatistics {
        word_count,
        sentence_count,
        avg_sentence_length,
        unique_word_ratio,
        sentence_length_variance,
        personal_pronoun_rate: per_word(pronoun_re().find_iter(text).count()),
        transition_word_rate: per_word(transition_re().find_iter(text).count()),
    })
}

/// Keep at most `max_words` whitespace-delimited words.
/// Text already within the limit is returned unchanged.
pub fn truncate_words(text: &str, max_words: usize) -> String {
    let words = split_words(text);
    if words.len() <= max_words {
        return text.to_string();
    }
    words[..max_words].join(" ")
}

/// Keep at most `max_chars` Unicode scalar values.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_words_and_sentences() {
        let stats = compute_text_statistics("I love my dog. My dog loves me too.").unwrap();
        assert_eq!(stats.word_count, 9);
        assert_eq!(stats.sentence_count, 2);
        assert!((stats.avg_sentence_length - 4.5).abs() < 1e-9);
        assert!((stats.personal_pronoun_rate - 4.0 / 9.0).abs() < 1e-9);
        assert_eq!(stats.transition_word_rate, 0.0);
        assert_eq!(stats.sentence_length_variance, 1.0);
    }

    #[test]
    fn test_single_word_is_one_sentence() {
        let stats = compute_text_statistics("hello").unwrap();
        assert_eq!(stats.word_count, 1);
        assert_eq!(stats.sentence_count, 1);
        assert_eq!(stats.avg_sentence_length, 1.0);
        assert_eq!(stats.unique_word_ratio, 1.0);
        assert_eq!(stats.sentence_length_variance, 0.0);
    }

    #[test]
    fn test_punctuation_only_text_is_finite() {
        let stats = compute_text_statistics("?!...").unwrap();
        assert_eq!(stats.sentence_count, 1);
        for v in [
            stats.avg_sentence_length,
            stats.unique_word_ratio,
            stats.sentence_length_variance,
            stats.personal_pronoun_rate,
            stats.transition_word_rate,
        ] {
            assert!(v.is_finite() && v >= 0.0);
        }
    }

    #[test]
    fn test_empty_text_is_invalid() {
        assert!(matches!(
            compute_text_statistics("   \n\t"),
            Err(DetectionError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_unique_ratio_is_case_folded() {
        let stats = compute_text_statistics("The the THE cat").unwrap();
        assert!((stats.unique_word_ratio - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_transition_phrase_matches_across_spacing() {
        let stats = compute_text_statistics("In  conclusion, it works. However, not always.").unwrap();
        assert!((stats.transition_word_rate - 2.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_pronouns_need_whole_words() {
        // "mine" inside "determine" and "us" inside "use" must not count.
        let stats = compute_text_statistics("Determine the use of this.").unwrap();
        assert_eq!(stats.personal_pronoun_rate, 0.0);
    }

    #[test]
    fn test_truncate_words() {
        assert_eq!(truncate_words("a b  c d", 2), "a b");
        assert_eq!(truncate_words("a b", 5), "a b");
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
