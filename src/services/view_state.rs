// View State
// Pure state machine driving the request/response view.

use serde::{Deserialize, Serialize};

const EMPTY_INPUT_MESSAGE: &str = "Please enter a topic for your article";
const EMPTY_RESULT_MESSAGE: &str = "No content received";
const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum ViewState {
    #[default]
    Idle,
    Loading,
    Result(String),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Submit(String),
    Succeeded(String),
    Failed(String),
    Reset,
}

impl ViewState {
    /// Submissions are blocked while a request is in flight.
    pub fn can_submit(&self) -> bool {
        !matches!(self, ViewState::Loading)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }
}

pub fn transition(state: ViewState, event: ViewEvent) -> ViewState {
    match (state, event) {
        (_, ViewEvent::Reset) => ViewState::Idle,
        (ViewState::Loading, ViewEvent::Submit(_)) => ViewState::Loading,
        (_, ViewEvent::Submit(input)) => {
            if input.trim().is_empty() {
                ViewState::Error(EMPTY_INPUT_MESSAGE.to_string())
            } else {
                ViewState::Loading
            }
        }
        (ViewState::Loading, ViewEvent::Succeeded(content)) => {
            if content.trim().is_empty() {
                ViewState::Error(EMPTY_RESULT_MESSAGE.to_string())
            } else {
                ViewState::Result(content)
            }
        }
        (ViewState::Loading, ViewEvent::Failed(message)) => {
            if message.trim().is_empty() {
                ViewState::Error(GENERIC_ERROR_MESSAGE.to_string())
            } else {
                ViewState::Error(message)
            }
        }
        // Late completions for a request that is no longer shown.
        (state, ViewEvent::Succeeded(_)) | (state, ViewEvent::Failed(_)) => state,
    }
}

/// File name for saving generated text: first 50 chars of the topic,
/// non-alphanumerics replaced by `_`, lowercased.
pub fn download_file_name(topic: &str) -> String {
    let stem: String = topic.trim().chars().take(50).collect();
    if stem.is_empty() {
        return "article.txt".to_string();
    }
    let stem: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    format!("{}.txt", stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let s = transition(ViewState::Idle, ViewEvent::Submit("Rust".to_string()));
        assert_eq!(s, ViewState::Loading);
        assert!(!s.can_submit());
        let s = transition(s, ViewEvent::Succeeded("An article".to_string()));
        assert_eq!(s, ViewState::Result("An article".to_string()));
        assert!(s.can_submit());
    }

    #[test]
    fn test_blank_submit_is_error() {
        let s = transition(ViewState::Idle, ViewEvent::Submit("  ".to_string()));
        assert_eq!(s, ViewState::Error(EMPTY_INPUT_MESSAGE.to_string()));
    }

    #[test]
    fn test_submit_while_loading_is_ignored() {
        let s = transition(ViewState::Loading, ViewEvent::Submit("again".to_string()));
        assert_eq!(s, ViewState::Loading);
    }

    #[test]
    fn test_failure_and_empty_result() {
        let s = transition(ViewState::Loading, ViewEvent::Failed(String::new()));
        assert_eq!(s, ViewState::Error(GENERIC_ERROR_MESSAGE.to_string()));
        let s = transition(ViewState::Loading, ViewEvent::Succeeded(" ".to_string()));
        assert_eq!(s, ViewState::Error(EMPTY_RESULT_MESSAGE.to_string()));
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let s = transition(ViewState::Idle, ViewEvent::Succeeded("late".to_string()));
        assert_eq!(s, ViewState::Idle);
    }

    #[test]
    fn test_reset_from_anywhere() {
        let s = transition(ViewState::Result("x".to_string()), ViewEvent::Reset);
        assert_eq!(s, ViewState::Idle);
    }

    #[test]
    fn test_download_file_name() {
        assert_eq!(download_file_name("Rust & You!"), "rust___you_.txt");
        assert_eq!(download_file_name("   "), "article.txt");
        assert_eq!(download_file_name(&"a".repeat(80)).len(), 54);
    }
}
