use thiserror::Error;

use crate::services::providers::ProviderError;

/// Failure kinds of a detection request.
///
/// Only `InvalidInput` is ever reported to the caller of `api::detect_text`;
/// the upstream variants are logged and resolved by the heuristic classifier.
#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Upstream model unavailable: {0}")]
    UpstreamUnavailable(#[from] ProviderError),
    #[error("Malformed upstream reply: {0}")]
    MalformedUpstreamReply(String),
}

impl DetectionError {
    pub fn is_upstream(&self) -> bool {
        !matches!(self, DetectionError::InvalidInput(_))
    }
}
