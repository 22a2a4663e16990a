// Detection Module
// AI text detection core logic organized into specialized submodules:
// - heuristic: rule-based fallback classifier over text statistics
// - normalizer: validates and repairs untrusted model replies
// - llm_analyzer: remote model call with graceful degradation
// - errors: detection failure taxonomy

pub mod errors;
pub mod heuristic;
pub mod llm_analyzer;
pub mod normalizer;

pub use errors::DetectionError;
pub use heuristic::{classify_heuristic, classify_statistics, HeuristicScore, HEURISTIC_REASONING};
pub use llm_analyzer::{
    build_detection_prompt,
    classify_offline,
    classify_with_model,
    prepare_submission,
    resolve_reply,
    DetectionOutcome,
    DetectionSettings,
};
pub use normalizer::{normalize_reply, strip_code_fences, ResponseNormalizer, DEFAULT_REASONING};
