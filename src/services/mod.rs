// AuthorCheck Core Services

pub mod text_processor;
pub mod config_store;
pub mod providers;
pub mod detection;
pub mod generation;
pub mod view_state;

pub use text_processor::*;
pub use config_store::*;
pub use providers::*;
pub use generation::*;
pub use view_state::*;

// Re-export detection module functions
pub use detection::{
    classify_heuristic,
    classify_offline,
    classify_with_model,
    normalize_reply,
    resolve_reply,
    DetectionError,
    DetectionOutcome,
    DetectionSettings,
    ResponseNormalizer,
};
