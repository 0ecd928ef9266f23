pub mod cache;
pub mod normalize;
pub mod orchestrator;
pub mod parser;
pub mod prompt;
pub mod types;

pub use cache::{fingerprint, CacheStats, ResultCache};
pub use orchestrator::{
    AnalysisOutcome, AnalysisSource, DocumentAnalyzer, DEFAULT_MAX_TOKENS,
};
pub use types::{AnalysisResult, DocumentType, ExtractedData, RiskFlag, RiskLevel};

use thiserror::Error;

use crate::gpt::{AuthError, GptError, TransportError};

/// Terminal failures of one analysis request.
///
/// Parse fallback and field coercion are absorbed inside the pipeline and
/// never surface here — a malformed model response is not a failure.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Input text too short for analysis (< 10 characters)")]
    InputTooShort,
}

impl From<GptError> for AnalysisError {
    fn from(e: GptError) -> Self {
        match e {
            GptError::Auth(auth) => Self::Auth(auth),
            GptError::Transport(transport) => Self::Transport(transport),
        }
    }
}
