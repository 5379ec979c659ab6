//! Narrative Backend Module
//!
//! Produces the short clinical risk narrative shown next to the assessment.
//!
//! ## Architecture
//!
//! - [`NarrativeBackend`]: one call to an external text-generation service,
//!   returning a structured [`NarrativeOutcome`]
//! - [`GeminiBackend`]: `generateContent` over HTTPS via reqwest
//! - [`NarrativeGenerator`]: skips the call when there is nothing to assess,
//!   bounds it with a timeout and substitutes a rule-based narrative when the
//!   service answers with nothing usable

use async_trait::async_trait;

mod gemini;
mod narrative;

pub use gemini::GeminiBackend;
pub use narrative::{
    fallback_narrative, NarrativeGenerator, NarrativeRequest, NarrativeStats,
    AI_SERVICE_ERROR_MESSAGE, AWAITING_DATA_MESSAGE,
};

/// Result of one generation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrativeOutcome {
    /// Usable text.
    Success(String),
    /// The service could not be reached or did not answer in time.
    TransportFailure,
    /// The service answered, but not with a usable narrative.
    SemanticFailure,
}

/// Unified trait for narrative backends
#[async_trait]
pub trait NarrativeBackend: Send + Sync {
    /// Generate a narrative for `prompt`. Never retries.
    async fn generate(&self, prompt: &str) -> NarrativeOutcome;

    /// Backend name for logging and health output
    fn backend_name(&self) -> &'static str;
}

/// Errors raised while talking to a backend. Mapped onto
/// [`NarrativeOutcome`] before leaving this module.
#[derive(Debug, thiserror::Error)]
pub enum NarrativeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("service returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("response had no candidate text")]
    EmptyCandidate,
}

impl NarrativeError {
    /// Connection-level problems are transport failures; anything the
    /// service actually answered is semantic.
    pub fn outcome(&self) -> NarrativeOutcome {
        match self {
            NarrativeError::Http(e) if e.is_decode() => NarrativeOutcome::SemanticFailure,
            NarrativeError::Http(_) => NarrativeOutcome::TransportFailure,
            NarrativeError::Status(_) | NarrativeError::EmptyCandidate => {
                NarrativeOutcome::SemanticFailure
            }
        }
    }
}
