//! Error types for the Shieldline domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! The guard verdict is the only error this layer introduces; failures of the
//! wrapped services are carried through unchanged in their own variants.

use thiserror::Error;

use crate::guard::GuardStage;

/// The top-level error type for all Shieldline operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Guard verdict ---
    #[error(transparent)]
    Blocked(#[from] BlockedContentError),

    // --- Collaborator errors ---
    #[error("Guard service error: {0}")]
    Guard(#[from] GuardServiceError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Request shape ---
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // --- Configuration errors ---
    #[error("Configuration error: {0}")]
    Config(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Whether this error is a guard block (at either stage).
    pub fn is_blocked(&self) -> bool {
        matches!(self, Error::Blocked(_))
    }

    /// The stage that blocked the call, if this is a guard block.
    pub fn blocked_stage(&self) -> Option<GuardStage> {
        match self {
            Error::Blocked(b) => Some(b.stage),
            _ => None,
        }
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Content was rejected by the guard. Terminal for the current call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("content blocked by guard at {stage} stage")]
pub struct BlockedContentError {
    /// Which check produced the verdict.
    pub stage: GuardStage,

    /// Guard-provided summary, if any. Never contains the guarded text.
    pub summary: Option<String>,
}

impl BlockedContentError {
    pub fn new(stage: GuardStage) -> Self {
        Self { stage, summary: None }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }
}

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum GuardServiceError {
    #[error("Guard request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Guard service returned status {status}: {summary}")]
    Rejected { status: String, summary: String },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Rate limited by guard service")]
    RateLimited,

    #[error("Malformed guard response: {0}")]
    InvalidResponse(String),

    #[error("Guard service not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}
