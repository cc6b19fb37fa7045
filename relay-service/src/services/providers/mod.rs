//! Generation provider abstraction.
//!
//! The relay talks to the provider through [`SpeechProvider`] so the Gemini
//! client can be swapped for the mock in tests.

pub mod gemini;
pub mod mock;

use crate::models::{GenerateContentRequest, GenerateContentResponse};
use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
///
/// `Display` is what callers of the relay see in the `details` field, so the
/// `Api` variant carries the provider's own message verbatim.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("{0}")]
    Api(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Failed to parse response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::Api(_) => "api",
            ProviderError::RateLimited(_) => "rate_limited",
            ProviderError::NetworkError(_) => "network",
            ProviderError::InvalidResponse(_) => "invalid_response",
        }
    }
}

/// A model backend able to produce text plus speech for a prompt.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Provider name used in logs.
    fn name(&self) -> &'static str;

    /// Issue one `generateContent` call. Implementations must not retry.
    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ProviderError>;
}
