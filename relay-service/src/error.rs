//! Request-level failures of the chat relay and their HTTP rendering.

use crate::dtos::PROMPT_REQUIRED;
use crate::services::providers::ProviderError;
use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use service_core::error::ErrorResponse;
use thiserror::Error;

pub const GENERATION_FAILED: &str = "Failed to generate content or audio data";
pub const PROVIDER_FAILED: &str = "An error occurred while interacting with the AI model.";

#[derive(Debug, Error)]
pub enum RelayError {
    /// Prompt absent, empty or not a string. Detected before any provider call.
    #[error("Prompt is required")]
    MissingPrompt,

    /// The body could not be read at all (e.g. over the size limit).
    #[error("Failed to read request body: {0}")]
    UnreadableBody(#[source] BytesRejection),

    /// Provider answered but text, audio data or MIME type was missing.
    #[error("Failed to generate content or audio data")]
    IncompleteGeneration,

    /// The provider call itself failed.
    #[error("An error occurred while interacting with the AI model.")]
    Provider(#[source] ProviderError),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match self {
            RelayError::MissingPrompt => {
                ErrorResponse::new(PROMPT_REQUIRED).into_response_with(StatusCode::BAD_REQUEST)
            }
            RelayError::UnreadableBody(rejection) => rejection.into_response(),
            RelayError::IncompleteGeneration => ErrorResponse::new(GENERATION_FAILED)
                .into_response_with(StatusCode::INTERNAL_SERVER_ERROR),
            RelayError::Provider(err) => {
                ErrorResponse::with_details(PROVIDER_FAILED, err.to_string())
                    .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}
