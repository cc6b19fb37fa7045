use crate::dtos::{ChatRequest, ChatResponse};
use crate::error::RelayError;
use crate::startup::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

/// `POST /api/chat`
///
/// A body that is not a JSON object (or has no usable `prompt`) is answered
/// like a missing prompt, without calling the provider. A body that cannot be
/// read keeps axum's own status, e.g. 413 past the body limit.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, RelayError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(JsonRejection::BytesRejection(rejection)) => {
            tracing::warn!(error = %rejection, "Failed to read chat request body");
            return Err(RelayError::UnreadableBody(rejection));
        }
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Chat request body has no usable prompt");
            ChatRequest::default()
        }
    };

    let prompt = request.validated_prompt().ok_or(RelayError::MissingPrompt)?;

    let reply = state.relay.relay(prompt).await?;

    Ok(Json(reply))
}
