//! The chat relay: one prompt in, one provider call, one reply out.

use super::metrics::{
    record_provider_call, record_provider_error, record_token_usage, RelayOutcome,
};
use super::providers::SpeechProvider;
use crate::dtos::ChatResponse;
use crate::error::RelayError;
use crate::models::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Modality,
    SpeechConfig,
};
use std::sync::Arc;
use std::time::Instant;

/// Turns a prompt into a text+audio generation call and relays the result.
///
/// Holds no per-request state; clones share the same provider.
#[derive(Clone)]
pub struct Relay {
    provider: Arc<dyn SpeechProvider>,
    voice: String,
}

impl Relay {
    pub fn new(provider: Arc<dyn SpeechProvider>, voice: impl Into<String>) -> Self {
        Self {
            provider,
            voice: voice.into(),
        }
    }

    /// The prompt as the only user message, asking for text and audio in the
    /// configured prebuilt voice.
    pub fn build_request(&self, prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::user_text(prompt)],
            generation_config: Some(GenerationConfig {
                response_modalities: vec![Modality::Text, Modality::Audio],
                speech_config: Some(SpeechConfig::prebuilt(self.voice.clone())),
            }),
        }
    }

    /// Issue exactly one provider call for `prompt`. No retry.
    #[tracing::instrument(
        name = "relay_chat",
        skip_all,
        fields(provider = self.provider.name(), prompt_len = prompt.len())
    )]
    pub async fn relay(&self, prompt: &str) -> Result<ChatResponse, RelayError> {
        let request = self.build_request(prompt);
        let provider = self.provider.name();

        let start = Instant::now();
        let result = self.provider.generate_content(&request).await;
        let elapsed = start.elapsed();

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "Error during AI model interaction");
                record_provider_error(provider, e.kind());
                record_provider_call(provider, RelayOutcome::ProviderError, elapsed);
                return Err(RelayError::Provider(e));
            }
        };

        let finish_reason = response.first_finish_reason().map(str::to_string);
        let part_count = response.first_part_count();
        let total_tokens = response.total_tokens();
        if let Some(tokens) = total_tokens {
            record_token_usage(provider, tokens);
        }

        match extract_reply(response) {
            Some(reply) => {
                tracing::debug!(
                    text_len = reply.text.len(),
                    audio_len = reply.audio_data.len(),
                    mime_type = %reply.mime_type,
                    total_tokens = total_tokens.unwrap_or(0),
                    "Relayed generated content"
                );
                record_provider_call(provider, RelayOutcome::Success, elapsed);
                Ok(reply)
            }
            None => {
                tracing::warn!(
                    finish_reason = finish_reason.as_deref().unwrap_or("-"),
                    part_count,
                    "Provider response lacked text or audio"
                );
                record_provider_call(provider, RelayOutcome::Incomplete, elapsed);
                Err(RelayError::IncompleteGeneration)
            }
        }
    }
}

/// Positional extraction from the first candidate: part 0 is the text,
/// part 1 the inline audio. Parts are not matched by kind, so a provider that
/// reorders them yields `None`. Empty strings count as missing.
pub fn extract_reply(response: GenerateContentResponse) -> Option<ChatResponse> {
    let mut parts = response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter();

    let text = parts.next()?.text.filter(|t| !t.is_empty())?;
    let audio = parts.next()?.inline_data?;
    let audio_data = audio.data.filter(|d| !d.is_empty())?;
    let mime_type = audio.mime_type.filter(|m| !m.is_empty())?;

    Some(ChatResponse {
        text,
        audio_data,
        mime_type,
    })
}
