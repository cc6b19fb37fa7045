//! Gemini provider implementation.
//!
//! Calls `models/{model}:generateContent` on the Generative Language API.

use super::{ProviderError, SpeechProvider};
use crate::models::{GenerateContentRequest, GenerateContentResponse};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use service_core::observability::TracedClientExt;
use std::time::Duration;

/// Gemini API base URL.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Secret<String>,
    pub model: String,
    pub api_base: String,
    pub timeout: Duration,
}

/// Gemini speech-capable provider.
pub struct GeminiSpeechProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiSpeechProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        if config.api_key.expose_secret().is_empty() {
            return Err(ProviderError::NotConfigured(
                "Gemini API key not configured".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ProviderError::NotConfigured(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Build the API URL for the configured model and method.
    fn api_url(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.model,
            method
        )
    }
}

#[async_trait]
impl SpeechProvider for GeminiSpeechProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ProviderError> {
        let url = self.api_url("generateContent");

        tracing::debug!(
            model = %self.config.model,
            contents = request.contents.len(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .traced_post(&url)
            .header(API_KEY_HEADER, self.config.api_key.expose_secret())
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(api_error(status, &error_text));
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}

/// Google's error envelope: `{ "error": { "code", "message", "status" } }`.
#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

fn api_error(status: StatusCode, body: &str) -> ProviderError {
    let message = serde_json::from_str::<ApiErrorEnvelope>(body)
        .map(|e| e.error.message)
        .ok()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string());

    let message = format!("Gemini API error {}: {}", status, message);

    if status == StatusCode::TOO_MANY_REQUESTS {
        ProviderError::RateLimited(message)
    } else {
        ProviderError::Api(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_base: &str) -> GeminiConfig {
        GeminiConfig {
            api_key: Secret::new("test-key".to_string()),
            model: "gemini-2.5-flash-preview-tts".to_string(),
            api_base: api_base.to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn api_url_includes_model_and_method() {
        let provider = GeminiSpeechProvider::new(config("https://example.test/v1beta/")).unwrap();
        assert_eq!(
            provider.api_url("generateContent"),
            "https://example.test/v1beta/models/gemini-2.5-flash-preview-tts:generateContent"
        );
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let mut cfg = config(GEMINI_API_BASE);
        cfg.api_key = Secret::new(String::new());
        assert!(matches!(
            GeminiSpeechProvider::new(cfg),
            Err(ProviderError::NotConfigured(_))
        ));
    }

    #[test]
    fn api_error_uses_google_message() {
        let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
        let err = api_error(StatusCode::BAD_REQUEST, body);
        assert!(matches!(err, ProviderError::Api(_)));
        assert_eq!(
            err.to_string(),
            "Gemini API error 400 Bad Request: API key not valid."
        );
    }

    #[test]
    fn api_error_falls_back_to_raw_body() {
        let err = api_error(StatusCode::BAD_GATEWAY, "upstream exploded\n");
        assert_eq!(
            err.to_string(),
            "Gemini API error 502 Bad Gateway: upstream exploded"
        );
    }

    #[test]
    fn too_many_requests_maps_to_rate_limited() {
        let body = r#"{"error":{"code":429,"message":"quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = api_error(StatusCode::TOO_MANY_REQUESTS, body);
        assert!(matches!(err, ProviderError::RateLimited(_)));
        assert!(err.to_string().contains("quota exceeded"));
    }
}
