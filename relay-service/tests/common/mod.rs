//! Test helpers for relay-service integration tests.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, Response},
    Router,
};
use relay_service::config::{CorsSettings, GeminiSettings, RelayConfig};
use relay_service::services::providers::SpeechProvider;
use relay_service::services::Relay;
use relay_service::startup::{build_router, AppState, Application};
use secrecy::Secret;
use std::sync::Arc;
use std::time::Duration;

pub const TEST_VOICE: &str = "Puck";

/// Config pointing at `api_base`, bound to a random local port.
pub fn test_config(api_base: &str) -> RelayConfig {
    RelayConfig {
        common: service_core::config::Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            log_level: "error".to_string(),
            otlp_endpoint: None,
        },
        gemini: GeminiSettings {
            api_key: Secret::new("test-api-key".to_string()),
            model: "gemini-2.5-flash-preview-tts".to_string(),
            voice: TEST_VOICE.to_string(),
            api_base: api_base.to_string(),
            timeout_secs: 5,
        },
        cors: CorsSettings::default(),
    }
}

/// Router wired to `provider`, for `oneshot` tests.
pub fn router_with(provider: Arc<dyn SpeechProvider>) -> Router {
    let state = AppState {
        relay: Relay::new(provider, TEST_VOICE),
    };
    build_router(state, &CorsSettings::default())
}

pub fn chat_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Spawn a full application on a random port and return its base URL.
pub async fn spawn_app(config: RelayConfig, provider: Arc<dyn SpeechProvider>) -> String {
    let app = Application::build_with_provider(config, provider)
        .await
        .expect("Failed to build application");
    let port = app.port();

    tokio::spawn(async move {
        let _ = app.run_until_stopped().await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;

    format!("http://127.0.0.1:{}", port)
}
