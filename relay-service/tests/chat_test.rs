mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{chat_request, json_body, router_with, spawn_app, test_config, TEST_VOICE};
use relay_service::models::{Modality, Part};
use relay_service::services::providers::mock::{MockSpeechProvider, MOCK_AUDIO_MIME_TYPE};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

fn hello_provider() -> Arc<MockSpeechProvider> {
    Arc::new(MockSpeechProvider::responding(vec![
        Part::text("hello"),
        Part::inline_data("audio/ogg", "QUJD"),
    ]))
}

#[tokio::test]
async fn chat_returns_text_and_audio() {
    let provider = hello_provider();
    let app = router_with(provider.clone());

    let response = app
        .oneshot(chat_request(r#"{"prompt":"Say hello"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({ "text": "hello", "audioData": "QUJD", "mimeType": "audio/ogg" })
    );
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn chat_sends_prompt_with_fixed_voice() {
    let provider = hello_provider();
    let app = router_with(provider.clone());

    app.oneshot(chat_request(r#"{"prompt":"What is Rust?"}"#))
        .await
        .unwrap();

    let requests = provider.requests();
    assert_eq!(requests.len(), 1);

    let request = &requests[0];
    assert_eq!(request.contents.len(), 1);
    assert_eq!(request.contents[0].role.as_deref(), Some("user"));
    assert_eq!(request.prompt_texts(), vec!["What is Rust?"]);

    let config = request.generation_config.as_ref().unwrap();
    assert_eq!(
        config.response_modalities,
        vec![Modality::Text, Modality::Audio]
    );
    assert_eq!(
        config.speech_config.as_ref().unwrap().voice_name(),
        TEST_VOICE
    );
}

#[tokio::test]
async fn missing_prompt_is_rejected_without_provider_call() {
    let provider = hello_provider();
    let app = router_with(provider.clone());

    for body in [
        r#"{}"#,
        r#"{"prompt":""}"#,
        r#"{"prompt":null}"#,
        r#"{"prompt":false}"#,
        r#"{"prompt":0}"#,
        r#"{"prompt":17}"#,
        r#"{"message":"hi"}"#,
        r#"[]"#,
        r#""just a string""#,
        r#"{not json"#,
        "",
    ] {
        let response = app.clone().oneshot(chat_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
        assert_eq!(
            json_body(response).await,
            json!({ "error": "Prompt is required" }),
            "body: {}",
            body
        );
    }

    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn missing_content_type_is_treated_as_missing_prompt() {
    let provider = hello_provider();
    let app = router_with(provider.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chat")
                .body(Body::from(r#"{"prompt":"hi"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn oversized_body_is_payload_too_large() {
    let provider = Arc::new(MockSpeechProvider::echoing());
    let app = router_with(provider.clone());

    let body = json!({ "prompt": "a".repeat(3 * 1024 * 1024) }).to_string();
    let response = app.oneshot(chat_request(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn missing_audio_part_is_a_server_error() {
    let provider = Arc::new(MockSpeechProvider::responding(vec![Part::text("hello")]));
    let app = router_with(provider.clone());

    let response = app
        .oneshot(chat_request(r#"{"prompt":"Say hello"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "Failed to generate content or audio data" })
    );
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn reordered_parts_are_a_server_error() {
    let provider = Arc::new(MockSpeechProvider::responding(vec![
        Part::inline_data("audio/ogg", "QUJD"),
        Part::text("hello"),
    ]));
    let app = router_with(provider);

    let response = app
        .oneshot(chat_request(r#"{"prompt":"Say hello"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "Failed to generate content or audio data" })
    );
}

#[tokio::test]
async fn provider_failure_reports_details() {
    let provider = Arc::new(MockSpeechProvider::failing("quota exceeded"));
    let app = router_with(provider.clone());

    let response = app
        .oneshot(chat_request(r#"{"prompt":"Say hello"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({
            "error": "An error occurred while interacting with the AI model.",
            "details": "quota exceeded"
        })
    );
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn each_request_makes_exactly_one_provider_call() {
    let provider = hello_provider();
    let app = router_with(provider.clone());

    for i in 0..3 {
        let body = json!({ "prompt": format!("prompt {}", i) }).to_string();
        let response = app.clone().oneshot(chat_request(&body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(provider.call_count(), 3);
    let prompts: Vec<String> = provider
        .requests()
        .iter()
        .map(|r| r.prompt_texts().join(""))
        .collect();
    assert_eq!(prompts, vec!["prompt 0", "prompt 1", "prompt 2"]);
}

#[tokio::test]
async fn concurrent_requests_do_not_interfere() {
    let provider = Arc::new(MockSpeechProvider::echoing().with_delay(Duration::from_millis(20)));
    let app = router_with(provider.clone());

    let prompts: Vec<String> = (0..16).map(|i| format!("prompt number {}", i)).collect();

    let responses = futures::future::join_all(prompts.iter().map(|prompt| {
        let app = app.clone();
        let body = json!({ "prompt": prompt }).to_string();
        async move {
            let response = app.oneshot(chat_request(&body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            json_body(response).await
        }
    }))
    .await;

    for (prompt, body) in prompts.iter().zip(responses) {
        assert_eq!(body["text"], prompt.as_str());
        assert_eq!(body["mimeType"], MOCK_AUDIO_MIME_TYPE);
        let expected_audio = {
            use base64::{engine::general_purpose::STANDARD, Engine};
            STANDARD.encode(prompt.as_bytes())
        };
        assert_eq!(body["audioData"], expected_audio.as_str());
    }

    assert_eq!(provider.call_count(), prompts.len());
}

#[tokio::test]
async fn chat_works_over_a_real_socket() {
    let provider = hello_provider();
    let base_url = spawn_app(test_config("http://127.0.0.1:9"), provider.clone()).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/chat", base_url))
        .json(&json!({ "prompt": "Say hello" }))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["text"], "hello");
    assert_eq!(provider.call_count(), 1);
}
