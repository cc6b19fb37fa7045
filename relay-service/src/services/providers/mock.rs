//! Mock provider implementation for testing.

use super::{ProviderError, SpeechProvider};
use crate::models::{GenerateContentRequest, GenerateContentResponse, Part};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// MIME type the echo mode reports for its fake audio.
pub const MOCK_AUDIO_MIME_TYPE: &str = "audio/L16;codec=pcm;rate=24000";

/// What the mock answers with.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Always return this response.
    Respond(GenerateContentResponse),
    /// Always fail with `ProviderError::Api(message)`.
    Fail(String),
    /// Return the prompt as text and its base64 encoding as audio.
    Echo,
}

/// Mock provider that counts calls and keeps every request it saw.
pub struct MockSpeechProvider {
    behavior: MockBehavior,
    delay: Option<Duration>,
    calls: AtomicUsize,
    requests: Mutex<Vec<GenerateContentRequest>>,
}

impl MockSpeechProvider {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            delay: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn responding(parts: Vec<Part>) -> Self {
        Self::new(MockBehavior::Respond(GenerateContentResponse::from_parts(
            parts,
        )))
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(MockBehavior::Fail(message.into()))
    }

    pub fn echoing() -> Self {
        Self::new(MockBehavior::Echo)
    }

    /// Sleep this long inside every call before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<GenerateContentRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn echo(request: &GenerateContentRequest) -> GenerateContentResponse {
        let prompt = request.prompt_texts().join("\n");
        GenerateContentResponse::from_parts(vec![
            Part::text(prompt.clone()),
            Part::inline_data(MOCK_AUDIO_MIME_TYPE, STANDARD.encode(prompt.as_bytes())),
        ])
    }
}

#[async_trait]
impl SpeechProvider for MockSpeechProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.behavior {
            MockBehavior::Respond(response) => Ok(response.clone()),
            MockBehavior::Fail(message) => Err(ProviderError::Api(message.clone())),
            MockBehavior::Echo => Ok(Self::echo(request)),
        }
    }
}
