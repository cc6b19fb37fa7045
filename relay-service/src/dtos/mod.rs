use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

pub const PROMPT_REQUIRED: &str = "Prompt is required";

/// Body of `POST /api/chat`.
///
/// A `prompt` that is present but not a JSON string deserializes to `None`
/// and fails validation like an absent one.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ChatRequest {
    #[serde(default, deserialize_with = "string_or_none")]
    #[validate(
        required(message = "Prompt is required"),
        length(min = 1, message = "Prompt is required")
    )]
    pub prompt: Option<String>,
}

impl ChatRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
        }
    }

    /// The prompt, if it is a non-empty string.
    pub fn validated_prompt(&self) -> Option<&str> {
        self.validate().ok()?;
        self.prompt.as_deref()
    }
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    })
}

/// Successful reply: generated text plus the provider's base64 audio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub text: String,
    pub audio_data: String,
    pub mime_type: String,
}
