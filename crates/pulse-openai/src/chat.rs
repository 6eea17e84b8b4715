//! Structured post generation via chat completions.

use pulse_core::PostStructure;
use serde_json::json;

use crate::client::OpenAiClient;
use crate::error::OpenAiError;
use crate::types::{ChatMessage, ChatRequest, ChatResponse};

const CHAT_PATH: &str = "v1/chat/completions";
const TEMPERATURE: f64 = 0.7;
const SCHEMA_NAME: &str = "post_draft";

/// Strict JSON schema `response_format` for a [`PostStructure`].
#[must_use]
pub fn post_structure_schema() -> serde_json::Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": SCHEMA_NAME,
            "strict": true,
            "schema": {
                "type": "object",
                "properties": {
                    "hook": { "type": "string" },
                    "insight_body": { "type": "string" },
                    "human_connection": { "type": "string" },
                    "open_loop": { "type": "string" }
                },
                "required": ["hook", "insight_body", "human_connection", "open_loop"],
                "additionalProperties": false
            }
        }
    })
}

impl OpenAiClient {
    /// Runs one chat completion and decodes the structured post.
    ///
    /// # Errors
    ///
    /// - [`OpenAiError::SchemaViolation`] when the model refuses, truncates,
    ///   or returns content that does not decode into a [`PostStructure`].
    /// - [`OpenAiError::Api`] / [`OpenAiError::Http`] on transport failures
    ///   that survive the retry policy.
    pub async fn complete_post(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<PostStructure, OpenAiError> {
        let request = ChatRequest {
            model: &self.chat_model,
            temperature: TEMPERATURE,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            response_format: post_structure_schema(),
        };

        let response: ChatResponse = self.post_json(CHAT_PATH, &request).await?;
        parse_post(response)
    }
}

fn parse_post(response: ChatResponse) -> Result<PostStructure, OpenAiError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| OpenAiError::SchemaViolation("no choices in response".to_string()))?;

    if let Some(refusal) = choice.message.refusal.filter(|r| !r.is_empty()) {
        return Err(OpenAiError::SchemaViolation(format!("model refused: {refusal}")));
    }
    if choice.finish_reason.as_deref() == Some("length") {
        return Err(OpenAiError::SchemaViolation(
            "output truncated by token limit".to_string(),
        ));
    }

    let content = choice
        .message
        .content
        .ok_or_else(|| OpenAiError::SchemaViolation("empty message content".to_string()))?;

    serde_json::from_str::<PostStructure>(&content)
        .map_err(|e| OpenAiError::SchemaViolation(e.to_string()))
}
