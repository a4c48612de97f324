//! Chat completion constrained by a guardrail policy
//!
//! Sends a two-message payload (system = guardrail, user = transcript) to
//! the chat-completion service, non-streaming.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Requests a guardrailed answer for a transcript
#[derive(Debug)]
pub struct ChatClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ChatClient {
    /// Create a new chat client
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new(api_key: String, model: String, base_url: Option<&str>) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config("chat API key required".to_string()));
        }

        Ok(Self {
            client: crate::http_client()?,
            base_url: base_url
                .unwrap_or(crate::config::DEFAULT_CHAT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key,
            model,
        })
    }

    /// Request an answer for the transcript under the guardrail policy
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] on network-level failure and
    /// [`Error::EmptyResponse`] when `message.content` is absent. Both are
    /// caught and logged by the orchestrator, which halts without an answer.
    pub async fn complete(&self, guardrail: &str, transcript: &str) -> Result<String> {
        tracing::debug!(model = %self.model, "requesting chat completion");

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: guardrail,
                },
                ChatMessage {
                    role: "user",
                    content: transcript,
                },
            ],
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let body = response.text().await?;
        let answer = extract_message_content(&body)?;

        tracing::info!(answer = %answer, "chat completion received");
        Ok(answer)
    }
}

/// Extract `message.content` from a chat response body
fn extract_message_content(body: &str) -> Result<String> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|_| Error::MalformedResponse(format!("chat response is not valid JSON: {body}")))?;

    parsed
        .message
        .and_then(|m| m.content)
        .ok_or_else(|| Error::EmptyResponse(format!("message.content absent from chat response: {body}")))
}
