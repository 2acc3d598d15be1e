//! Chat-completion client for result enrichment.
//!
//! [`CompletionClient`] abstracts the model call; [`OpenAiClient`] speaks
//! the OpenAI chat-completions wire contract against any compatible
//! endpoint. Single-shot completion is what enrichment uses; streaming is
//! exposed for callers that want incremental output.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::{OmniError, Result};

/// Default sampling temperature for enrichment completions.
const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Timeout for completion requests. Model calls are slower than search
/// provider calls, so this is deliberately generous.
const COMPLETION_TIMEOUT_SECS: u64 = 120;

/// A single role-tagged message in a chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message author (`system`, `user`, `assistant`).
    pub role: String,
    /// The content of the message.
    pub content: String,
}

impl ChatMessage {
    /// Build a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_owned(),
            content: content.into(),
        }
    }

    /// Build a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_owned(),
            content: content.into(),
        }
    }
}

/// A hosted chat-completion model.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Single-shot completion: returns the model's full reply text.
    async fn completion(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Streaming completion: yields reply text deltas as they arrive.
    async fn stream_completion(
        &self,
        messages: &[ChatMessage],
    ) -> Result<mpsc::Receiver<Result<String>>>;
}

// ── OpenAI wire types ─────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    delta: Delta,
}

#[derive(Debug, Deserialize)]
struct Delta {
    content: Option<String>,
}

// ── Client ────────────────────────────────────────────────────

/// Client for any endpoint exposing `POST {base_url}/chat/completions`.
pub struct OpenAiClient {
    client: reqwest::Client,
    /// Base URL including `/v1`.
    base_url: String,
    api_key: String,
    model_name: String,
}

impl OpenAiClient {
    /// Build a client for the given endpoint, key, and model.
    ///
    /// # Errors
    ///
    /// Returns [`OmniError::Http`] if the underlying HTTP client cannot
    /// be constructed.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model_name: impl Into<String>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(COMPLETION_TIMEOUT_SECS))
            .build()
            .map_err(|e| OmniError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            api_key: api_key.into(),
            model_name: model_name.into(),
        })
    }

    fn build_body(&self, messages: &[ChatMessage], stream: bool) -> serde_json::Value {
        serde_json::json!({
            "model": self.model_name,
            "messages": messages,
            "temperature": DEFAULT_TEMPERATURE,
            "stream": stream,
        })
    }

    async fn send(&self, messages: &[ChatMessage], stream: bool) -> Result<reqwest::Response> {
        let body = self.build_body(messages, stream);
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| OmniError::Http(format!("completion request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(OmniError::Completion(format!(
                "completion API returned {status}: {detail}"
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn completion(&self, messages: &[ChatMessage]) -> Result<String> {
        let response = self.send(messages, false).await?;

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| OmniError::Completion(format!("malformed completion response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| OmniError::Completion("completion response had no choices".into()))
    }

    async fn stream_completion(
        &self,
        messages: &[ChatMessage],
    ) -> Result<mpsc::Receiver<Result<String>>> {
        let response = self.send(messages, true).await?;
        let (tx, rx) = mpsc::channel(32);

        tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut buffer = String::new();

            while let Some(chunk) = stream.next().await {
                let chunk = match chunk {
                    Ok(c) => c,
                    Err(e) => {
                        let _ = tx
                            .send(Err(OmniError::Http(format!("stream read failed: {e}"))))
                            .await;
                        return;
                    }
                };
                buffer.push_str(&String::from_utf8_lossy(&chunk));

                // SSE events are newline-delimited; keep any partial line.
                while let Some(newline) = buffer.find('\n') {
                    let line = buffer[..newline].trim().to_owned();
                    buffer.drain(..=newline);

                    let Some(data) = line.strip_prefix("data:").map(str::trim) else {
                        continue;
                    };
                    if data == "[DONE]" {
                        return;
                    }
                    match serde_json::from_str::<StreamChunk>(data) {
                        Ok(parsed) => {
                            let delta = parsed
                                .choices
                                .into_iter()
                                .next()
                                .and_then(|c| c.delta.content);
                            if let Some(text) = delta {
                                if tx.send(Ok(text)).await.is_err() {
                                    return;
                                }
                            }
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "unparseable stream chunk skipped");
                        }
                    }
                }
            }
        });

        Ok(rx)
    }
}
