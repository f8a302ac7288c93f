use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AssistantError, Result};
use crate::models::{ChatCompletionRequest, ChatCompletionResponse};

#[async_trait]
pub trait Transport: Send + Sync {
    async fn chat(&self, req: &ChatCompletionRequest) -> Result<ChatCompletionResponse>;
}

/// OpenAI-compatible chat completions client. One attempt per call, no retries.
pub struct OpenAiTransport {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl OpenAiTransport {
    pub fn new(api_key: String, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_key,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl Transport for OpenAiTransport {
    async fn chat(&self, req: &ChatCompletionRequest) -> Result<ChatCompletionResponse> {
        tracing::debug!(
            model = %req.model,
            messages = req.messages.len(),
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(req)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(status = status.as_u16(), "Chat completion request failed");
            return Err(AssistantError::Model(format!(
                "Chat completion API returned status code {}: {}",
                status.as_u16(),
                body
            )));
        }

        response.json().await.map_err(|e| {
            AssistantError::Model(format!("Failed to parse chat completion response: {e}"))
        })
    }
}
