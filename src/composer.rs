use async_trait::async_trait;
use std::sync::Arc;

use crate::error::{AssistantError, Result};
use crate::models::ChatCompletionRequest;
use crate::session::Transcript;
use crate::transport::Transport;

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Composer: Send + Sync {
    async fn compose(&self, transcript: &Transcript) -> Result<String>;
}

/// Composes replies with a chat completion model using fixed sampling parameters
pub struct ChatComposer {
    tx: Arc<dyn Transport>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl ChatComposer {
    pub fn new(tx: Arc<dyn Transport>, model: String, temperature: f32, max_tokens: u32) -> Self {
        Self {
            tx,
            model,
            temperature,
            max_tokens,
        }
    }
}

#[async_trait]
impl Composer for ChatComposer {
    async fn compose(&self, transcript: &Transcript) -> Result<String> {
        tracing::info!(
            "Composing response with {} over {} messages",
            self.model,
            transcript.len()
        );

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: transcript.messages().to_vec(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self.tx.chat(&request).await.map_err(|e| match e {
            AssistantError::Model(_) => e,
            other => AssistantError::Model(other.to_string()),
        })?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                AssistantError::Model("Chat completion API returned empty choices".to_string())
            })
    }
}
