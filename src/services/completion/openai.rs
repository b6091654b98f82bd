//! OpenAI completion backend built on rig.

use super::{CompletionBackend, CompletionError, CompletionReply};
use crate::config::CompletionConfig;
use crate::error::{Error, Result};
use crate::models::conversation::{Turn, TurnRole};
use async_trait::async_trait;
use rig::completion::{Chat, Message};
use rig::providers::openai::Client;
use secrecy::ExposeSecret;
use std::fmt;

pub struct OpenAiBackend {
    client: Client,
    model: String,
}

impl fmt::Debug for OpenAiBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiBackend")
            .field("model", &self.model)
            .field("client", &"<OpenAI Client>")
            .finish()
    }
}

impl OpenAiBackend {
    pub fn new(config: &CompletionConfig) -> Result<Self> {
        let api_key = config.api_key.expose_secret();
        let client = if let Some(url) = config.base_url.as_deref() {
            tracing::info!(base_url = %url, "Creating OpenAI backend with custom base URL");
            Client::builder()
                .api_key(api_key)
                .base_url(url)
                .build()
                .map_err(|e| Error::Internal(format!("Failed to create OpenAI client: {:?}", e)))?
        } else {
            tracing::info!("Creating OpenAI backend with default base URL");
            Client::new(api_key)
                .map_err(|e| Error::Internal(format!("Failed to create OpenAI client: {:?}", e)))?
        };

        Ok(Self {
            client,
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Splits a flat message list into rig's shape: system turns become the
/// preamble, the final turn is the prompt and everything between is history.
fn split_messages(messages: &[Turn]) -> Option<(String, Vec<Message>, Message)> {
    let preamble = messages
        .iter()
        .filter(|turn| turn.role == TurnRole::System)
        .map(|turn| turn.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut dialogue: Vec<Message> = messages
        .iter()
        .filter_map(|turn| match turn.role {
            TurnRole::User => Some(Message::user(turn.content.clone())),
            TurnRole::Assistant => Some(Message::assistant(turn.content.clone())),
            TurnRole::System => None,
        })
        .collect();

    let prompt = dialogue.pop()?;
    Some((preamble, dialogue, prompt))
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn complete(
        &self,
        messages: &[Turn],
    ) -> std::result::Result<Option<CompletionReply>, CompletionError> {
        use rig::client::CompletionClient;

        let (preamble, history, prompt) = split_messages(messages)
            .ok_or_else(|| CompletionError::Request("No prompt to send".to_string()))?;

        let agent = self
            .client
            .agent(self.model.as_str())
            .preamble(&preamble)
            .build();

        tracing::debug!(
            model = %self.model,
            history_len = history.len(),
            "[OpenAiBackend] Sending completion request"
        );

        let text = agent
            .chat(prompt, history)
            .await
            .map_err(|e| CompletionError::Provider(e.to_string()))?;

        Ok(Some(CompletionReply::text(text)))
    }
}
