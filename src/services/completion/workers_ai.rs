//! Cloudflare Workers AI completion backend.
//!
//! Talks to the REST endpoint `POST {base}/accounts/{account}/ai/run/{model}`
//! with a `{messages}` body. The reply lives at `result.response`.

use super::{CompletionBackend, CompletionError, CompletionReply};
use crate::config::CompletionConfig;
use crate::error::{Error, Result};
use crate::models::conversation::Turn;
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_WORKERS_AI_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

#[derive(Debug, Serialize)]
struct RunRequest<'a> {
    messages: &'a [Turn],
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: Option<i64>,
    message: String,
}

/// Envelope returned by the Cloudflare API.
#[derive(Debug, Deserialize)]
struct RunEnvelope {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    result: Option<CompletionReply>,
    #[serde(default)]
    errors: Vec<ApiMessage>,
}

pub struct WorkersAiBackend {
    http: reqwest::Client,
    endpoint: String,
    api_token: SecretString,
}

impl fmt::Debug for WorkersAiBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkersAiBackend")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl WorkersAiBackend {
    pub fn new(config: &CompletionConfig, account_id: &str) -> Result<Self> {
        let base = config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_WORKERS_AI_BASE_URL)
            .trim_end_matches('/');
        let endpoint = format!("{}/accounts/{}/ai/run/{}", base, account_id, config.model);

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(endpoint = %endpoint, "Creating Workers AI backend");

        Ok(Self {
            http,
            endpoint,
            api_token: config.api_key.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Interprets an API envelope: explicit errors fail, otherwise the result
/// (possibly absent) is handed back for reply validation.
fn interpret_envelope(
    envelope: RunEnvelope,
) -> std::result::Result<Option<CompletionReply>, CompletionError> {
    if envelope.success == Some(false) || !envelope.errors.is_empty() {
        let reason = envelope
            .errors
            .iter()
            .map(|e| match e.code {
                Some(code) => format!("{} ({})", e.message, code),
                None => e.message.clone(),
            })
            .collect::<Vec<_>>()
            .join("; ");
        let reason = if reason.is_empty() {
            "Workers AI request failed".to_string()
        } else {
            reason
        };
        return Err(CompletionError::Provider(reason));
    }

    Ok(envelope.result)
}

#[async_trait]
impl CompletionBackend for WorkersAiBackend {
    async fn complete(
        &self,
        messages: &[Turn],
    ) -> std::result::Result<Option<CompletionReply>, CompletionError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(self.api_token.expose_secret())
            .json(&RunRequest { messages })
            .send()
            .await
            .map_err(|e| CompletionError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CompletionError::Request(e.to_string()))?;

        let envelope: RunEnvelope = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(CompletionError::Provider(format!(
                    "Workers AI returned HTTP {}",
                    status
                )));
            }
            Err(e) => {
                tracing::warn!(error = %e, "[WorkersAiBackend] Unparseable response body");
                return Ok(None);
            }
        };

        interpret_envelope(envelope)
    }
}
