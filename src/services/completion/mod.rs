//! External completion service adapters
//!
//! The completion service is opaque and stateless: every call carries the full
//! message list (system instruction plus context window) and is expected to
//! return a result object exposing one reply text field.

pub mod openai;
pub mod workers_ai;

pub use openai::OpenAiBackend;
pub use workers_ai::WorkersAiBackend;

use crate::config::{CompletionConfig, CompletionProvider};
use crate::error::{Error, Result};
use crate::models::conversation::Turn;
use async_trait::async_trait;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Error text used when the service answers without a usable reply.
pub const EMPTY_RESULT_MESSAGE: &str = "AI returned empty result. Model might be busy.";

/// Result object returned by a completion service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionReply {
    #[serde(default)]
    pub response: Option<String>,
}

impl CompletionReply {
    pub fn text(response: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
        }
    }
}

/// Ways a completion round can fail. Never surfaced as a transport error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CompletionError {
    /// The request could not be sent or the connection broke.
    #[error("{0}")]
    Request(String),

    /// The provider answered with an error status or error payload.
    #[error("{0}")]
    Provider(String),

    /// No answer within the configured deadline.
    #[error("Completion timed out after {0:?}")]
    Timeout(Duration),

    /// The service returned no result at all.
    #[error("{}", EMPTY_RESULT_MESSAGE)]
    EmptyResult,

    /// The result carried no usable reply text.
    #[error("{}", EMPTY_RESULT_MESSAGE)]
    MissingReply,

    /// The backend panicked while producing the reply.
    #[error("Completion backend panicked: {0}")]
    Panicked(String),
}

#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Sends the full message list; `Ok(None)` means the service produced no result.
    async fn complete(
        &self,
        messages: &[Turn],
    ) -> std::result::Result<Option<CompletionReply>, CompletionError>;
}

/// Calls `backend` under `deadline` and reduces every failure mode to a
/// [`CompletionError`], yielding the reply text on success.
///
/// A panicking backend is caught here so it cannot take the calling actor down.
pub async fn complete_with_timeout(
    backend: &dyn CompletionBackend,
    messages: &[Turn],
    deadline: Duration,
) -> std::result::Result<String, CompletionError> {
    let call = std::panic::AssertUnwindSafe(backend.complete(messages)).catch_unwind();
    let result = tokio::time::timeout(deadline, call)
        .await
        .map_err(|_| CompletionError::Timeout(deadline))?
        .map_err(|payload| CompletionError::Panicked(panic_message(payload.as_ref())))??;

    let reply = result.ok_or(CompletionError::EmptyResult)?;
    match reply.response {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(CompletionError::MissingReply),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Builds the backend selected by configuration.
pub fn build_backend(config: &CompletionConfig) -> Result<Arc<dyn CompletionBackend>> {
    match config.provider {
        CompletionProvider::Openai => Ok(Arc::new(OpenAiBackend::new(config)?)),
        CompletionProvider::WorkersAi => {
            let account_id = config.account_id.as_deref().ok_or_else(|| {
                Error::Validation("completion.account_id is required for workers_ai".to_string())
            })?;
            Ok(Arc::new(WorkersAiBackend::new(config, account_id)?))
        }
    }
}
