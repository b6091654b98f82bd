use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::conversation::Turn;

/// Reply text sent in place of a completion when the round failed.
pub const ERROR_REPLY: &str = "Error";

/// Query string carrying the session identifier out-of-band.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionQuery {
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

impl SessionQuery {
    /// The caller-asserted identifier; absent and empty values are both missing.
    pub fn require_session_id(&self) -> Result<&str> {
        match self.session_id.as_deref() {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(Error::MissingIdentifier),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Body of every chat response. A failed round still answers with a success
/// status; the `error` field tells the caller no reply was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatResponse {
    pub fn reply(text: impl Into<String>) -> Self {
        Self {
            response: text.into(),
            error: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            response: ERROR_REPLY.to_string(),
            error: Some(reason.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub session_id: String,
    pub turns: Vec<Turn>,
}
