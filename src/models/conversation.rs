use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Number of most recent turns replayed to the completion service by default.
pub const DEFAULT_CONTEXT_WINDOW: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TurnRole {
    System,
    User,
    Assistant,
}

/// One immutable entry of a conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
}

impl Turn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

/// The most recent `size` turns of `log`, or the whole log when it is shorter.
pub fn context_window(log: &[Turn], size: usize) -> &[Turn] {
    let start = log.len().saturating_sub(size);
    &log[start..]
}

/// Message list sent to the completion service: the system instruction
/// followed by the trimmed context window.
pub fn build_completion_request(system_prompt: &str, log: &[Turn], window: usize) -> Vec<Turn> {
    let context = context_window(log, window);
    let mut messages = Vec::with_capacity(context.len() + 1);
    messages.push(Turn::system(system_prompt));
    messages.extend_from_slice(context);
    messages
}
