use crate::config::Config;
use crate::error::Result;
use crate::models::conversation::{build_completion_request, Turn};
use crate::models::requests::ChatResponse;
use crate::services::chat::registry::{SessionCommand, SessionHandle};
use crate::services::completion::{complete_with_timeout, CompletionBackend};
use crate::services::storage::ConversationStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// What gets persisted when the completion call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Nothing is written unless the whole round succeeds.
    #[default]
    DiscardRound,
    /// The user turn is written before calling the service and kept on failure.
    PersistUserTurn,
}

/// Per-session tuning shared by every actor of a registry.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub system_prompt: String,
    pub context_window: usize,
    pub completion_timeout: Duration,
    pub failure_policy: FailurePolicy,
    pub mailbox_capacity: usize,
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            system_prompt: config.completion.system_prompt.clone(),
            context_window: config.session.context_window,
            completion_timeout: Duration::from_secs(config.completion.timeout_seconds),
            failure_policy: config.session.failure_policy,
            mailbox_capacity: config.session.mailbox_capacity.max(1),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Result of one user turn, as seen by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Replied { reply: String },
    Failed { error: String },
}

impl From<TurnOutcome> for ChatResponse {
    fn from(outcome: TurnOutcome) -> Self {
        match outcome {
            TurnOutcome::Replied { reply } => ChatResponse::reply(reply),
            TurnOutcome::Failed { error } => ChatResponse::failed(error),
        }
    }
}

/// Where the actor is within the current call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SessionPhase {
    Idle,
    LoadingLog,
    AwaitingCompletion,
    Persisting,
    Failed,
}

pub struct SessionActorArgs {
    pub session_id: String,
    pub store: Arc<dyn ConversationStore>,
    pub completion: Arc<dyn CompletionBackend>,
    pub settings: SessionSettings,
}

/// Exclusive owner of one session's conversation log.
///
/// Commands are drained one at a time from a FIFO mailbox, so no two
/// operations for the same session ever overlap.
pub struct SessionActor {
    session_id: String,
    store: Arc<dyn ConversationStore>,
    completion: Arc<dyn CompletionBackend>,
    settings: SessionSettings,
    command_rx: mpsc::Receiver<SessionCommand>,
    phase: SessionPhase,
}

impl SessionActor {
    pub fn spawn(args: SessionActorArgs) -> SessionHandle {
        let (command_tx, command_rx) = mpsc::channel(args.settings.mailbox_capacity);
        let session_id = args.session_id.clone();

        let actor = Self {
            session_id: args.session_id,
            store: args.store,
            completion: args.completion,
            settings: args.settings,
            command_rx,
            phase: SessionPhase::Idle,
        };

        tokio::spawn(async move {
            actor.run().await;
        });

        SessionHandle {
            session_id,
            command_tx,
        }
    }

    async fn run(mut self) {
        tracing::info!(session_id = %self.session_id, "[SessionActor] Started");

        while let Some(command) = self.command_rx.recv().await {
            match command {
                SessionCommand::HandleTurn { message, responder } => {
                    let result = self.handle_turn(message).await;
                    if let Err(e) = &result {
                        tracing::error!(
                            session_id = %self.session_id,
                            error = %e,
                            "[SessionActor] Turn aborted by persistence failure"
                        );
                        self.enter(SessionPhase::Failed);
                    }
                    self.enter(SessionPhase::Idle);
                    // The caller may have gone away; the turn still ran to completion.
                    let _ = responder.send(result);
                }
                SessionCommand::Snapshot { responder } => {
                    let _ = responder.send(self.store.load(&self.session_id).await);
                }
                SessionCommand::Shutdown => {
                    tracing::info!(session_id = %self.session_id, "[SessionActor] Shutting down");
                    break;
                }
            }
        }

        tracing::info!(session_id = %self.session_id, "[SessionActor] Stopped");
    }

    fn enter(&mut self, phase: SessionPhase) {
        tracing::trace!(
            session_id = %self.session_id,
            from = %self.phase,
            to = %phase,
            "[SessionActor] Phase transition"
        );
        self.phase = phase;
    }

    /// One load → append → complete → persist round.
    ///
    /// Completion failures come back as [`TurnOutcome::Failed`]; only store
    /// failures are returned as errors.
    async fn handle_turn(&mut self, message: String) -> Result<TurnOutcome> {
        self.enter(SessionPhase::LoadingLog);
        let mut log = self.store.load(&self.session_id).await?;
        log.push(Turn::user(message));

        if self.settings.failure_policy == FailurePolicy::PersistUserTurn {
            self.store.save(&self.session_id, &log).await?;
        }

        let request = build_completion_request(
            &self.settings.system_prompt,
            &log,
            self.settings.context_window,
        );

        tracing::debug!(
            session_id = %self.session_id,
            log_len = log.len(),
            request_len = request.len(),
            "[SessionActor] Requesting completion"
        );

        self.enter(SessionPhase::AwaitingCompletion);
        let reply = match complete_with_timeout(
            self.completion.as_ref(),
            &request,
            self.settings.completion_timeout,
        )
        .await
        {
            Ok(reply) => reply,
            Err(e) => {
                self.enter(SessionPhase::Failed);
                tracing::warn!(
                    session_id = %self.session_id,
                    error = %e,
                    policy = ?self.settings.failure_policy,
                    "[SessionActor] Completion failed; no assistant turn recorded"
                );
                return Ok(TurnOutcome::Failed {
                    error: e.to_string(),
                });
            }
        };

        self.enter(SessionPhase::Persisting);
        log.push(Turn::assistant(reply.clone()));
        self.store.save(&self.session_id, &log).await?;

        tracing::info!(
            session_id = %self.session_id,
            log_len = log.len(),
            "[SessionActor] Turn complete"
        );

        Ok(TurnOutcome::Replied { reply })
    }
}
