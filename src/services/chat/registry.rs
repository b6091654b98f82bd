use crate::error::{Error, Result};
use crate::models::conversation::Turn;
use crate::services::chat::actor::{SessionActor, SessionActorArgs, SessionSettings, TurnOutcome};
use crate::services::completion::CompletionBackend;
use crate::services::storage::ConversationStore;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

#[derive(Debug)]
pub enum SessionCommand {
    HandleTurn {
        message: String,
        responder: oneshot::Sender<Result<TurnOutcome>>,
    },
    Snapshot {
        responder: oneshot::Sender<Result<Vec<Turn>>>,
    },
    Shutdown,
}

/// Cloneable address of a running session actor.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    pub session_id: String,
    pub command_tx: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    /// Queues a user message behind any in-flight turn and waits for its outcome.
    pub async fn handle_turn(&self, message: String) -> Result<TurnOutcome> {
        let (responder, response) = oneshot::channel();
        self.command_tx
            .send(SessionCommand::HandleTurn { message, responder })
            .await
            .map_err(|_| self.unavailable())?;

        response.await.map_err(|_| self.unavailable())?
    }

    /// Current persisted log, read by the owning actor.
    pub async fn snapshot(&self) -> Result<Vec<Turn>> {
        let (responder, response) = oneshot::channel();
        self.command_tx
            .send(SessionCommand::Snapshot { responder })
            .await
            .map_err(|_| self.unavailable())?;

        response.await.map_err(|_| self.unavailable())?
    }

    /// Asks the actor to stop once the commands queued before this one are
    /// done, and waits until it has.
    pub async fn shutdown(&self) {
        let _ = self.command_tx.send(SessionCommand::Shutdown).await;
        self.command_tx.closed().await;
    }

    pub fn is_closed(&self) -> bool {
        self.command_tx.is_closed()
    }

    fn unavailable(&self) -> Error {
        Error::ActorUnavailable(format!("session actor for {} has stopped", self.session_id))
    }
}

/// Maps session identifiers to their one and only actor.
///
/// Actors are created on first use and live until [`SessionRegistry::shutdown_all`].
/// A restarted process rebuilds them lazily from the store.
pub struct SessionRegistry {
    sessions: scc::HashMap<String, SessionHandle>,
    store: Arc<dyn ConversationStore>,
    completion: Arc<dyn CompletionBackend>,
    settings: SessionSettings,
}

impl SessionRegistry {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        completion: Arc<dyn CompletionBackend>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            sessions: scc::HashMap::new(),
            store,
            completion,
            settings,
        }
    }

    /// Handle of the live actor for `session_id`, if one is running.
    pub async fn get_handle(&self, session_id: &str) -> Option<SessionHandle> {
        self.sessions
            .read_async(session_id, |_, h| h.clone())
            .await
            .filter(|h| !h.is_closed())
    }

    /// Returns the actor owning `session_id`, spawning it if this is the first request.
    ///
    /// Spawning happens while the entry is locked, so concurrent first requests
    /// for one identifier still end up at a single actor. An actor that has
    /// stopped is replaced the same way.
    pub async fn get_or_spawn(&self, session_id: &str) -> SessionHandle {
        if let Some(handle) = self.get_handle(session_id).await {
            return handle;
        }

        match self.sessions.entry_async(session_id.to_string()).await {
            scc::hash_map::Entry::Occupied(mut entry) => {
                if !entry.get().is_closed() {
                    return entry.get().clone();
                }
                tracing::warn!(session_id = %session_id, "[SessionRegistry] Replacing stopped session actor");
                let handle = self.spawn_actor(session_id);
                *entry.get_mut() = handle.clone();
                handle
            }
            scc::hash_map::Entry::Vacant(entry) => {
                tracing::info!(session_id = %session_id, "[SessionRegistry] Spawning session actor");
                let handle = self.spawn_actor(session_id);
                let _ = entry.insert_entry(handle.clone());
                handle
            }
        }
    }

    /// Persisted log of `session_id`.
    ///
    /// Goes through the live actor when there is one so the read is ordered
    /// with its writes. Otherwise nothing can be writing and the store is read
    /// directly, without spawning.
    pub async fn history(&self, session_id: &str) -> Result<Vec<Turn>> {
        match self.get_handle(session_id).await {
            Some(handle) => handle.snapshot().await,
            None => self.store.load(session_id).await,
        }
    }

    fn spawn_actor(&self, session_id: &str) -> SessionHandle {
        SessionActor::spawn(SessionActorArgs {
            session_id: session_id.to_string(),
            store: Arc::clone(&self.store),
            completion: Arc::clone(&self.completion),
            settings: self.settings.clone(),
        })
    }

    /// Number of live session actors.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Stops every actor after its queued turns and forgets it.
    pub async fn shutdown_all(&self) {
        let mut handles = Vec::new();
        self.sessions
            .retain_async(|_, handle| {
                handles.push(handle.clone());
                false
            })
            .await;

        tracing::info!(count = handles.len(), "[SessionRegistry] Shutting down session actors");
        futures::future::join_all(handles.iter().map(|h| h.shutdown())).await;
    }
}
