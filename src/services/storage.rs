//! Durable conversation log storage.
//!
//! Every session identifier owns exactly one record: the ordered sequence of
//! its turns. Stores are only ever touched by the session actor owning that
//! identifier, so implementations need no per-key locking of their own.

use crate::config::{StorageBackend, StorageConfig};
use crate::error::Result;
use crate::models::conversation::Turn;
use crate::queries;
use crate::DbPool;
use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

/// Pluggable key-value store holding one conversation log per session.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Loads the log for `session_id`. An absent key is an empty log.
    async fn load(&self, session_id: &str) -> Result<Vec<Turn>>;

    /// Replaces the log for `session_id` with `turns`.
    async fn save(&self, session_id: &str, turns: &[Turn]) -> Result<()>;
}

/// Process-local store, used by tests and the `memory` backend.
#[derive(Default)]
pub struct MemoryStore {
    logs: scc::HashMap<String, Vec<Turn>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions with a stored log.
    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn load(&self, session_id: &str) -> Result<Vec<Turn>> {
        Ok(self
            .logs
            .read_async(session_id, |_, turns| turns.clone())
            .await
            .unwrap_or_default())
    }

    async fn save(&self, session_id: &str, turns: &[Turn]) -> Result<()> {
        match self.logs.entry_async(session_id.to_string()).await {
            scc::hash_map::Entry::Occupied(mut entry) => {
                *entry.get_mut() = turns.to_vec();
            }
            scc::hash_map::Entry::Vacant(entry) => {
                let _ = entry.insert_entry(turns.to_vec());
            }
        }
        Ok(())
    }
}

/// Postgres-backed store: one `conversation_logs` row per session, turns kept as JSONB.
pub struct PostgresStore {
    pool: DbPool,
}

impl PostgresStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Connects to the configured database and applies pending migrations.
    pub async fn connect(config: &StorageConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(config.database.connection_string().expose_secret())
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        tracing::info!(
            host = %config.database.host,
            database = %config.database.database,
            "[Storage] Connected to Postgres conversation store"
        );

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl ConversationStore for PostgresStore {
    async fn load(&self, session_id: &str) -> Result<Vec<Turn>> {
        let mut conn = self.pool.acquire().await?;
        let turns = queries::conversations::get_turns(&mut conn, session_id).await?;
        Ok(turns.unwrap_or_default())
    }

    async fn save(&self, session_id: &str, turns: &[Turn]) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        queries::conversations::upsert_turns(&mut conn, session_id, turns).await
    }
}

/// Builds the store selected by configuration.
pub async fn build_store(config: &StorageConfig) -> Result<Arc<dyn ConversationStore>> {
    match config.backend {
        StorageBackend::Memory => {
            tracing::warn!("[Storage] Using in-memory conversation store; logs will not survive a restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::Postgres => Ok(Arc::new(PostgresStore::connect(config).await?)),
    }
}
