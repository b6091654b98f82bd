//! Session actors
//!
//! Every session identifier is owned by exactly one [`actor::SessionActor`],
//! reached through the [`registry::SessionRegistry`]. The actor is the only
//! writer of that session's log and handles its calls strictly in arrival order.
//!
//! # Turn protocol
//!
//! 1. Load the persisted log (an absent key is an empty log)
//! 2. Append the user turn
//! 3. Send the system instruction plus the last N turns to the completion service
//! 4. On success, append the assistant turn and persist the full log
//! 5. On failure, record no assistant turn and report the reason as data
//!
//! # Usage
//!
//! ```rust,no_run
//! use edgemind::services::chat::{actor::SessionSettings, registry::SessionRegistry};
//! use edgemind::services::completion::build_backend;
//! use edgemind::services::storage::MemoryStore;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = edgemind::load_config()?;
//! let registry = SessionRegistry::new(
//!     Arc::new(MemoryStore::new()),
//!     build_backend(&config.completion)?,
//!     SessionSettings::from_config(&config),
//! );
//!
//! let outcome = registry.get_or_spawn("alice").await.handle_turn("hi".into()).await?;
//! # Ok(())
//! # }
//! ```

pub mod actor;
pub mod registry;

pub use actor::{FailurePolicy, SessionActor, SessionActorArgs, SessionSettings, TurnOutcome};
pub use registry::{SessionCommand, SessionHandle, SessionRegistry};
