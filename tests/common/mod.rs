
#[allow(unused_imports)]
pub use backends::{FlakyStore, Script, ScriptedBackend};
#[allow(unused_imports)]
pub use test_app::TestApp;

use edgemind::services::chat::{SessionRegistry, SessionSettings};
use edgemind::services::completion::CompletionBackend;
use edgemind::services::storage::ConversationStore;
use std::sync::Arc;

/// Generates a session identifier unique to this test run.
#[allow(dead_code)]
pub fn unique_session(prefix: &str) -> String {
    format!("{}_{}", prefix, nanoid::nanoid!(10))
}

/// Registry wired to the given store and backend with default settings.
#[allow(dead_code)]
pub fn registry_with(
    store: Arc<dyn ConversationStore>,
    backend: Arc<dyn CompletionBackend>,
) -> SessionRegistry {
    SessionRegistry::new(store, backend, SessionSettings::default())
}
