use crate::error::{Error, Result};
use crate::models::requests::{ChatRequest, ChatResponse, HistoryResponse, SessionQuery};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;

/// Routes one user message to the actor owning `sessionId`.
///
/// Completion failures come back with a 200 and an `error` field; only a
/// missing identifier, a malformed body or a storage failure changes the
/// status code. The identifier is checked before the body.
pub async fn post_chat(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
    body: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>> {
    let session_id = query.require_session_id()?;
    let Json(req) = body.map_err(|rejection| Error::Validation(rejection.body_text()))?;
    tracing::info!(session_id = %session_id, "[ChatHandler] Received message");

    let handle = state.sessions.get_or_spawn(session_id).await;
    let outcome = handle.handle_turn(req.message).await?;

    Ok(Json(outcome.into()))
}

/// Returns the persisted log of a session. Unknown sessions get an empty log.
pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<HistoryResponse>> {
    let session_id = query.require_session_id()?;

    let turns = state.sessions.history(session_id).await?;

    Ok(Json(HistoryResponse {
        session_id: session_id.to_string(),
        turns,
    }))
}
