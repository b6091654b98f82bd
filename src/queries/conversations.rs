use crate::{
    error::{Error, Result},
    models::conversation::Turn,
    DbConn,
};
use sqlx::types::Json;

/// Retrieves the stored turns of a session, or `None` when the session has never been saved.
pub async fn get_turns(conn: &mut DbConn, session_id: &str) -> Result<Option<Vec<Turn>>> {
    let row: Option<(Json<Vec<Turn>>,)> = sqlx::query_as(
        r#"
        SELECT turns
        FROM conversation_logs
        WHERE session_id = $1
        "#,
    )
    .bind(session_id)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(row.map(|(Json(turns),)| turns))
}

/// Replaces the stored turns of a session, creating the record on first write.
pub async fn upsert_turns(conn: &mut DbConn, session_id: &str, turns: &[Turn]) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO conversation_logs (session_id, turns, updated_at)
        VALUES ($1, $2, NOW())
        ON CONFLICT (session_id)
        DO UPDATE SET turns = EXCLUDED.turns, updated_at = NOW()
        "#,
    )
    .bind(session_id)
    .bind(Json(turns))
    .execute(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(())
}
