use thiserror::Error;

// Import Axum types for HTTP response conversion
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// The custom error type for the application.
///
/// Completion service failures are deliberately absent: they are reported to
/// the caller as data (see [`crate::services::completion::CompletionError`]).
#[derive(Debug, Error)]
pub enum Error {
    /// The request did not name the session it belongs to.
    #[error("Missing sessionId")]
    MissingIdentifier,

    /// A malformed request payload.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The durable store refused a read or write.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// An error originating from the sqlx library.
    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// A migration failed while preparing the store.
    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// The session actor stopped before answering.
    #[error("Session actor unavailable: {0}")]
    ActorUnavailable(String),

    /// An internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, Error>` to simplify function signatures.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Machine-readable code sent alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            Error::MissingIdentifier => "MISSING_IDENTIFIER",
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::Persistence(_) | Error::Sqlx(_) | Error::Migrate(_) => "PERSISTENCE_ERROR",
            Error::Config(_) => "CONFIG_ERROR",
            Error::ActorUnavailable(_) => "SESSION_UNAVAILABLE",
            Error::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::MissingIdentifier => StatusCode::BAD_REQUEST,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::ActorUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Convert custom Error to HTTP response
///
/// Store and driver details are logged but never sent to the client.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let message = match &self {
            Error::MissingIdentifier => self.to_string(),
            Error::Validation(msg) => msg.clone(),
            Error::Persistence(_) | Error::Sqlx(_) | Error::Migrate(_) => {
                tracing::error!(error = %self, "Persistence failure while handling request");
                "Database error".to_string()
            }
            Error::Config(_) => "Configuration error".to_string(),
            Error::ActorUnavailable(_) => "Session temporarily unavailable".to_string(),
            Error::Internal(msg) => msg.clone(),
        };

        let body = serde_json::json!({
            "error": message,
            "code": self.code(),
        });

        (self.status(), Json(body)).into_response()
    }
}
