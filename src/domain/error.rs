use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// The kind of record a `NotFound` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Board,
    Column,
    Task,
}

impl Entity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Entity::Board => "board",
            Entity::Column => "column",
            Entity::Task => "task",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum KanbanError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: Entity, id: String },

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Concurrent modification or lock contention. Safe to retry.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl KanbanError {
    pub fn not_found(entity: Entity, id: impl Into<String>) -> Self {
        KanbanError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, KanbanError::Conflict(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            KanbanError::NotFound { .. } => "not_found",
            KanbanError::Forbidden(_) => "forbidden",
            KanbanError::InvalidArgument(_) => "invalid_argument",
            KanbanError::Conflict(_) => "conflict",
            KanbanError::Database(_) => "store_failure",
            KanbanError::Serialization(_) | KanbanError::Internal(_) => "internal",
        }
    }
}

// SQLITE_BUSY (5) and SQLITE_LOCKED (6), including their extended codes
// such as SQLITE_BUSY_SNAPSHOT (517).
fn is_contention(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err
            .code()
            .and_then(|code| code.parse::<i32>().ok())
            .map(|code| matches!(code & 0xff, 5 | 6))
            .unwrap_or(false),
        sqlx::Error::PoolTimedOut => true,
        _ => false,
    }
}

impl From<sqlx::Error> for KanbanError {
    fn from(err: sqlx::Error) -> Self {
        if is_contention(&err) {
            KanbanError::Conflict(format!("store contention: {}", err))
        } else {
            KanbanError::Database(err)
        }
    }
}

impl IntoResponse for KanbanError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            KanbanError::NotFound { .. } => (StatusCode::NOT_FOUND, self.to_string()),
            KanbanError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            KanbanError::InvalidArgument(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            KanbanError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            KanbanError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            KanbanError::Database(err) => {
                tracing::error!("Database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                )
            }
            KanbanError::Serialization(err) => {
                tracing::error!("Serialization error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                )
            }
        };

        let body = json!({
            "error": message,
            "kind": self.kind(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
