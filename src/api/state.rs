use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::domain::KanbanError;
use crate::services::RetryPolicy;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: Option<SqlitePool>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: Option<SqlitePool>, config: Arc<Config>) -> Self {
        Self { db, config }
    }

    pub fn require_db(&self) -> Result<&SqlitePool, KanbanError> {
        self.db
            .as_ref()
            .ok_or_else(|| KanbanError::Internal("Database not available".into()))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.config.retry_policy()
    }
}
