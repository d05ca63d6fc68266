//! Moves a task between columns, or within one column, as one atomic unit.
//!
//! The destination index counts positions in the destination sequence after
//! the moved task has been taken out, so a same-column reorder is a plain
//! remove-then-insert. Indices past the end append. Negative indices and
//! destinations on another board are rejected before anything is written.

use chrono::Utc;
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};

use crate::domain::{Entity, KanbanError};
use crate::services::authorization::AuthorizationGuard;
use crate::services::store::BoardStore;
use crate::services::transaction::{with_transaction, RetryPolicy};

#[derive(Debug, Clone)]
pub struct RelocateTask {
    pub task_id: String,
    pub dest_column_id: String,
    pub dest_index: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelocationOutcome {
    pub task_id: String,
    pub from_column_id: String,
    pub to_column_id: String,
    /// Final position in the destination sequence, after clamping.
    pub index: usize,
}

pub struct RelocationService;

impl RelocationService {
    pub async fn relocate(
        pool: &SqlitePool,
        policy: &RetryPolicy,
        requester_id: &str,
        req: RelocateTask,
    ) -> Result<RelocationOutcome, KanbanError> {
        let dest_index = usize::try_from(req.dest_index).map_err(|_| {
            KanbanError::InvalidArgument(format!(
                "destination index must be non-negative, got {}",
                req.dest_index
            ))
        })?;
        let requester_id = requester_id.to_string();

        let outcome = with_transaction(pool, policy, move |conn| {
            let req = req.clone();
            let requester_id = requester_id.clone();
            Box::pin(async move { Self::relocate_in(conn, &req, dest_index, &requester_id).await })
        })
        .await?;

        tracing::info!(
            task_id = outcome.task_id.as_str(),
            from_column = outcome.from_column_id.as_str(),
            to_column = outcome.to_column_id.as_str(),
            index = outcome.index,
            "Task relocated"
        );

        Ok(outcome)
    }

    /// The relocation steps against an open transaction. Callers own commit
    /// and rollback.
    pub async fn relocate_in(
        conn: &mut SqliteConnection,
        req: &RelocateTask,
        dest_index: usize,
        requester_id: &str,
    ) -> Result<RelocationOutcome, KanbanError> {
        let mut task = BoardStore::load_task(conn, &req.task_id)
            .await?
            .ok_or_else(|| KanbanError::not_found(Entity::Task, &req.task_id))?;

        let source_column_id = task.column_id.clone();
        let board = AuthorizationGuard::authorize(conn, &source_column_id, requester_id).await?;

        if req.dest_column_id != source_column_id {
            let dest = BoardStore::load_column(conn, &req.dest_column_id)
                .await?
                .ok_or_else(|| KanbanError::not_found(Entity::Column, &req.dest_column_id))?;

            if dest.board_id != board.id {
                return Err(KanbanError::InvalidArgument(format!(
                    "column {} belongs to a different board than task {}",
                    dest.id, task.id
                )));
            }
        }

        let removed = BoardStore::remove_from_column(conn, &source_column_id, &task.id).await?;
        if !removed {
            tracing::warn!(
                task_id = task.id.as_str(),
                column_id = source_column_id.as_str(),
                "Task missing from its column's sequence, continuing with insert"
            );
        }

        let index =
            BoardStore::insert_into_column(conn, &req.dest_column_id, &task.id, dest_index).await?;

        task.column_id = req.dest_column_id.clone();
        task.updated_at = Utc::now().to_rfc3339();
        BoardStore::save_task(conn, &task, &source_column_id).await?;

        Ok(RelocationOutcome {
            task_id: task.id,
            from_column_id: source_column_id,
            to_column_id: req.dest_column_id.clone(),
            index,
        })
    }
}
