use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::api::dto::{BoardView, CreateTaskRequest, UpdateTaskRequest};
use crate::domain::{Entity, KanbanError, Task};
use crate::services::authorization::AuthorizationGuard;
use crate::services::store::BoardStore;
use crate::services::transaction::{with_transaction, RetryPolicy};

pub struct TaskService;

impl TaskService {
    /// Inserts the task and appends it to its column in one transaction.
    pub async fn create_task(
        pool: &SqlitePool,
        policy: &RetryPolicy,
        requester_id: &str,
        req: CreateTaskRequest,
    ) -> Result<Task, KanbanError> {
        if req.title.trim().is_empty() {
            return Err(KanbanError::InvalidArgument("title must not be empty".into()));
        }

        let now = Utc::now().to_rfc3339();
        let task = Task {
            id: Uuid::new_v4().to_string(),
            column_id: req.column_id,
            title: req.title,
            description: req.description.unwrap_or_default(),
            priority: req.priority.unwrap_or_else(|| "medium".into()),
            due_date: req.due_date,
            assignee: req.assignee,
            created_by: requester_id.to_string(),
            created_at: now.clone(),
            updated_at: now,
        };

        let requester_id = requester_id.to_string();
        let task = with_transaction(pool, policy, move |conn| {
            let task = task.clone();
            let requester_id = requester_id.clone();
            Box::pin(async move { Self::create_task_in(conn, task, &requester_id).await })
        })
        .await?;

        tracing::info!(
            task_id = task.id.as_str(),
            column_id = task.column_id.as_str(),
            "Task created"
        );

        Ok(task)
    }

    /// The create steps against an open transaction.
    ///
    /// A task whose id already exists is returned as stored, so an attempt
    /// retried after its commit landed does not fail on the primary key.
    pub async fn create_task_in(
        conn: &mut SqliteConnection,
        task: Task,
        requester_id: &str,
    ) -> Result<Task, KanbanError> {
        AuthorizationGuard::authorize(conn, &task.column_id, requester_id).await?;

        if let Some(existing) = BoardStore::load_task(conn, &task.id).await? {
            tracing::debug!(task_id = existing.id.as_str(), "Task already created");
            return Ok(existing);
        }

        BoardStore::insert_task(conn, &task).await?;
        BoardStore::insert_into_column(conn, &task.column_id, &task.id, usize::MAX).await?;
        Ok(task)
    }

    pub async fn get_task(
        pool: &SqlitePool,
        requester_id: &str,
        id: &str,
    ) -> Result<Task, KanbanError> {
        let mut conn = pool.acquire().await?;

        let task = BoardStore::load_task(&mut conn, id)
            .await?
            .ok_or_else(|| KanbanError::not_found(Entity::Task, id))?;
        AuthorizationGuard::authorize(&mut conn, &task.column_id, requester_id).await?;

        Ok(task)
    }

    pub async fn update_task(
        pool: &SqlitePool,
        policy: &RetryPolicy,
        requester_id: &str,
        id: &str,
        req: UpdateTaskRequest,
    ) -> Result<Task, KanbanError> {
        if matches!(&req.title, Some(title) if title.trim().is_empty()) {
            return Err(KanbanError::InvalidArgument("title must not be empty".into()));
        }

        let id = id.to_string();
        let requester_id = requester_id.to_string();
        with_transaction(pool, policy, move |conn| {
            let id = id.clone();
            let requester_id = requester_id.clone();
            let req = req.clone();
            Box::pin(async move {
                let existing = BoardStore::load_task(conn, &id)
                    .await?
                    .ok_or_else(|| KanbanError::not_found(Entity::Task, &id))?;
                AuthorizationGuard::authorize(conn, &existing.column_id, &requester_id).await?;

                let task = Task {
                    title: req.title.unwrap_or_else(|| existing.title.clone()),
                    description: req.description.unwrap_or_else(|| existing.description.clone()),
                    priority: req.priority.unwrap_or_else(|| existing.priority.clone()),
                    due_date: clearable(req.due_date, &existing.due_date),
                    assignee: clearable(req.assignee, &existing.assignee),
                    updated_at: Utc::now().to_rfc3339(),
                    ..existing.clone()
                };

                BoardStore::save_task(conn, &task, &existing.column_id).await?;
                Ok(task)
            })
        })
        .await
    }

    /// Removes the task from its column's sequence and deletes it.
    pub async fn delete_task(
        pool: &SqlitePool,
        policy: &RetryPolicy,
        requester_id: &str,
        id: &str,
    ) -> Result<(), KanbanError> {
        let id = id.to_string();
        let requester_id = requester_id.to_string();
        let column_id = with_transaction(pool, policy, move |conn| {
            let id = id.clone();
            let requester_id = requester_id.clone();
            Box::pin(async move {
                let task = BoardStore::load_task(conn, &id)
                    .await?
                    .ok_or_else(|| KanbanError::not_found(Entity::Task, &id))?;
                AuthorizationGuard::authorize(conn, &task.column_id, &requester_id).await?;

                BoardStore::remove_from_column(conn, &task.column_id, &task.id).await?;
                BoardStore::delete_task(conn, &task.id).await?;
                Ok(task.column_id)
            })
        })
        .await?;

        tracing::info!(column_id = column_id.as_str(), "Task deleted");
        Ok(())
    }

    /// Builds the board view from a single read transaction so a move that
    /// commits part-way through cannot drop a task from the view.
    pub async fn get_board(
        pool: &SqlitePool,
        requester_id: &str,
        board_id: &str,
    ) -> Result<BoardView, KanbanError> {
        let mut tx = pool.begin().await?;
        let view = Self::board_view_in(&mut *tx, requester_id, board_id).await?;
        tx.commit().await?;
        Ok(view)
    }

    pub async fn board_view_in(
        conn: &mut SqliteConnection,
        requester_id: &str,
        board_id: &str,
    ) -> Result<BoardView, KanbanError> {
        let board = BoardStore::load_board(conn, board_id)
            .await?
            .ok_or_else(|| KanbanError::not_found(Entity::Board, board_id))?;
        AuthorizationGuard::ensure_owner(&board, requester_id)?;

        let mut columns = Vec::new();
        for column in BoardStore::list_columns(conn, &board.id).await? {
            let tasks = BoardStore::list_tasks_in_column(conn, &column.id).await?;
            columns.push((column, tasks));
        }

        Ok(BoardView::assemble(board, columns))
    }
}

// An empty string clears an optional field; absence keeps the current value.
fn clearable(update: Option<String>, current: &Option<String>) -> Option<String> {
    match update {
        Some(s) if s.is_empty() => None,
        Some(s) => Some(s),
        None => current.clone(),
    }
}
