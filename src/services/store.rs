//! Persistence primitives for boards, columns and tasks.
//!
//! Everything here takes a `&mut SqliteConnection` so callers can run the
//! primitives inside one transaction and observe their own writes. Column
//! sequence writes are guarded by the column's `version`.

use chrono::Utc;
use sqlx::SqliteConnection;

use crate::domain::{Board, Column, ColumnRow, Entity, KanbanError, Task, TaskSequence};

pub struct BoardStore;

impl BoardStore {
    // ── Loads ──────────────────────────────────────────────────

    pub async fn load_board(
        conn: &mut SqliteConnection,
        id: &str,
    ) -> Result<Option<Board>, KanbanError> {
        let board: Option<Board> = sqlx::query_as("SELECT * FROM boards WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(board)
    }

    pub async fn load_column(
        conn: &mut SqliteConnection,
        id: &str,
    ) -> Result<Option<Column>, KanbanError> {
        let row: Option<ColumnRow> = sqlx::query_as("SELECT * FROM columns WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(row.map(Column::try_from).transpose()?)
    }

    pub async fn list_columns(
        conn: &mut SqliteConnection,
        board_id: &str,
    ) -> Result<Vec<Column>, KanbanError> {
        let rows: Vec<ColumnRow> =
            sqlx::query_as("SELECT * FROM columns WHERE board_id = ? ORDER BY created_at ASC, id ASC")
                .bind(board_id)
                .fetch_all(&mut *conn)
                .await?;

        Ok(rows
            .into_iter()
            .map(Column::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    pub async fn load_task(
        conn: &mut SqliteConnection,
        id: &str,
    ) -> Result<Option<Task>, KanbanError> {
        let task: Option<Task> = sqlx::query_as("SELECT * FROM tasks WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(task)
    }

    pub async fn list_tasks_in_column(
        conn: &mut SqliteConnection,
        column_id: &str,
    ) -> Result<Vec<Task>, KanbanError> {
        let tasks: Vec<Task> = sqlx::query_as("SELECT * FROM tasks WHERE column_id = ?")
            .bind(column_id)
            .fetch_all(&mut *conn)
            .await?;

        Ok(tasks)
    }

    // ── Task writes ────────────────────────────────────────────

    /// Persists every field of `task`. The write only lands if the stored row
    /// still has `expected_column_id`; otherwise another writer moved it first.
    pub async fn save_task(
        conn: &mut SqliteConnection,
        task: &Task,
        expected_column_id: &str,
    ) -> Result<(), KanbanError> {
        let result = sqlx::query(
            "UPDATE tasks SET column_id = ?, title = ?, description = ?, priority = ?, due_date = ?, assignee = ?, updated_at = ? WHERE id = ? AND column_id = ?",
        )
        .bind(&task.column_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(&task.priority)
        .bind(&task.due_date)
        .bind(&task.assignee)
        .bind(&task.updated_at)
        .bind(&task.id)
        .bind(expected_column_id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(KanbanError::Conflict(format!(
                "task {} changed column concurrently",
                task.id
            )));
        }

        Ok(())
    }

    pub async fn insert_task(conn: &mut SqliteConnection, task: &Task) -> Result<(), KanbanError> {
        sqlx::query(
            "INSERT INTO tasks (id, column_id, title, description, priority, due_date, assignee, created_by, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&task.id)
        .bind(&task.column_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(&task.priority)
        .bind(&task.due_date)
        .bind(&task.assignee)
        .bind(&task.created_by)
        .bind(&task.created_at)
        .bind(&task.updated_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    pub async fn delete_task(conn: &mut SqliteConnection, id: &str) -> Result<(), KanbanError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(KanbanError::not_found(Entity::Task, id));
        }

        Ok(())
    }

    // ── Column sequence ────────────────────────────────────────

    /// Drops `task_id` from the column's sequence. Absence is not an error;
    /// the return value says whether anything was removed.
    pub async fn remove_from_column(
        conn: &mut SqliteConnection,
        column_id: &str,
        task_id: &str,
    ) -> Result<bool, KanbanError> {
        let mut column = Self::require_column(conn, column_id).await?;

        if !column.tasks.remove(task_id) {
            return Ok(false);
        }

        Self::write_sequence(conn, &column).await?;
        Ok(true)
    }

    /// Places `task_id` at `index` in the column's sequence, clamped to the
    /// sequence length. Returns the final position.
    pub async fn insert_into_column(
        conn: &mut SqliteConnection,
        column_id: &str,
        task_id: &str,
        index: usize,
    ) -> Result<usize, KanbanError> {
        let mut column = Self::require_column(conn, column_id).await?;
        let at = column.tasks.insert(task_id, index);
        Self::write_sequence(conn, &column).await?;
        Ok(at)
    }

    async fn require_column(
        conn: &mut SqliteConnection,
        column_id: &str,
    ) -> Result<Column, KanbanError> {
        Self::load_column(conn, column_id)
            .await?
            .ok_or_else(|| KanbanError::not_found(Entity::Column, column_id))
    }

    async fn write_sequence(conn: &mut SqliteConnection, column: &Column) -> Result<(), KanbanError> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "UPDATE columns SET tasks = ?, version = version + 1, updated_at = ? WHERE id = ? AND version = ?",
        )
        .bind(column.tasks.to_json()?)
        .bind(&now)
        .bind(&column.id)
        .bind(column.version)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(KanbanError::Conflict(format!(
                "column {} was modified concurrently",
                column.id
            )));
        }

        Ok(())
    }

    // ── Board and column inserts ───────────────────────────────

    pub async fn insert_board(
        conn: &mut SqliteConnection,
        id: &str,
        name: &str,
        created_by: &str,
    ) -> Result<Board, KanbanError> {
        let now = Utc::now().to_rfc3339();

        let board: Board = sqlx::query_as(
            "INSERT INTO boards (id, name, created_by, created_at, updated_at) VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(id)
        .bind(name)
        .bind(created_by)
        .bind(&now)
        .bind(&now)
        .fetch_one(&mut *conn)
        .await?;

        Ok(board)
    }

    /// Inserts a column with an initial (possibly non-empty) sequence.
    pub async fn insert_column(
        conn: &mut SqliteConnection,
        id: &str,
        board_id: &str,
        name: &str,
        tasks: &TaskSequence,
    ) -> Result<Column, KanbanError> {
        let now = Utc::now().to_rfc3339();

        let row: ColumnRow = sqlx::query_as(
            "INSERT INTO columns (id, board_id, name, tasks, version, created_at, updated_at) VALUES (?, ?, ?, ?, 0, ?, ?) RETURNING *",
        )
        .bind(id)
        .bind(board_id)
        .bind(name)
        .bind(tasks.to_json()?)
        .bind(&now)
        .bind(&now)
        .fetch_one(&mut *conn)
        .await?;

        Ok(Column::try_from(row)?)
    }
}
