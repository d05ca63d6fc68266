use serde::{Deserialize, Serialize};

use crate::domain::{Board, Column, Task};
use crate::services::relocation::RelocationOutcome;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskRequest {
    pub column_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
}

/// Field-level edits. Column membership only changes through a move.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MoveTaskRequest {
    pub column_id: String,
    pub index: i64,
}

#[derive(Debug, Serialize)]
pub struct MoveTaskResponse {
    pub success: bool,
    #[serde(flatten)]
    pub outcome: RelocationOutcome,
}

impl From<RelocationOutcome> for MoveTaskResponse {
    fn from(outcome: RelocationOutcome) -> Self {
        Self {
            success: true,
            outcome,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ColumnView {
    pub id: String,
    pub name: String,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Serialize)]
pub struct BoardView {
    pub id: String,
    pub name: String,
    pub created_by: String,
    pub columns: Vec<ColumnView>,
}

impl BoardView {
    /// Orders each column's tasks by its sequence. Tasks the sequence does not
    /// list are left out.
    pub fn assemble(board: Board, columns: Vec<(Column, Vec<Task>)>) -> Self {
        let columns = columns
            .into_iter()
            .map(|(column, mut tasks)| {
                let ordered = column
                    .tasks
                    .iter()
                    .filter_map(|id| {
                        let at = tasks.iter().position(|t| t.id == id)?;
                        Some(tasks.swap_remove(at))
                    })
                    .collect();
                ColumnView {
                    id: column.id,
                    name: column.name,
                    tasks: ordered,
                }
            })
            .collect();

        Self {
            id: board.id,
            name: board.name,
            created_by: board.created_by,
            columns,
        }
    }
}
