use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::sequence::TaskSequence;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Board {
    pub id: String,
    pub name: String,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Column {
    pub id: String,
    pub board_id: String,
    pub name: String,
    pub tasks: TaskSequence,
    /// Bumped on every sequence write; stale writers get a conflict.
    #[serde(skip)]
    pub version: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Column as stored, with the sequence still JSON-encoded.
#[derive(Debug, Clone, FromRow)]
pub struct ColumnRow {
    pub id: String,
    pub board_id: String,
    pub name: String,
    pub tasks: String,
    pub version: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<ColumnRow> for Column {
    type Error = serde_json::Error;

    fn try_from(row: ColumnRow) -> Result<Self, Self::Error> {
        Ok(Self {
            tasks: TaskSequence::from_json(&row.tasks)?,
            id: row.id,
            board_id: row.board_id,
            name: row.name,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: String,
    /// Mirrors membership in exactly one column's sequence.
    pub column_id: String,
    pub title: String,
    pub description: String,
    pub priority: String,
    pub due_date: Option<String>,
    pub assignee: Option<String>,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}
