use sqlx::SqliteConnection;

use crate::domain::{Board, Entity, KanbanError};
use crate::services::store::BoardStore;

/// Single-owner authorization: only a board's creator may touch its contents.
pub struct AuthorizationGuard;

impl AuthorizationGuard {
    /// Resolves the board owning `column_id` and checks `requester_id` owns it.
    pub async fn authorize(
        conn: &mut SqliteConnection,
        column_id: &str,
        requester_id: &str,
    ) -> Result<Board, KanbanError> {
        let column = BoardStore::load_column(conn, column_id)
            .await?
            .ok_or_else(|| KanbanError::not_found(Entity::Column, column_id))?;

        let board = BoardStore::load_board(conn, &column.board_id)
            .await?
            .ok_or_else(|| {
                tracing::error!(
                    column_id,
                    board_id = column.board_id.as_str(),
                    "Column references a missing board"
                );
                KanbanError::not_found(Entity::Board, &column.board_id)
            })?;

        Self::ensure_owner(&board, requester_id)?;
        Ok(board)
    }

    pub fn ensure_owner(board: &Board, requester_id: &str) -> Result<(), KanbanError> {
        if board.created_by != requester_id {
            tracing::debug!(
                board_id = board.id.as_str(),
                requester_id,
                "Rejected non-owner access"
            );
            return Err(KanbanError::Forbidden(format!(
                "not the owner of board {}",
                board.id
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(owner: &str) -> Board {
        Board {
            id: "b1".into(),
            name: "Board".into(),
            created_by: owner.into(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn owner_is_accepted() {
        assert!(AuthorizationGuard::ensure_owner(&board("alice"), "alice").is_ok());
    }

    #[test]
    fn other_identity_is_forbidden() {
        let err = AuthorizationGuard::ensure_owner(&board("alice"), "mallory").unwrap_err();
        assert!(matches!(err, KanbanError::Forbidden(_)));
    }

    #[test]
    fn comparison_is_exact() {
        assert!(AuthorizationGuard::ensure_owner(&board("alice"), "Alice").is_err());
        assert!(AuthorizationGuard::ensure_owner(&board("alice"), "").is_err());
    }
}
