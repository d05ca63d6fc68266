use axum::{
    extract::{Extension, Path, State},
    Json,
};

use crate::api::dto::BoardView;
use crate::api::state::AppState;
use crate::auth::middleware::AuthUser;
use crate::domain::KanbanError;
use crate::services::TaskService;

pub async fn get_board(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<BoardView>, KanbanError> {
    let pool = state.require_db()?;
    let board = TaskService::get_board(pool, &user.user_id, &id).await?;
    Ok(Json(board))
}
