use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};

use crate::api::dto::{CreateTaskRequest, MoveTaskRequest, MoveTaskResponse, UpdateTaskRequest};
use crate::api::AppState;
use crate::auth::middleware::AuthUser;
use crate::domain::{KanbanError, Task};
use crate::services::{RelocateTask, RelocationService, TaskService};

pub async fn create_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>), KanbanError> {
    let pool = state.require_db()?;
    let task = TaskService::create_task(pool, &state.retry_policy(), &user.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Task>, KanbanError> {
    let pool = state.require_db()?;
    let task = TaskService::get_task(pool, &user.user_id, &id).await?;
    Ok(Json(task))
}

pub async fn update_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<Task>, KanbanError> {
    let pool = state.require_db()?;
    let task =
        TaskService::update_task(pool, &state.retry_policy(), &user.user_id, &id, req).await?;
    Ok(Json(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, KanbanError> {
    let pool = state.require_db()?;
    TaskService::delete_task(pool, &state.retry_policy(), &user.user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn move_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(req): Json<MoveTaskRequest>,
) -> Result<Json<MoveTaskResponse>, KanbanError> {
    let pool = state.require_db()?;

    let relocate = RelocateTask {
        task_id: id,
        dest_column_id: req.column_id,
        dest_index: req.index,
    };

    let outcome =
        RelocationService::relocate(pool, &state.retry_policy(), &user.user_id, relocate).await?;
    Ok(Json(outcome.into()))
}
