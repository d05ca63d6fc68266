#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Sqlite, SqlitePool};
use tower::ServiceExt;

use taskboard_backend::api::{create_router, AppState};
use taskboard_backend::auth::jwt;
use taskboard_backend::config::Config;
use taskboard_backend::domain::{Task, TaskSequence};
use taskboard_backend::infrastructure::db;
use taskboard_backend::services::BoardStore;

pub const OWNER: &str = "user-owner";
pub const STRANGER: &str = "user-stranger";

/// A single-connection in-memory database so every query sees the same data.
pub async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to create test schema");

    pool
}

/// A WAL database in a temp file, for tests that need several connections.
/// Keep the returned dir alive for as long as the pool is used.
pub async fn setup_file_db() -> (tempfile::TempDir, SqlitePool) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let url = format!("sqlite://{}", dir.path().join("board.db").display());
    let pool = db::init_db(&url).await.expect("Failed to open file database");
    (dir, pool)
}

/// Takes the database write lock on a dedicated connection until `ROLLBACK`.
pub async fn hold_write_lock(pool: &SqlitePool) -> PoolConnection<Sqlite> {
    let mut conn = pool.acquire().await.unwrap();
    sqlx::query("BEGIN IMMEDIATE")
        .execute(&mut *conn)
        .await
        .unwrap();
    conn
}

pub async fn release_write_lock(mut conn: PoolConnection<Sqlite>) {
    sqlx::query("ROLLBACK").execute(&mut *conn).await.unwrap();
}

pub fn test_config() -> Config {
    Config {
        port: 3000,
        database_url: "sqlite::memory:".to_string(),
        cors_origin: "http://localhost:5173".to_string(),
        move_max_attempts: 1,
        move_retry_backoff_ms: 0,
        transaction_timeout_ms: 5_000,
    }
}

pub fn test_app(pool: SqlitePool) -> Router {
    let config = Arc::new(test_config());
    let state = AppState::new(Some(pool), config.clone());
    create_router(state, &config)
}

pub async fn token_for(pool: &SqlitePool, user_id: &str) -> String {
    let key = jwt::get_or_create_signing_key(pool)
        .await
        .expect("Failed to create signing key");
    jwt::create_token(&key, user_id, 60).expect("Failed to sign token")
}

pub async fn insert_board(pool: &SqlitePool, id: &str, owner: &str) {
    let mut conn = pool.acquire().await.unwrap();
    BoardStore::insert_board(&mut conn, id, "Board", owner)
        .await
        .unwrap();
}

/// Inserts a column whose sequence is exactly `tasks`, without creating the tasks.
pub async fn insert_column(pool: &SqlitePool, id: &str, board_id: &str, tasks: &[&str]) {
    let mut conn = pool.acquire().await.unwrap();
    let sequence: TaskSequence = tasks.iter().copied().collect();
    BoardStore::insert_column(&mut conn, id, board_id, id, &sequence)
        .await
        .unwrap();
}

/// Inserts a task row pointing at `column_id`, without touching any sequence.
pub async fn insert_task(pool: &SqlitePool, id: &str, column_id: &str) {
    let now = chrono::Utc::now().to_rfc3339();
    let task = Task {
        id: id.to_string(),
        column_id: column_id.to_string(),
        title: format!("Task {}", id),
        description: String::new(),
        priority: "medium".to_string(),
        due_date: None,
        assignee: None,
        created_by: OWNER.to_string(),
        created_at: now.clone(),
        updated_at: now,
    };
    let mut conn = pool.acquire().await.unwrap();
    BoardStore::insert_task(&mut conn, &task).await.unwrap();
}

/// A consistent column: the sequence and the task rows agree.
pub async fn seed_column(pool: &SqlitePool, board_id: &str, column_id: &str, tasks: &[&str]) {
    insert_column(pool, column_id, board_id, tasks).await;
    for task in tasks {
        insert_task(pool, task, column_id).await;
    }
}

pub async fn column_tasks(pool: &SqlitePool, column_id: &str) -> Vec<String> {
    let raw: String = sqlx::query_scalar("SELECT tasks FROM columns WHERE id = ?")
        .bind(column_id)
        .fetch_one(pool)
        .await
        .unwrap();
    serde_json::from_str(&raw).unwrap()
}

pub async fn task_column(pool: &SqlitePool, task_id: &str) -> String {
    sqlx::query_scalar("SELECT column_id FROM tasks WHERE id = ?")
        .bind(task_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Every task is listed by exactly one column, and that column is the one its
/// `column_id` names. Every listed id belongs to an existing task.
pub async fn assert_membership_invariant(pool: &SqlitePool) {
    let columns: Vec<(String, String)> = sqlx::query_as("SELECT id, tasks FROM columns")
        .fetch_all(pool)
        .await
        .unwrap();
    let tasks: Vec<(String, String)> = sqlx::query_as("SELECT id, column_id FROM tasks")
        .fetch_all(pool)
        .await
        .unwrap();

    let mut listed_in: HashMap<String, Vec<String>> = HashMap::new();
    for (column_id, raw) in &columns {
        let ids: Vec<String> = serde_json::from_str(raw).unwrap();
        for id in ids {
            listed_in.entry(id).or_default().push(column_id.clone());
        }
    }

    for (task_id, column_id) in &tasks {
        let holders = listed_in.remove(task_id).unwrap_or_default();
        assert_eq!(
            holders,
            vec![column_id.clone()],
            "task {} has column_id {} but is listed in {:?}",
            task_id,
            column_id,
            holders
        );
    }

    assert!(
        listed_in.is_empty(),
        "sequences list unknown task ids: {:?}",
        listed_in.keys().collect::<Vec<_>>()
    );
}

pub async fn make_request(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<String>,
    token: Option<&str>,
) -> (StatusCode, String) {
    let mut request = Request::builder().uri(uri).method(method);

    if body.is_some() {
        request = request.header("content-type", "application/json");
    }
    if let Some(token) = token {
        request = request.header("authorization", format!("Bearer {}", token));
    }

    let request = request
        .body(Body::from(body.unwrap_or_default()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body_str = String::from_utf8(body.to_vec()).unwrap();

    (status, body_str)
}
