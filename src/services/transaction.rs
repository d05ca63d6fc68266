//! Transactional execution with bounded retry on conflicts.

use std::time::Duration;

use futures::future::BoxFuture;
use rand::Rng;
use sqlx::{SqliteConnection, SqlitePool};

use crate::domain::KanbanError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Base delay, scaled by the attempt number plus random jitter.
    pub backoff: Duration,
    /// Upper bound for a single attempt, begin through commit.
    pub timeout: Duration,
}

impl RetryPolicy {
    /// One attempt only; conflicts surface to the caller immediately.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.backoff.saturating_mul(attempt);
        let jitter_ms = self.backoff.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=jitter_ms)
        };
        base + Duration::from_millis(jitter)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(25),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Runs `op` inside a transaction and commits it.
///
/// Any error from `op` drops the transaction, which rolls it back, so nothing
/// `op` wrote is ever visible. `Conflict` errors, including a timed-out attempt,
/// are retried with a fresh transaction until `policy.max_attempts` is
/// exhausted. Other errors are returned as-is.
pub async fn with_transaction<T, F>(
    pool: &SqlitePool,
    policy: &RetryPolicy,
    mut op: F,
) -> Result<T, KanbanError>
where
    F: for<'c> FnMut(&'c mut SqliteConnection) -> BoxFuture<'c, Result<T, KanbanError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match run_once(pool, policy.timeout, &mut op).await {
            Err(err) if err.is_conflict() && attempt < max_attempts => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Transaction conflict, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            outcome => return outcome,
        }
    }
}

async fn run_once<T, F>(pool: &SqlitePool, timeout: Duration, op: &mut F) -> Result<T, KanbanError>
where
    F: for<'c> FnMut(&'c mut SqliteConnection) -> BoxFuture<'c, Result<T, KanbanError>>,
{
    let attempt = async {
        let mut tx = pool.begin().await?;
        let value = op(&mut *tx).await?;
        tx.commit().await?;
        Ok::<T, KanbanError>(value)
    };

    match tokio::time::timeout(timeout, attempt).await {
        Ok(outcome) => outcome,
        Err(_) => Err(KanbanError::Conflict(format!(
            "transaction timed out after {} ms",
            timeout.as_millis()
        ))),
    }
}
