use async_trait::async_trait;
use sqlx::PgPool;

use bunkerdesk_application::SequenceStore;
use bunkerdesk_core::{AppError, AppResult};

/// PostgreSQL-backed scope-partitioned counter store.
#[derive(Clone)]
pub struct PostgresSequenceStore {
    pool: PgPool,
}

impl PostgresSequenceStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SequenceStore for PostgresSequenceStore {
    async fn increment_and_fetch(&self, scope_key: &str, seed: i64) -> AppResult<i64> {
        // Single upsert statement so concurrent allocations for one scope
        // serialize on the counter row instead of racing a read and a write.
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO sequence_counters (scope_key, value)
            VALUES ($1, $2 + 1)
            ON CONFLICT (scope_key) DO UPDATE SET value = sequence_counters.value + 1
            RETURNING value
            "#,
        )
        .bind(scope_key)
        .bind(seed)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Persistence(format!(
                "failed to increment sequence counter for scope '{scope_key}': {error}"
            ))
        })
    }
}
