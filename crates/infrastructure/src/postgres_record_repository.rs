use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use bunkerdesk_application::{
    NewRecord, RecordListQuery, RecordMutation, RecordRepository, UniqueFieldValue,
};
use bunkerdesk_core::{AppError, AppResult};
use bunkerdesk_domain::{AuditEntry, ResourceRecord};

mod read;
mod write;


/// PostgreSQL-backed repository for resource records.
#[derive(Clone)]
pub struct PostgresRecordRepository {
    pool: PgPool,
}

impl PostgresRecordRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RecordRow {
    id: Uuid,
    resource_type: String,
    data: Value,
    eliminado: bool,
    historial: Value,
    created_at: DateTime<Utc>,
}

fn record_from_row(row: RecordRow) -> AppResult<ResourceRecord> {
    let data = match row.data {
        Value::Object(fields) => fields,
        _ => {
            return Err(AppError::Persistence(format!(
                "record '{}' holds non-object data",
                row.id
            )));
        }
    };

    let history: Vec<AuditEntry> = serde_json::from_value(row.historial).map_err(|error| {
        AppError::Persistence(format!(
            "failed to decode history for record '{}': {error}",
            row.id
        ))
    })?;

    ResourceRecord::new(
        row.id.to_string(),
        row.resource_type,
        data,
        row.eliminado,
        history,
        row.created_at,
    )
}

async fn index_unique_values(
    transaction: &mut Transaction<'_, Postgres>,
    resource_type: &str,
    record_id: Uuid,
    unique_values: &[UniqueFieldValue],
) -> AppResult<()> {
    for unique_value in unique_values {
        sqlx::query(
            r#"
            INSERT INTO resource_unique_values (resource_type, field_logical_name, field_value_hash, record_id)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(resource_type)
        .bind(unique_value.field_logical_name.as_str())
        .bind(unique_value.field_value_hash.as_str())
        .bind(record_id)
        .execute(&mut **transaction)
        .await
        .map_err(|error| {
            if error
                .as_database_error()
                .is_some_and(|database_error| database_error.is_unique_violation())
            {
                AppError::Conflict(format!(
                    "value for field '{}' already exists in resource '{}'",
                    unique_value.field_logical_name, resource_type
                ))
            } else {
                AppError::Persistence(format!(
                    "failed to index unique value for field '{}' in resource '{}': {error}",
                    unique_value.field_logical_name, resource_type
                ))
            }
        })?;
    }

    Ok(())
}

#[async_trait]
impl RecordRepository for PostgresRecordRepository {
    async fn create_record(
        &self,
        resource_type: &str,
        record: NewRecord,
    ) -> AppResult<ResourceRecord> {
        self.create_record_impl(resource_type, record).await
    }

    async fn find_record(
        &self,
        resource_type: &str,
        record_id: &str,
        include_deleted: bool,
    ) -> AppResult<Option<ResourceRecord>> {
        self.find_record_impl(resource_type, record_id, include_deleted)
            .await
    }

    async fn list_records(
        &self,
        resource_type: &str,
        query: RecordListQuery,
    ) -> AppResult<Vec<ResourceRecord>> {
        self.list_records_impl(resource_type, query).await
    }

    async fn count_records(&self, resource_type: &str, include_deleted: bool) -> AppResult<u64> {
        self.count_records_impl(resource_type, include_deleted)
            .await
    }

    async fn apply_mutation(
        &self,
        resource_type: &str,
        record_id: &str,
        mutation: RecordMutation,
    ) -> AppResult<Option<ResourceRecord>> {
        self.apply_mutation_impl(resource_type, record_id, mutation)
            .await
    }
}
