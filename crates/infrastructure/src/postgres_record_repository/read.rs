use super::*;

impl PostgresRecordRepository {
    pub(super) async fn find_record_impl(
        &self,
        resource_type: &str,
        record_id: &str,
        include_deleted: bool,
    ) -> AppResult<Option<ResourceRecord>> {
        let Ok(record_uuid) = Uuid::parse_str(record_id) else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT id, resource_type, data, eliminado, historial, created_at
            FROM resource_records
            WHERE resource_type = $1 AND id = $2 AND (eliminado = FALSE OR $3)
            "#,
        )
        .bind(resource_type)
        .bind(record_uuid)
        .bind(include_deleted)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Persistence(format!(
                "failed to load record '{}' for resource '{}': {error}",
                record_id, resource_type
            ))
        })?;

        row.map(record_from_row).transpose()
    }

    pub(super) async fn list_records_impl(
        &self,
        resource_type: &str,
        query: RecordListQuery,
    ) -> AppResult<Vec<ResourceRecord>> {
        let rows = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT id, resource_type, data, eliminado, historial, created_at
            FROM resource_records
            WHERE resource_type = $1 AND (eliminado = FALSE OR $2)
            ORDER BY created_at, id
            LIMIT $3
            OFFSET $4
            "#,
        )
        .bind(resource_type)
        .bind(query.include_deleted)
        .bind(query.limit as i64)
        .bind(query.offset as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Persistence(format!(
                "failed to list records for resource '{}': {error}",
                resource_type
            ))
        })?;

        rows.into_iter().map(record_from_row).collect()
    }

    pub(super) async fn count_records_impl(
        &self,
        resource_type: &str,
        include_deleted: bool,
    ) -> AppResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM resource_records
            WHERE resource_type = $1 AND (eliminado = FALSE OR $2)
            "#,
        )
        .bind(resource_type)
        .bind(include_deleted)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Persistence(format!(
                "failed to count records for resource '{}': {error}",
                resource_type
            ))
        })?;

        Ok(count.max(0) as u64)
    }
}
