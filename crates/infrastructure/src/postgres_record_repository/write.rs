use super::*;

impl PostgresRecordRepository {
    pub(super) async fn create_record_impl(
        &self,
        resource_type: &str,
        record: NewRecord,
    ) -> AppResult<ResourceRecord> {
        let NewRecord {
            data,
            unique_values,
            created_by,
        } = record;

        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Persistence(format!(
                "failed to start create transaction for resource '{}': {error}",
                resource_type
            ))
        })?;

        let created = sqlx::query_as::<_, RecordRow>(
            r#"
            INSERT INTO resource_records (resource_type, data, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, resource_type, data, eliminado, historial, created_at
            "#,
        )
        .bind(resource_type)
        .bind(Value::Object(data))
        .bind(created_by.as_str())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Persistence(format!(
                "failed to create record for resource '{}': {error}",
                resource_type
            ))
        })?;

        index_unique_values(&mut transaction, resource_type, created.id, &unique_values).await?;

        transaction.commit().await.map_err(|error| {
            AppError::Persistence(format!(
                "failed to commit create transaction for resource '{}': {error}",
                resource_type
            ))
        })?;

        record_from_row(created)
    }

    pub(super) async fn apply_mutation_impl(
        &self,
        resource_type: &str,
        record_id: &str,
        mutation: RecordMutation,
    ) -> AppResult<Option<ResourceRecord>> {
        let Ok(record_uuid) = Uuid::parse_str(record_id) else {
            return Ok(None);
        };

        let RecordMutation {
            fields,
            audit_entry,
            set_deleted,
            unique_values,
        } = mutation;

        let entry = serde_json::to_value(vec![audit_entry]).map_err(|error| {
            AppError::Persistence(format!(
                "failed to serialize audit entry for record '{}': {error}",
                record_id
            ))
        })?;

        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Persistence(format!(
                "failed to start mutation transaction for resource '{}': {error}",
                resource_type
            ))
        })?;

        // Field merge, history append and flag flip happen in one statement
        // guarded by the record still being active, so a racing delete makes
        // this return no row instead of overwriting it.
        let updated = sqlx::query_as::<_, RecordRow>(
            r#"
            UPDATE resource_records
            SET data = data || $3,
                historial = historial || $4,
                eliminado = eliminado OR $5,
                updated_at = now()
            WHERE resource_type = $1 AND id = $2 AND eliminado = FALSE
            RETURNING id, resource_type, data, eliminado, historial, created_at
            "#,
        )
        .bind(resource_type)
        .bind(record_uuid)
        .bind(Value::Object(fields))
        .bind(entry)
        .bind(set_deleted)
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Persistence(format!(
                "failed to mutate record '{}' for resource '{}': {error}",
                record_id, resource_type
            ))
        })?;

        let Some(updated) = updated else {
            return Ok(None);
        };

        sqlx::query(
            r#"
            DELETE FROM resource_unique_values
            WHERE resource_type = $1 AND record_id = $2
            "#,
        )
        .bind(resource_type)
        .bind(record_uuid)
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Persistence(format!(
                "failed to clear unique value index for record '{}' in resource '{}': {error}",
                record_id, resource_type
            ))
        })?;

        index_unique_values(&mut transaction, resource_type, record_uuid, &unique_values).await?;

        transaction.commit().await.map_err(|error| {
            AppError::Persistence(format!(
                "failed to commit mutation transaction for resource '{}': {error}",
                resource_type
            ))
        })?;

        record_from_row(updated).map(Some)
    }
}
