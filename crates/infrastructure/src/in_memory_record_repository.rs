use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use bunkerdesk_application::{
    NewRecord, RecordListQuery, RecordMutation, RecordRepository, UniqueFieldValue,
};
use bunkerdesk_core::{AppError, AppResult};
use bunkerdesk_domain::ResourceRecord;

/// In-memory record repository for tests and local development.
#[derive(Debug, Default)]
pub struct InMemoryRecordRepository {
    records: RwLock<HashMap<(String, String), ResourceRecord>>,
    unique_values: RwLock<HashMap<(String, String, String), String>>,
}

impl InMemoryRecordRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            unique_values: RwLock::new(HashMap::new()),
        }
    }
}

fn ensure_unique_values_available(
    unique_index: &HashMap<(String, String, String), String>,
    resource_type: &str,
    unique_values: &[UniqueFieldValue],
    current_record_id: Option<&str>,
) -> AppResult<()> {
    for unique_value in unique_values {
        let key = (
            resource_type.to_owned(),
            unique_value.field_logical_name.clone(),
            unique_value.field_value_hash.clone(),
        );

        if unique_index
            .get(&key)
            .map(|existing_record_id| {
                current_record_id
                    .map(|record_id| existing_record_id.as_str() != record_id)
                    .unwrap_or(true)
            })
            .unwrap_or(false)
        {
            return Err(AppError::Conflict(format!(
                "value for field '{}' already exists in resource '{}'",
                unique_value.field_logical_name, resource_type
            )));
        }
    }

    Ok(())
}

fn remove_record_unique_values(
    unique_index: &mut HashMap<(String, String, String), String>,
    resource_type: &str,
    record_id: &str,
) {
    unique_index.retain(|(stored_type, _, _), existing_record_id| {
        !(stored_type == resource_type && existing_record_id == record_id)
    });
}

#[async_trait]
impl RecordRepository for InMemoryRecordRepository {
    async fn create_record(
        &self,
        resource_type: &str,
        record: NewRecord,
    ) -> AppResult<ResourceRecord> {
        let stored = ResourceRecord::new(
            Uuid::new_v4().to_string(),
            resource_type,
            record.data,
            false,
            Vec::new(),
            Utc::now(),
        )?;

        let mut unique_index = self.unique_values.write().await;
        ensure_unique_values_available(&unique_index, resource_type, &record.unique_values, None)?;
        for unique_value in record.unique_values {
            unique_index.insert(
                (
                    resource_type.to_owned(),
                    unique_value.field_logical_name,
                    unique_value.field_value_hash,
                ),
                stored.record_id().as_str().to_owned(),
            );
        }

        self.records.write().await.insert(
            (
                resource_type.to_owned(),
                stored.record_id().as_str().to_owned(),
            ),
            stored.clone(),
        );

        Ok(stored)
    }

    async fn find_record(
        &self,
        resource_type: &str,
        record_id: &str,
        include_deleted: bool,
    ) -> AppResult<Option<ResourceRecord>> {
        Ok(self
            .records
            .read()
            .await
            .get(&(resource_type.to_owned(), record_id.to_owned()))
            .filter(|record| include_deleted || !record.deleted())
            .cloned())
    }

    async fn list_records(
        &self,
        resource_type: &str,
        query: RecordListQuery,
    ) -> AppResult<Vec<ResourceRecord>> {
        let records = self.records.read().await;
        let mut listed: Vec<ResourceRecord> = records
            .iter()
            .filter_map(|((stored_type, _), record)| {
                (stored_type == resource_type && (query.include_deleted || !record.deleted()))
                    .then_some(record.clone())
            })
            .collect();

        listed.sort_by(|left, right| {
            left.created_at()
                .cmp(&right.created_at())
                .then_with(|| left.record_id().as_str().cmp(right.record_id().as_str()))
        });

        Ok(listed
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }

    async fn count_records(&self, resource_type: &str, include_deleted: bool) -> AppResult<u64> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|((stored_type, _), record)| {
                stored_type == resource_type && (include_deleted || !record.deleted())
            })
            .count() as u64)
    }

    async fn apply_mutation(
        &self,
        resource_type: &str,
        record_id: &str,
        mutation: RecordMutation,
    ) -> AppResult<Option<ResourceRecord>> {
        // Same lock order as create_record.
        let mut unique_index = self.unique_values.write().await;
        let mut records = self.records.write().await;
        let key = (resource_type.to_owned(), record_id.to_owned());

        let Some(existing) = records.get(&key) else {
            return Ok(None);
        };
        if existing.deleted() {
            return Ok(None);
        }

        remove_record_unique_values(&mut unique_index, resource_type, record_id);
        ensure_unique_values_available(
            &unique_index,
            resource_type,
            &mutation.unique_values,
            Some(record_id),
        )?;
        for unique_value in mutation.unique_values {
            unique_index.insert(
                (
                    resource_type.to_owned(),
                    unique_value.field_logical_name,
                    unique_value.field_value_hash,
                ),
                record_id.to_owned(),
            );
        }

        let mut data = existing.data().clone();
        for (field, value) in mutation.fields {
            data.insert(field, value);
        }
        let mut history = existing.history().to_vec();
        history.push(mutation.audit_entry);

        let updated = ResourceRecord::new(
            record_id,
            resource_type,
            data,
            existing.deleted() || mutation.set_deleted,
            history,
            existing.created_at(),
        )?;
        records.insert(key, updated.clone());

        Ok(Some(updated))
    }
}
