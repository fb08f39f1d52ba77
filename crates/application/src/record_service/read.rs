use super::*;

use crate::ports::{RecordListQuery, RecordPage};

impl RecordService {
    /// Lists records for a resource type, excluding soft-deleted ones by
    /// default, with reference fields populated.
    pub async fn list(&self, resource_type: &str, query: RecordListQuery) -> AppResult<RecordPage> {
        let descriptor = self.registry.require(resource_type)?;

        let total = self
            .repository
            .count_records(resource_type, query.include_deleted)
            .await?;
        let records = self.repository.list_records(resource_type, query).await?;

        let mut items = Vec::with_capacity(records.len());
        for record in records {
            items.push(self.populate(descriptor, record).await?);
        }

        Ok(RecordPage { total, items })
    }

    /// Fetches one record by identifier with reference fields populated.
    ///
    /// Soft-deleted records only resolve when `include_deleted` is set,
    /// which keeps their audit history reachable after deletion.
    pub async fn get(
        &self,
        resource_type: &str,
        record_id: &str,
        include_deleted: bool,
    ) -> AppResult<ResourceRecord> {
        let descriptor = self.registry.require(resource_type)?;

        let record = self
            .repository
            .find_record(resource_type, record_id, include_deleted)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "record '{record_id}' does not exist for resource '{resource_type}'"
                ))
            })?;

        self.populate(descriptor, record).await
    }

    pub(super) async fn require_active(
        &self,
        resource_type: &str,
        record_id: &str,
    ) -> AppResult<ResourceRecord> {
        self.repository
            .find_record(resource_type, record_id, false)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "record '{record_id}' does not exist for resource '{resource_type}'"
                ))
            })
    }
}
