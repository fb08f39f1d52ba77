use super::*;

use chrono::Utc;

use bunkerdesk_core::Actor;

use crate::audited_mutator::{plan_soft_delete, plan_update};
use crate::ports::{NewRecord, RecordMutation};
use crate::sequence_allocator::scope_key;

impl RecordService {
    /// Creates a record, allocating its sequence number when the descriptor
    /// numbers the resource.
    pub async fn create(
        &self,
        actor: &Actor,
        resource_type: &str,
        payload: Value,
    ) -> AppResult<ResourceRecord> {
        let descriptor = self.registry.require(resource_type)?;
        let mut data = object_payload(payload)?;
        descriptor.validate_create(&data)?;
        self.validate_reference_values(descriptor, &data).await?;

        if let Some(numbering) = descriptor.numbering() {
            let parent_id = match numbering.scope_field() {
                Some(scope_field) => Some(
                    data.get(scope_field.as_str())
                        .and_then(Value::as_str)
                        .ok_or_else(|| {
                            AppError::Validation(format!(
                                "field '{}' is required to scope the sequence number",
                                scope_field.as_str()
                            ))
                        })?
                        .to_owned(),
                ),
                None => None,
            };

            // Allocation happens before the insert; a failed allocation
            // aborts the creation with nothing persisted.
            let number = self
                .sequences
                .allocate(scope_key(resource_type, parent_id.as_deref()).as_str())
                .await?;
            data.insert(
                numbering.field_name().as_str().to_owned(),
                Value::from(number),
            );
        }

        let unique_values = Self::unique_values_for(descriptor, &data)?;
        let record = self
            .repository
            .create_record(
                resource_type,
                NewRecord {
                    data,
                    unique_values,
                    created_by: actor.subject().to_owned(),
                },
            )
            .await?;

        self.populate(descriptor, record).await
    }

    /// Applies an audited partial update to an active record.
    pub async fn update(
        &self,
        actor: &Actor,
        resource_type: &str,
        record_id: &str,
        payload: Value,
    ) -> AppResult<ResourceRecord> {
        let descriptor = self.registry.require(resource_type)?;
        let fields = object_payload(payload)?;
        descriptor.validate_update(&fields)?;
        self.validate_reference_values(descriptor, &fields).await?;

        let prior = self.require_active(resource_type, record_id).await?;

        let Some(plan) = plan_update(&prior, fields, actor, Utc::now()) else {
            // Nothing changed; no audit entry is recorded.
            return self.populate(descriptor, prior).await;
        };

        let mut merged = prior.data().clone();
        for (field, value) in &plan.fields {
            merged.insert(field.clone(), value.clone());
        }
        let unique_values = Self::unique_values_for(descriptor, &merged)?;

        let updated = self
            .repository
            .apply_mutation(
                resource_type,
                record_id,
                RecordMutation {
                    fields: plan.fields,
                    audit_entry: plan.audit_entry,
                    set_deleted: false,
                    unique_values,
                },
            )
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "record '{record_id}' does not exist for resource '{resource_type}'"
                ))
            })?;

        self.populate(descriptor, updated).await
    }

    /// Soft-deletes an active record, keeping its audit history readable.
    ///
    /// The record's unique business keys are released so a new record may
    /// reuse them.
    pub async fn soft_delete(
        &self,
        actor: &Actor,
        resource_type: &str,
        record_id: &str,
    ) -> AppResult<ResourceRecord> {
        let descriptor = self.registry.require(resource_type)?;
        let prior = self.require_active(resource_type, record_id).await?;

        let plan = plan_soft_delete(&prior, actor, Utc::now());
        let deleted = self
            .repository
            .apply_mutation(
                resource_type,
                record_id,
                RecordMutation {
                    fields: plan.fields,
                    audit_entry: plan.audit_entry,
                    set_deleted: true,
                    unique_values: Vec::new(),
                },
            )
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "record '{record_id}' does not exist for resource '{resource_type}'"
                ))
            })?;

        self.populate(descriptor, deleted).await
    }
}
