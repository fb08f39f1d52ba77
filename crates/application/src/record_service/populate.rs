use super::*;

impl RecordService {
    /// Expands reference fields into `{id, <projected fields>}` objects.
    ///
    /// Deleted targets still resolve so reads of historical records keep
    /// their context; dangling or non-string values are left as stored.
    pub(super) async fn populate(
        &self,
        descriptor: &ResourceDescriptor,
        record: ResourceRecord,
    ) -> AppResult<ResourceRecord> {
        if descriptor
            .fields()
            .iter()
            .all(|field| field.reference_target().is_none())
        {
            return Ok(record);
        }

        let mut data = record.data().clone();
        for field in descriptor.fields() {
            let Some(target_resource) = field.reference_target() else {
                continue;
            };
            let Some(stored) = data.get(field.logical_name().as_str()) else {
                continue;
            };
            let Some(reference_id) = stored.as_str() else {
                continue;
            };

            let Some(referenced) = self
                .repository
                .find_record(target_resource.as_str(), reference_id, true)
                .await?
            else {
                continue;
            };

            let mut embedded = Map::new();
            embedded.insert(
                "id".to_owned(),
                Value::String(referenced.record_id().as_str().to_owned()),
            );
            for projected in field.reference_projection() {
                if let Some(value) = referenced.data().get(projected) {
                    embedded.insert(projected.clone(), value.clone());
                }
            }

            data.insert(
                field.logical_name().as_str().to_owned(),
                Value::Object(embedded),
            );
        }

        Ok(record.with_data(data))
    }

    /// Checks that every reference value in the payload points at an
    /// existing active record of the target resource.
    pub(super) async fn validate_reference_values(
        &self,
        descriptor: &ResourceDescriptor,
        fields: &Map<String, Value>,
    ) -> AppResult<()> {
        for field in descriptor.fields() {
            let Some(target_resource) = field.reference_target() else {
                continue;
            };
            let Some(value) = fields.get(field.logical_name().as_str()) else {
                continue;
            };
            if value.is_null() {
                continue;
            }

            let reference_id = value.as_str().ok_or_else(|| {
                AppError::Validation(format!(
                    "field '{}' must contain a record identifier",
                    field.logical_name().as_str()
                ))
            })?;

            let exists = self
                .repository
                .find_record(target_resource.as_str(), reference_id, false)
                .await?
                .is_some();
            if !exists {
                return Err(AppError::Validation(format!(
                    "field '{}' references missing record '{}' in resource '{}'",
                    field.logical_name().as_str(),
                    reference_id,
                    target_resource.as_str()
                )));
            }
        }

        Ok(())
    }
}
