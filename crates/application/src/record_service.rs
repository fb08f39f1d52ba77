use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use bunkerdesk_core::{AppError, AppResult};
use bunkerdesk_domain::{ResourceDescriptor, ResourceRecord};

use crate::ports::{RecordRepository, SequenceStore, UniqueFieldValue};
use crate::sequence_allocator::SequenceAllocator;

mod populate;
mod read;
mod write;

#[cfg(test)]
mod tests;

/// Immutable catalog of resource descriptors served by the facade.
#[derive(Debug, Clone)]
pub struct ResourceRegistry {
    descriptors: BTreeMap<String, ResourceDescriptor>,
}

impl ResourceRegistry {
    /// Creates a registry from a descriptor list, rejecting duplicates.
    pub fn new(descriptors: Vec<ResourceDescriptor>) -> AppResult<Self> {
        let mut registered = BTreeMap::new();
        for descriptor in descriptors {
            let key = descriptor.logical_name().as_str().to_owned();
            if registered.insert(key.clone(), descriptor).is_some() {
                return Err(AppError::Validation(format!(
                    "duplicate resource descriptor '{key}'"
                )));
            }
        }

        Ok(Self {
            descriptors: registered,
        })
    }

    /// Returns every registered descriptor in stable order.
    pub fn descriptors(&self) -> impl Iterator<Item = &ResourceDescriptor> {
        self.descriptors.values()
    }

    fn require(&self, resource_type: &str) -> AppResult<&ResourceDescriptor> {
        self.descriptors.get(resource_type).ok_or_else(|| {
            AppError::Validation(format!("unknown resource type '{resource_type}'"))
        })
    }
}

/// Generic CRUD facade over the descriptor catalog.
///
/// One instance serves every registered resource type; per-resource
/// behavior (validation, numbering, reference population, uniqueness)
/// comes entirely from the descriptor.
#[derive(Clone)]
pub struct RecordService {
    repository: Arc<dyn RecordRepository>,
    sequences: SequenceAllocator,
    registry: Arc<ResourceRegistry>,
}

impl RecordService {
    /// Creates the facade from its persistence ports and descriptor catalog.
    #[must_use]
    pub fn new(
        repository: Arc<dyn RecordRepository>,
        sequence_store: Arc<dyn SequenceStore>,
        registry: Arc<ResourceRegistry>,
    ) -> Self {
        Self {
            repository,
            sequences: SequenceAllocator::new(sequence_store),
            registry,
        }
    }

    /// Returns the registered descriptor catalog.
    #[must_use]
    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    fn unique_values_for(
        descriptor: &ResourceDescriptor,
        data: &Map<String, Value>,
    ) -> AppResult<Vec<UniqueFieldValue>> {
        let mut unique_values = Vec::new();

        for field in descriptor.fields().iter().filter(|field| field.is_unique()) {
            let Some(value) = data.get(field.logical_name().as_str()) else {
                continue;
            };
            if value.is_null() {
                continue;
            }

            let serialized = serde_json::to_string(value).map_err(|error| {
                AppError::Validation(format!(
                    "failed to serialize unique value for field '{}': {error}",
                    field.logical_name().as_str()
                ))
            })?;

            let mut hasher = Sha256::new();
            hasher.update(serialized.as_bytes());
            unique_values.push(UniqueFieldValue {
                field_logical_name: field.logical_name().as_str().to_owned(),
                field_value_hash: format!("{:x}", hasher.finalize()),
            });
        }

        Ok(unique_values)
    }
}

fn object_payload(payload: Value) -> AppResult<Map<String, Value>> {
    match payload {
        Value::Object(fields) => Ok(fields),
        _ => Err(AppError::Validation(
            "payload must be a JSON object".to_owned(),
        )),
    }
}
