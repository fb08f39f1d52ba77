use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use uuid::Uuid;

use bunkerdesk_core::{Actor, AppError, AppResult};
use bunkerdesk_domain::{
    FieldDefinition, FieldType, ResourceDescriptor, ResourceRecord, SequenceNumbering,
};

use super::{RecordService, ResourceRegistry};
use crate::ports::{
    NewRecord, RecordListQuery, RecordMutation, RecordRepository, SequenceStore, UniqueFieldValue,
};

struct FakeRepository {
    records: Mutex<HashMap<(String, String), ResourceRecord>>,
    unique_values: Mutex<HashMap<(String, String, String), String>>,
}

impl FakeRepository {
    fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            unique_values: Mutex::new(HashMap::new()),
        }
    }

    async fn stored_count(&self, resource_type: &str) -> usize {
        self.records
            .lock()
            .await
            .keys()
            .filter(|(stored_type, _)| stored_type == resource_type)
            .count()
    }
}

fn ensure_unique_available(
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

#[async_trait]
impl RecordRepository for FakeRepository {
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

        let mut unique_index = self.unique_values.lock().await;
        ensure_unique_available(&unique_index, resource_type, &record.unique_values, None)?;
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

        self.records.lock().await.insert(
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
            .lock()
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
        let records = self.records.lock().await;
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
            .lock()
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
        let mut unique_index = self.unique_values.lock().await;
        let mut records = self.records.lock().await;
        let key = (resource_type.to_owned(), record_id.to_owned());
        let Some(existing) = records.get(&key) else {
            return Ok(None);
        };
        if existing.deleted() {
            return Ok(None);
        }

        unique_index.retain(|(stored_type, _, _), existing_record_id| {
            !(stored_type == resource_type && existing_record_id == record_id)
        });
        ensure_unique_available(
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

#[derive(Default)]
struct FakeSequenceStore {
    counters: Mutex<HashMap<String, i64>>,
}

#[async_trait]
impl SequenceStore for FakeSequenceStore {
    async fn increment_and_fetch(&self, scope_key: &str, seed: i64) -> AppResult<i64> {
        let mut counters = self.counters.lock().await;
        let value = counters.entry(scope_key.to_owned()).or_insert(seed);
        *value += 1;
        Ok(*value)
    }
}

struct FailingSequenceStore;

#[async_trait]
impl SequenceStore for FailingSequenceStore {
    async fn increment_and_fetch(&self, _scope_key: &str, _seed: i64) -> AppResult<i64> {
        Err(AppError::Persistence("counter unavailable".to_owned()))
    }
}

fn registry() -> Arc<ResourceRegistry> {
    let tanques = ResourceDescriptor::new(
        "tanques",
        "Tanques",
        vec![
            FieldDefinition::new("nombre", "Nombre", FieldType::Text, true, true)
                .unwrap_or_else(|_| unreachable!()),
            FieldDefinition::new(
                "capacidadBarriles",
                "Capacidad (barriles)",
                FieldType::Number,
                false,
                false,
            )
            .unwrap_or_else(|_| unreachable!()),
        ],
        None,
    )
    .unwrap_or_else(|_| unreachable!());

    let bunkers = ResourceDescriptor::new(
        "bunkers",
        "Bunkers",
        vec![
            FieldDefinition::new("nombre", "Nombre", FieldType::Text, true, true)
                .unwrap_or_else(|_| unreachable!()),
        ],
        None,
    )
    .unwrap_or_else(|_| unreachable!());

    let chequeos = ResourceDescriptor::new(
        "chequeosCalidad",
        "Chequeos de calidad",
        vec![
            FieldDefinition::reference(
                "bunker",
                "Bunker",
                true,
                "bunkers",
                vec!["nombre".to_owned()],
            )
            .unwrap_or_else(|_| unreachable!()),
            FieldDefinition::new("producto", "Producto", FieldType::Text, true, false)
                .unwrap_or_else(|_| unreachable!()),
        ],
        Some(
            SequenceNumbering::new("numeroChequeoCalidad", Some("bunker".to_owned()))
                .unwrap_or_else(|_| unreachable!()),
        ),
    )
    .unwrap_or_else(|_| unreachable!());

    Arc::new(
        ResourceRegistry::new(vec![tanques, bunkers, chequeos])
            .unwrap_or_else(|_| unreachable!()),
    )
}

fn service_with_repository() -> (RecordService, Arc<FakeRepository>) {
    let repository = Arc::new(FakeRepository::new());
    let service = RecordService::new(
        repository.clone(),
        Arc::new(FakeSequenceStore::default()),
        registry(),
    );
    (service, repository)
}

fn actor() -> Actor {
    Actor::new("U1").unwrap_or_else(|_| unreachable!())
}

async fn create_bunker(service: &RecordService, nombre: &str) -> ResourceRecord {
    service
        .create(&actor(), "bunkers", json!({"nombre": nombre}))
        .await
        .unwrap_or_else(|_| unreachable!())
}

fn sequence_number(record: &ResourceRecord) -> Option<i64> {
    record
        .data()
        .get("numeroChequeoCalidad")
        .and_then(Value::as_i64)
}

#[tokio::test]
async fn create_assigns_scoped_sequence_numbers() {
    let (service, _) = service_with_repository();

    let bunker_a = create_bunker(&service, "Bunker A").await;
    let bunker_b = create_bunker(&service, "Bunker B").await;

    let first = service
        .create(
            &actor(),
            "chequeosCalidad",
            json!({"bunker": bunker_a.record_id().as_str(), "producto": "IFO 380"}),
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(sequence_number(&first), Some(1000));

    let second = service
        .create(
            &actor(),
            "chequeosCalidad",
            json!({"bunker": bunker_a.record_id().as_str(), "producto": "IFO 380"}),
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(sequence_number(&second), Some(1001));

    // A different bunker starts its own run.
    let other_scope = service
        .create(
            &actor(),
            "chequeosCalidad",
            json!({"bunker": bunker_b.record_id().as_str(), "producto": "MGO"}),
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(sequence_number(&other_scope), Some(1000));
}

#[tokio::test]
async fn create_rejects_client_supplied_sequence_number() {
    let (service, _) = service_with_repository();
    let bunker = create_bunker(&service, "Bunker A").await;

    let result = service
        .create(
            &actor(),
            "chequeosCalidad",
            json!({
                "bunker": bunker.record_id().as_str(),
                "producto": "IFO 380",
                "numeroChequeoCalidad": 42
            }),
        )
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn create_validates_payload_against_descriptor() {
    let (service, _) = service_with_repository();

    let unknown_field = service
        .create(&actor(), "tanques", json!({"nombre": "TK-101", "color": "rojo"}))
        .await;
    assert!(matches!(unknown_field, Err(AppError::Validation(_))));

    let missing_required = service
        .create(&actor(), "tanques", json!({"capacidadBarriles": 5000}))
        .await;
    assert!(matches!(missing_required, Err(AppError::Validation(_))));

    let unknown_resource = service
        .create(&actor(), "gabarras", json!({"nombre": "G-1"}))
        .await;
    assert!(matches!(unknown_resource, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn create_rejects_dangling_reference() {
    let (service, _) = service_with_repository();

    let result = service
        .create(
            &actor(),
            "chequeosCalidad",
            json!({"bunker": "no-such-bunker", "producto": "IFO 380"}),
        )
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn duplicate_unique_value_conflicts() {
    let (service, _) = service_with_repository();

    let first = service
        .create(&actor(), "tanques", json!({"nombre": "TK-101"}))
        .await;
    assert!(first.is_ok());

    let second = service
        .create(&actor(), "tanques", json!({"nombre": "TK-101"}))
        .await;
    assert!(matches!(second, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn update_appends_field_level_audit_entry() {
    let (service, _) = service_with_repository();

    let tank = service
        .create(
            &actor(),
            "tanques",
            json!({"nombre": "TK-101", "capacidadBarriles": 5000}),
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    let updated = service
        .update(
            &actor(),
            "tanques",
            tank.record_id().as_str(),
            json!({"capacidadBarriles": 7000}),
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(updated.data().get("capacidadBarriles"), Some(&json!(7000)));
    assert_eq!(updated.history().len(), 1);

    let entry = &updated.history()[0];
    assert_eq!(entry.changed_by(), "U1");
    assert_eq!(entry.changes().len(), 1);
    let change = entry
        .changes()
        .get("capacidadBarriles")
        .unwrap_or_else(|| unreachable!());
    assert_eq!(change.from, json!(5000));
    assert_eq!(change.to, json!(7000));
}

#[tokio::test]
async fn identical_update_appends_no_audit_entry() {
    let (service, _) = service_with_repository();

    let tank = service
        .create(
            &actor(),
            "tanques",
            json!({"nombre": "TK-101", "capacidadBarriles": 5000}),
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    let unchanged = service
        .update(
            &actor(),
            "tanques",
            tank.record_id().as_str(),
            json!({"nombre": "TK-101", "capacidadBarriles": 5000}),
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    assert!(unchanged.history().is_empty());
}

#[tokio::test]
async fn update_of_missing_record_is_not_found() {
    let (service, _) = service_with_repository();

    let result = service
        .update(&actor(), "tanques", "no-such-id", json!({"nombre": "TK-1"}))
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn second_soft_delete_is_not_found() {
    let (service, _) = service_with_repository();

    let tank = service
        .create(&actor(), "tanques", json!({"nombre": "TK-101"}))
        .await
        .unwrap_or_else(|_| unreachable!());

    let deleted = service
        .soft_delete(&actor(), "tanques", tank.record_id().as_str())
        .await;
    assert!(deleted.is_ok());

    let again = service
        .soft_delete(&actor(), "tanques", tank.record_id().as_str())
        .await;
    assert!(matches!(again, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn list_excludes_soft_deleted_records_by_default() {
    let (service, _) = service_with_repository();

    for nombre in ["TK-101", "TK-102", "TK-103"] {
        let created = service
            .create(&actor(), "tanques", json!({"nombre": nombre}))
            .await;
        assert!(created.is_ok());
    }

    let page = service
        .list(
            "tanques",
            RecordListQuery {
                limit: 50,
                offset: 0,
                include_deleted: false,
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(page.total, 3);

    let victim = &page.items[0];
    let deleted = service
        .soft_delete(&actor(), "tanques", victim.record_id().as_str())
        .await;
    assert!(deleted.is_ok());

    let page = service
        .list(
            "tanques",
            RecordListQuery {
                limit: 50,
                offset: 0,
                include_deleted: false,
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(page.total, 2);
    assert!(
        page.items
            .iter()
            .all(|record| record.record_id() != victim.record_id())
    );

    let with_deleted = service
        .list(
            "tanques",
            RecordListQuery {
                limit: 50,
                offset: 0,
                include_deleted: true,
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(with_deleted.total, 3);
}

#[tokio::test]
async fn deleted_record_stays_readable_with_include_deleted() {
    let (service, _) = service_with_repository();

    let tank = service
        .create(&actor(), "tanques", json!({"nombre": "TK-101"}))
        .await
        .unwrap_or_else(|_| unreachable!());

    let deleted = service
        .soft_delete(&actor(), "tanques", tank.record_id().as_str())
        .await;
    assert!(deleted.is_ok());

    let default_read = service
        .get("tanques", tank.record_id().as_str(), false)
        .await;
    assert!(matches!(default_read, Err(AppError::NotFound(_))));

    let audited_read = service
        .get("tanques", tank.record_id().as_str(), true)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(audited_read.deleted());
    assert_eq!(audited_read.history().len(), 1);
    let change = audited_read.history()[0]
        .changes()
        .get("eliminado")
        .unwrap_or_else(|| unreachable!());
    assert_eq!(change.from, json!(false));
    assert_eq!(change.to, json!(true));
}

#[tokio::test]
async fn soft_delete_releases_the_unique_business_key() {
    let (service, _) = service_with_repository();

    let original = service
        .create(&actor(), "tanques", json!({"nombre": "TK-101"}))
        .await
        .unwrap_or_else(|_| unreachable!());

    let deleted = service
        .soft_delete(&actor(), "tanques", original.record_id().as_str())
        .await;
    assert!(deleted.is_ok());

    let replacement = service
        .create(&actor(), "tanques", json!({"nombre": "TK-101"}))
        .await;
    assert!(replacement.is_ok());
}

#[tokio::test]
async fn reads_populate_projected_reference_fields() {
    let (service, _) = service_with_repository();

    let bunker = create_bunker(&service, "Bunker A").await;
    let chequeo = service
        .create(
            &actor(),
            "chequeosCalidad",
            json!({"bunker": bunker.record_id().as_str(), "producto": "IFO 380"}),
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    let fetched = service
        .get("chequeosCalidad", chequeo.record_id().as_str(), false)
        .await
        .unwrap_or_else(|_| unreachable!());

    let populated = fetched
        .data()
        .get("bunker")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_else(|| unreachable!());
    assert_eq!(
        populated.get("id"),
        Some(&json!(bunker.record_id().as_str()))
    );
    assert_eq!(populated.get("nombre"), Some(&json!("Bunker A")));
}

#[tokio::test]
async fn allocation_failure_aborts_the_creation() {
    let repository = Arc::new(FakeRepository::new());
    let service = RecordService::new(
        repository.clone(),
        Arc::new(FailingSequenceStore),
        registry(),
    );

    let bunker = repository
        .create_record(
            "bunkers",
            NewRecord {
                data: json!({"nombre": "Bunker A"})
                    .as_object()
                    .cloned()
                    .unwrap_or_else(|| unreachable!()),
                unique_values: Vec::new(),
                created_by: "U1".to_owned(),
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    let result = service
        .create(
            &actor(),
            "chequeosCalidad",
            json!({"bunker": bunker.record_id().as_str(), "producto": "IFO 380"}),
        )
        .await;
    assert!(matches!(result, Err(AppError::Allocation(_))));
    assert_eq!(repository.stored_count("chequeosCalidad").await, 0);
}
