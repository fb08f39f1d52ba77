use async_trait::async_trait;
use bunkerdesk_core::AppResult;
use bunkerdesk_domain::{AuditEntry, ResourceRecord};
use serde_json::{Map, Value};

/// Uniqueness index entry persisted alongside records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueFieldValue {
    /// Field logical name.
    pub field_logical_name: String,
    /// Stable hash for the field value.
    pub field_value_hash: String,
}

/// Query inputs for record listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordListQuery {
    /// Maximum rows returned.
    pub limit: usize,
    /// Number of rows skipped for offset pagination.
    pub offset: usize,
    /// Whether soft-deleted records participate.
    pub include_deleted: bool,
}

/// One page of listed records with the total count for the filter.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordPage {
    /// Total matching records, independent of pagination.
    pub total: u64,
    /// Records for the requested page.
    pub items: Vec<ResourceRecord>,
}

/// Insert payload for a new record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    /// Validated domain fields, including any allocated sequence number.
    pub data: Map<String, Value>,
    /// Uniqueness index entries for the record's unique fields.
    pub unique_values: Vec<UniqueFieldValue>,
    /// Subject that created the record.
    pub created_by: String,
}

/// Atomic mutation applied to one active record.
///
/// The adapter merges `fields` into the record's data, appends
/// `audit_entry` to the history and flips the soft-delete flag when
/// `set_deleted` is set, all as one operation conditional on the record
/// still being active. The record's uniqueness index entries are replaced
/// with `unique_values` in the same operation.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordMutation {
    /// Field updates merged into the record's data.
    pub fields: Map<String, Value>,
    /// History entry describing the change.
    pub audit_entry: AuditEntry,
    /// Whether the mutation soft-deletes the record.
    pub set_deleted: bool,
    /// Replacement uniqueness index entries.
    pub unique_values: Vec<UniqueFieldValue>,
}

/// Repository port for record persistence.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Persists a new record for the resource type.
    async fn create_record(
        &self,
        resource_type: &str,
        record: NewRecord,
    ) -> AppResult<ResourceRecord>;

    /// Finds a record by identifier, optionally including soft-deleted ones.
    async fn find_record(
        &self,
        resource_type: &str,
        record_id: &str,
        include_deleted: bool,
    ) -> AppResult<Option<ResourceRecord>>;

    /// Lists records for the resource type.
    async fn list_records(
        &self,
        resource_type: &str,
        query: RecordListQuery,
    ) -> AppResult<Vec<ResourceRecord>>;

    /// Counts records for the resource type.
    async fn count_records(&self, resource_type: &str, include_deleted: bool) -> AppResult<u64>;

    /// Applies a mutation to an active record.
    ///
    /// Returns `None` when the record is absent or already soft-deleted at
    /// apply time, so racing writers observe the precondition failure
    /// instead of clobbering each other.
    async fn apply_mutation(
        &self,
        resource_type: &str,
        record_id: &str,
        mutation: RecordMutation,
    ) -> AppResult<Option<ResourceRecord>>;
}

/// Port for scope-partitioned atomic counters.
#[async_trait]
pub trait SequenceStore: Send + Sync {
    /// Atomically increments the counter for `scope_key` and returns the
    /// new value, seeding a missing counter at `seed`.
    ///
    /// Implementations must perform the increment as a single atomic
    /// operation against the store, never as a read followed by a write.
    async fn increment_and_fetch(&self, scope_key: &str, seed: i64) -> AppResult<i64>;
}
