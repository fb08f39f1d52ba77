use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Create payload wrapping the record's domain fields.
#[derive(Debug, Deserialize)]
pub struct CreateRecordRequest {
    pub data: Value,
}

/// Partial update payload with the fields to change.
#[derive(Debug, Deserialize)]
pub struct UpdateRecordRequest {
    pub data: Value,
}

/// One before/after value pair.
#[derive(Debug, Serialize)]
pub struct FieldChangeResponse {
    pub from: Value,
    pub to: Value,
}

/// One audit history entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntryResponse {
    pub changed_by: String,
    pub timestamp: String,
    pub changes: BTreeMap<String, FieldChangeResponse>,
}

/// API projection of a resource record.
#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub id: String,
    pub eliminado: bool,
    pub data: Value,
    pub historial: Vec<AuditEntryResponse>,
}

/// One page of records with the filtered total.
#[derive(Debug, Serialize)]
pub struct RecordPageResponse {
    pub total: u64,
    pub items: Vec<RecordResponse>,
}
