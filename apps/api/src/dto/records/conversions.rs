use serde_json::Value;

use bunkerdesk_application::RecordPage;
use bunkerdesk_domain::{AuditEntry, ResourceRecord};

use super::types::{
    AuditEntryResponse, FieldChangeResponse, RecordPageResponse, RecordResponse,
};

impl From<&AuditEntry> for AuditEntryResponse {
    fn from(entry: &AuditEntry) -> Self {
        Self {
            changed_by: entry.changed_by().to_owned(),
            timestamp: entry.timestamp().to_rfc3339(),
            changes: entry
                .changes()
                .iter()
                .map(|(field, change)| {
                    (
                        field.clone(),
                        FieldChangeResponse {
                            from: change.from.clone(),
                            to: change.to.clone(),
                        },
                    )
                })
                .collect(),
        }
    }
}

impl From<ResourceRecord> for RecordResponse {
    fn from(record: ResourceRecord) -> Self {
        let id = record.record_id().as_str().to_owned();
        let eliminado = record.deleted();
        let historial = record.history().iter().map(AuditEntryResponse::from).collect();

        Self {
            id,
            eliminado,
            historial,
            data: Value::Object(record.into_data()),
        }
    }
}

impl From<RecordPage> for RecordPageResponse {
    fn from(page: RecordPage) -> Self {
        Self {
            total: page.total,
            items: page.items.into_iter().map(RecordResponse::from).collect(),
        }
    }
}
