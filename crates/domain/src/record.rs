use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use bunkerdesk_core::{AppResult, NonEmptyString};

use crate::audit::AuditEntry;

/// Persisted business record for one resource type.
///
/// Domain fields live in `data`; the envelope carries the soft-delete flag
/// and the append-only change history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    record_id: NonEmptyString,
    resource_type: NonEmptyString,
    data: Map<String, Value>,
    deleted: bool,
    history: Vec<AuditEntry>,
    created_at: DateTime<Utc>,
}

impl ResourceRecord {
    /// Creates a validated record projection.
    pub fn new(
        record_id: impl Into<String>,
        resource_type: impl Into<String>,
        data: Map<String, Value>,
        deleted: bool,
        history: Vec<AuditEntry>,
        created_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        Ok(Self {
            record_id: NonEmptyString::new(record_id)?,
            resource_type: NonEmptyString::new(resource_type)?,
            data,
            deleted,
            history,
            created_at,
        })
    }

    /// Returns the stable record identifier.
    #[must_use]
    pub fn record_id(&self) -> &NonEmptyString {
        &self.record_id
    }

    /// Returns the parent resource type.
    #[must_use]
    pub fn resource_type(&self) -> &NonEmptyString {
        &self.resource_type
    }

    /// Returns the record's domain fields.
    #[must_use]
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Returns whether the record is soft-deleted.
    #[must_use]
    pub fn deleted(&self) -> bool {
        self.deleted
    }

    /// Returns the append-only change history, oldest first.
    #[must_use]
    pub fn history(&self) -> &[AuditEntry] {
        &self.history
    }

    /// Returns the creation time.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Replaces the domain fields, keeping the envelope intact.
    ///
    /// Used for read-time projections such as reference population; the
    /// persisted record is never written through this.
    #[must_use]
    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }

    /// Consumes the record and returns its domain fields.
    #[must_use]
    pub fn into_data(self) -> Map<String, Value> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::Map;

    use super::ResourceRecord;

    #[test]
    fn record_requires_non_empty_identifiers() {
        let result = ResourceRecord::new("", "tanques", Map::new(), false, Vec::new(), Utc::now());
        assert!(result.is_err());

        let result = ResourceRecord::new("r1", " ", Map::new(), false, Vec::new(), Utc::now());
        assert!(result.is_err());
    }
}
