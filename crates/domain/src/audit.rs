use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Before/after pair for a single changed field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    /// Serialized value before the mutation; `null` when the field was absent.
    pub from: Value,
    /// Serialized value the mutation writes.
    pub to: Value,
}

/// Immutable field-level change entry appended to a record's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    changed_by: String,
    timestamp: DateTime<Utc>,
    changes: BTreeMap<String, FieldChange>,
}

impl AuditEntry {
    /// Creates an entry for the given actor, time and change set.
    #[must_use]
    pub fn new(
        changed_by: impl Into<String>,
        timestamp: DateTime<Utc>,
        changes: BTreeMap<String, FieldChange>,
    ) -> Self {
        Self {
            changed_by: changed_by.into(),
            timestamp,
            changes,
        }
    }

    /// Returns the subject that performed the change.
    #[must_use]
    pub fn changed_by(&self) -> &str {
        self.changed_by.as_str()
    }

    /// Returns the change time.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the field-level change set.
    #[must_use]
    pub fn changes(&self) -> &BTreeMap<String, FieldChange> {
        &self.changes
    }
}

/// Computes the fields in `proposed` whose values differ from `prior`.
///
/// Comparison is structural equality over the JSON value domain, so nested
/// objects and arrays are compared by content. A field absent from `prior`
/// compares as `null`. Keys absent from `proposed` never appear in the
/// result.
#[must_use]
pub fn changed_fields(
    prior: &Map<String, Value>,
    proposed: &Map<String, Value>,
) -> BTreeMap<String, FieldChange> {
    let mut changes = BTreeMap::new();

    for (field, proposed_value) in proposed {
        let prior_value = prior.get(field).cloned().unwrap_or(Value::Null);
        if &prior_value != proposed_value {
            changes.insert(
                field.clone(),
                FieldChange {
                    from: prior_value,
                    to: proposed_value.clone(),
                },
            );
        }
    }

    changes
}
