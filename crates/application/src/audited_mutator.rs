use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use bunkerdesk_core::Actor;
use bunkerdesk_domain::{AuditEntry, FieldChange, ResourceRecord, changed_fields};

/// Field name carrying the soft-delete flag in diffs and audit entries.
const DELETED_FLAG_FIELD: &str = "eliminado";

/// Computed description of one audited mutation.
///
/// The plan only describes the change; the repository applies the field
/// merge and the history append as a single atomic operation. Prior state
/// is never mutated here.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationPlan {
    /// Field updates to merge into the record's data.
    pub fields: Map<String, Value>,
    /// Field-level diff against the prior state.
    pub changes: BTreeMap<String, FieldChange>,
    /// Whether the mutation soft-deletes the record.
    pub set_deleted: bool,
    /// History entry recording the change.
    pub audit_entry: AuditEntry,
}

/// Plans an audited field update against the record's current state.
///
/// Only keys present in `proposed` participate; a key whose value equals
/// the prior value structurally is omitted from the change set. Returns
/// `None` when nothing changes, in which case no audit entry is appended
/// and nothing needs to be persisted.
#[must_use]
pub fn plan_update(
    prior: &ResourceRecord,
    proposed: Map<String, Value>,
    actor: &Actor,
    at: DateTime<Utc>,
) -> Option<MutationPlan> {
    let changes = changed_fields(prior.data(), &proposed);
    if changes.is_empty() {
        return None;
    }

    let audit_entry = AuditEntry::new(actor.subject(), at, changes.clone());
    Some(MutationPlan {
        fields: proposed,
        changes,
        set_deleted: false,
        audit_entry,
    })
}

/// Plans a soft delete as the single-field `eliminado` transition.
///
/// The diff carries exactly one key regardless of any other pending field
/// differences, matching how deletions are recorded in record history.
#[must_use]
pub fn plan_soft_delete(prior: &ResourceRecord, actor: &Actor, at: DateTime<Utc>) -> MutationPlan {
    let mut changes = BTreeMap::new();
    changes.insert(
        DELETED_FLAG_FIELD.to_owned(),
        FieldChange {
            from: Value::Bool(prior.deleted()),
            to: Value::Bool(true),
        },
    );

    let audit_entry = AuditEntry::new(actor.subject(), at, changes.clone());
    MutationPlan {
        fields: Map::new(),
        changes,
        set_deleted: true,
        audit_entry,
    }
}
