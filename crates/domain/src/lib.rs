//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod audit;
mod descriptor;
mod record;

pub use audit::{AuditEntry, FieldChange, changed_fields};
pub use descriptor::{FieldDefinition, FieldType, ResourceDescriptor, SequenceNumbering};
pub use record::ResourceRecord;
