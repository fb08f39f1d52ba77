mod catalog;
mod common;
mod records;

pub use catalog::{ResourceDescriptorResponse, ResourceFieldResponse};
pub use common::{HealthDependencyStatus, HealthResponse};
pub use records::{
    AuditEntryResponse, CreateRecordRequest, FieldChangeResponse, RecordPageResponse,
    RecordResponse, UpdateRecordRequest,
};
