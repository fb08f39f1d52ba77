mod conversions;
mod types;

pub use types::{
    AuditEntryResponse, CreateRecordRequest, FieldChangeResponse, RecordPageResponse,
    RecordResponse, UpdateRecordRequest,
};
