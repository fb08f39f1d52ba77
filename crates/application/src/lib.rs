//! Application services and ports.

#![forbid(unsafe_code)]

mod audited_mutator;
mod ports;
mod record_service;
mod sequence_allocator;

pub use audited_mutator::{MutationPlan, plan_soft_delete, plan_update};
pub use ports::{
    NewRecord, RecordListQuery, RecordMutation, RecordPage, RecordRepository, SequenceStore,
    UniqueFieldValue,
};
pub use record_service::{RecordService, ResourceRegistry};
pub use sequence_allocator::{SEQUENCE_SEED, SequenceAllocator, scope_key};
