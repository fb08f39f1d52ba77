use std::sync::Arc;

use bunkerdesk_core::{AppError, AppResult};

use crate::ports::SequenceStore;

/// Counter seed; the first allocation for a scope returns `SEQUENCE_SEED + 1`.
pub const SEQUENCE_SEED: i64 = 999;

/// Issues strictly increasing, scope-partitioned sequence numbers.
#[derive(Clone)]
pub struct SequenceAllocator {
    store: Arc<dyn SequenceStore>,
}

impl SequenceAllocator {
    /// Creates an allocator over a counter store.
    #[must_use]
    pub fn new(store: Arc<dyn SequenceStore>) -> Self {
        Self { store }
    }

    /// Allocates the next number for the scope.
    ///
    /// Store failures surface as [`AppError::Allocation`] so callers can
    /// abandon the record creation that requested the number.
    pub async fn allocate(&self, scope_key: &str) -> AppResult<i64> {
        if scope_key.trim().is_empty() {
            return Err(AppError::Validation(
                "sequence scope key must not be empty".to_owned(),
            ));
        }

        self.store
            .increment_and_fetch(scope_key, SEQUENCE_SEED)
            .await
            .map_err(|error| {
                AppError::Allocation(format!(
                    "failed to allocate sequence number for scope '{scope_key}': {error}"
                ))
            })
    }
}

/// Builds the counter scope key for a resource, optionally partitioned by a
/// parent record identifier.
#[must_use]
pub fn scope_key(resource_type: &str, parent_id: Option<&str>) -> String {
    match parent_id {
        Some(parent_id) => format!("{resource_type}:{parent_id}"),
        None => resource_type.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use bunkerdesk_core::{AppError, AppResult};
    use tokio::sync::Mutex;

    use super::{SequenceAllocator, scope_key};
    use crate::ports::SequenceStore;

    #[derive(Default)]
    struct FakeStore {
        counters: Mutex<HashMap<String, i64>>,
    }

    #[async_trait]
    impl SequenceStore for FakeStore {
        async fn increment_and_fetch(&self, scope_key: &str, seed: i64) -> AppResult<i64> {
            let mut counters = self.counters.lock().await;
            let value = counters.entry(scope_key.to_owned()).or_insert(seed);
            *value += 1;
            Ok(*value)
        }
    }

    struct FailingStore;

    #[async_trait]
    impl SequenceStore for FailingStore {
        async fn increment_and_fetch(&self, _scope_key: &str, _seed: i64) -> AppResult<i64> {
            Err(AppError::Persistence("connection reset".to_owned()))
        }
    }

    #[tokio::test]
    async fn first_two_allocations_return_1000_and_1001() {
        let allocator = SequenceAllocator::new(Arc::new(FakeStore::default()));

        let first = allocator.allocate("chequeosCalidad:bunkerA").await;
        assert!(matches!(first, Ok(1000)));

        let second = allocator.allocate("chequeosCalidad:bunkerA").await;
        assert!(matches!(second, Ok(1001)));
    }

    #[tokio::test]
    async fn scopes_are_numbered_independently() {
        let allocator = SequenceAllocator::new(Arc::new(FakeStore::default()));

        let first = allocator.allocate("chequeosCalidad:bunkerA").await;
        assert!(matches!(first, Ok(1000)));

        let other_scope = allocator.allocate("chequeosCalidad:bunkerB").await;
        assert!(matches!(other_scope, Ok(1000)));
    }

    #[tokio::test]
    async fn store_failures_surface_as_allocation_errors() {
        let allocator = SequenceAllocator::new(Arc::new(FailingStore));

        let result = allocator.allocate("contratos").await;
        assert!(matches!(result, Err(AppError::Allocation(_))));
    }

    #[tokio::test]
    async fn empty_scope_key_is_rejected() {
        let allocator = SequenceAllocator::new(Arc::new(FakeStore::default()));

        let result = allocator.allocate("  ").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn scope_key_concatenates_resource_and_parent() {
        assert_eq!(scope_key("contratos", None), "contratos");
        assert_eq!(
            scope_key("chequeosCalidad", Some("bunkerA")),
            "chequeosCalidad:bunkerA"
        );
    }
}
