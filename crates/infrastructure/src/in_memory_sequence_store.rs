use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use bunkerdesk_application::SequenceStore;
use bunkerdesk_core::AppResult;

/// In-memory counter store for tests and local development.
#[derive(Debug, Default)]
pub struct InMemorySequenceStore {
    counters: Mutex<HashMap<String, i64>>,
}

impl InMemorySequenceStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            counters: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl SequenceStore for InMemorySequenceStore {
    async fn increment_and_fetch(&self, scope_key: &str, seed: i64) -> AppResult<i64> {
        // The mutex spans the whole read-increment-write, matching the
        // single-statement guarantee of the Postgres store.
        let mut counters = self.counters.lock().await;
        let value = counters.entry(scope_key.to_owned()).or_insert(seed);
        *value += 1;
        Ok(*value)
    }
}
