use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::StoreError;

use super::KeyValueStore;

/// In-memory store. Backs the test suite and embedders that persist elsewhere.
pub struct MemoryStore {
    data: Mutex<HashMap<String, String>>,
    /// Remaining writes before `set` starts failing; negative means unlimited.
    writes_left: AtomicI64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            data: Mutex::new(HashMap::new()),
            writes_left: AtomicI64::new(-1),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `set` fail. Lets tests exercise storage errors.
    pub fn fail_writes(&self) {
        self.writes_left.store(0, Ordering::Relaxed);
    }

    /// Allows exactly `count` more writes, then fails. Lets tests observe
    /// where a multi-key write sequence stops.
    pub fn allow_writes(&self, count: i64) {
        self.writes_left.store(count, Ordering::Relaxed);
    }

    /// Snapshot of the raw key space, for asserting on persisted shapes.
    pub async fn dump(&self) -> HashMap<String, String> {
        self.data.lock().await.clone()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.data.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let left = self.writes_left.load(Ordering::Relaxed);
        if left == 0 {
            return Err(StoreError(format!("write to '{key}' refused")));
        }
        if left > 0 {
            self.writes_left.store(left - 1, Ordering::Relaxed);
        }
        self.data
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
