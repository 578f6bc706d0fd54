use std::{collections::HashMap, fs, path::PathBuf};

use async_trait::async_trait;
use log::warn;
use tokio::sync::Mutex;

use crate::error::StoreError;

use super::KeyValueStore;

/// Key-value store persisted as a single pretty-printed JSON object on disk.
///
/// The whole map is rewritten on every `set`; the key space is a handful of
/// short strings, so this stays cheap. An unreadable or corrupt file at open
/// time starts the store empty rather than failing.
pub struct JsonFileStore {
    path: PathBuf,
    data: Mutex<HashMap<String, String>>,
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                StoreError(format!(
                    "failed to create store directory {}: {err}",
                    parent.display()
                ))
            })?;
        }

        let data = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|err| {
                StoreError(format!("failed to read store {}: {err}", path.display()))
            })?;
            match serde_json::from_str(&contents) {
                Ok(map) => map,
                Err(err) => {
                    warn!("store file {} is corrupt, starting empty: {err}", path.display());
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    fn persist(&self, data: &HashMap<String, String>) -> Result<(), StoreError> {
        let serialized = serde_json::to_string_pretty(data)
            .map_err(|err| StoreError(format!("failed to serialize store: {err}")))?;
        fs::write(&self.path, serialized).map_err(|err| {
            StoreError(format!("failed to write store {}: {err}", self.path.display()))
        })
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.data.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut guard = self.data.lock().await;
        guard.insert(key.to_string(), value.to_string());
        self.persist(&guard)
    }
}
