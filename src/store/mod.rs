use async_trait::async_trait;

use crate::error::StoreError;

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// Persisted key space shared by all components. String keys, string-serialized
/// values; this is the on-disk contract backup/restore tooling must honor.
pub mod keys {
    /// JSON array of ledger entries, insertion order = chronological order.
    pub const ENTRIES: &str = "entries";
    /// Liters logged since the last reset, decimal string.
    pub const LOGGED_AMOUNT: &str = "@loggedAmount";
    /// Daily target in liters, decimal string.
    pub const INDIVIDUAL_NEED: &str = "@individualNeed";
    /// Body weight in kilograms, decimal string.
    pub const WEIGHT: &str = "weight";
    /// Activity factor, decimal string (one of the enumerated factors).
    pub const ACTIVITY_LEVEL: &str = "activityLevel";
    /// Climate factor, decimal string (one of the enumerated factors).
    pub const CLIMATE: &str = "climate";
    /// `"male"` or `"female"`.
    pub const GENDER: &str = "gender";
    /// JSON `{"individual": "<2dp decimal string>"}`, the last computed need.
    pub const WATER_INTAKE: &str = "waterIntake";
    /// JSON boolean, whether the profile screen shows results or the form.
    pub const SHOW_RESULTS: &str = "showResults";
}

/// Asynchronous string-keyed store capability.
///
/// The tracker treats this as its only durable boundary: last-writer-wins per
/// key, no transactions across keys. Implementations supply their own interior
/// mutability; callers never issue overlapping writes to the same key within a
/// single logical operation.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Reads a decimal-string key. A present-but-unparsable value surfaces as a
/// storage error naming the key.
pub(crate) async fn read_decimal(
    store: &dyn KeyValueStore,
    key: &str,
) -> crate::error::Result<Option<f64>> {
    match store.get(key).await? {
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| crate::error::TrackerError::corrupt(key, &raw)),
        None => Ok(None),
    }
}
