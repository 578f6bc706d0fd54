use thiserror::Error;

pub type Result<T> = std::result::Result<T, TrackerError>;

/// Failure reported by a [`KeyValueStore`](crate::store::KeyValueStore) backend.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("store error: {0}")]
pub struct StoreError(pub String);

/// Root error type for the tracker core.
///
/// Every variant is recoverable at the call site: the operation that raised it
/// has either left state untouched or, for storage failures mid-sequence,
/// committed only the writes that preceded the failure.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TrackerError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("logging {attempted} L would exceed the daily target ({logged} of {target} L already logged)")]
    CapacityExceeded {
        attempted: f64,
        logged: f64,
        target: f64,
    },

    #[error("no ledger entry at position {index} (ledger holds {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("daily target is zero; progress is undefined")]
    ZeroTarget,

    #[error("storage failed: {0}")]
    Storage(#[from] StoreError),
}

impl TrackerError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Corrupt persisted value: the key existed but its contents did not parse.
    pub fn corrupt(key: &str, value: &str) -> Self {
        Self::Storage(StoreError(format!(
            "corrupt value under key '{key}': '{value}'"
        )))
    }
}
