//! Logic core of a water-intake tracker: daily-need calculation, an
//! append-only intake ledger with day-boundary markers, and a progress view
//! model, all over an injected asynchronous key-value store.

pub mod error;
pub mod ledger;
pub mod models;
pub mod needs;
pub mod progress;
pub mod store;

pub use error::{Result, StoreError, TrackerError};
pub use ledger::{HistorySection, IntakeLedger, LogOutcome, DEFAULT_DAILY_TARGET_LITERS};
pub use models::{Gender, LedgerEntry, ProfileInputs, WaterIntakeSummary};
pub use needs::{compute_daily_target, NeedsCalculator, MAX_WEIGHT_KG, MIN_WEIGHT_KG};
pub use progress::{compute_progress, Progress, ProgressModel};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
