use std::sync::Arc;

use chrono::{Local, NaiveDate, NaiveTime, Timelike};
use log::{info, warn};
use serde::Serialize;

use crate::{
    error::{Result, StoreError, TrackerError},
    models::{fmt_decimal, LedgerEntry},
    store::{keys, read_decimal, KeyValueStore},
};

/// Target assumed until the needs calculator (or an override) has written one.
pub const DEFAULT_DAILY_TARGET_LITERS: f64 = 2.5;

/// Result of a successful `log_intake`. `target_reached` is informational:
/// the entry was accepted either way.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogOutcome {
    pub logged_amount: f64,
    pub target_reached: bool,
}

/// One run of the history between reset boundaries, for rendering the ledger
/// as day sections. Indices are positions in the full ledger, so deletion by
/// position keeps working on grouped views.
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySection {
    /// Ledger position of the marker that opened this section; `None` for the
    /// implicit section holding entries logged before the first reset.
    pub marker_index: Option<usize>,
    /// Date carried by the opening marker, if any.
    pub started_on: Option<NaiveDate>,
    /// Readings in this section, each with its ledger position.
    pub readings: Vec<(usize, LedgerEntry)>,
}

/// Append-only intake history plus the running logged-amount counter.
///
/// Owns the `entries` and `@loggedAmount` keys; reads `@individualNeed` to
/// enforce the capacity check. All writes are independent keys applied in
/// sequence, counter before ledger append, so a mid-sequence storage failure
/// can lose a history row but never inflate the counter.
#[derive(Clone)]
pub struct IntakeLedger {
    store: Arc<dyn KeyValueStore>,
}

impl IntakeLedger {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn entries(&self) -> Result<Vec<LedgerEntry>> {
        match self.store.get(keys::ENTRIES).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|_| TrackerError::corrupt(keys::ENTRIES, &raw)),
            None => Ok(Vec::new()),
        }
    }

    pub async fn logged_amount(&self) -> Result<f64> {
        Ok(read_decimal(self.store.as_ref(), keys::LOGGED_AMOUNT)
            .await?
            .unwrap_or(0.0))
    }

    pub async fn daily_target(&self) -> Result<f64> {
        Ok(read_decimal(self.store.as_ref(), keys::INDIVIDUAL_NEED)
            .await?
            .unwrap_or(DEFAULT_DAILY_TARGET_LITERS))
    }

    /// Records a drink at the current local date and time.
    pub async fn log_intake(&self, amount_liters: f64) -> Result<LogOutcome> {
        let now = Local::now();
        let time = now.time();
        self.log_intake_at(
            amount_liters,
            now.date_naive(),
            time.with_nanosecond(0).unwrap_or(time),
        )
        .await
    }

    /// Records a drink with an explicit timestamp.
    ///
    /// Rejects non-positive amounts and amounts that would push the counter
    /// past the daily target; neither the counter nor the ledger moves on a
    /// rejection. The attempted entry is refused outright, never clamped.
    pub async fn log_intake_at(
        &self,
        amount_liters: f64,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<LogOutcome> {
        if !amount_liters.is_finite() || amount_liters <= 0.0 {
            return Err(TrackerError::validation(
                "intake must be a positive number of liters",
            ));
        }

        let logged = self.logged_amount().await?;
        let target = self.daily_target().await?;
        let mut entries = self.entries().await?;

        let new_logged = logged + amount_liters;
        if new_logged > target {
            warn!("rejected intake of {amount_liters} L: {logged} of {target} L already logged");
            return Err(TrackerError::CapacityExceeded {
                attempted: amount_liters,
                logged,
                target,
            });
        }

        // Counter first; the ledger append is the best-effort second write.
        self.store
            .set(keys::LOGGED_AMOUNT, &fmt_decimal(new_logged))
            .await?;

        entries.push(LedgerEntry::reading(amount_liters, date, time));
        self.write_entries(&entries).await?;

        let target_reached = new_logged >= target;
        if target_reached {
            info!("daily target reached: {new_logged} of {target} L");
        }

        Ok(LogOutcome {
            logged_amount: new_logged,
            target_reached,
        })
    }

    /// Removes the entry at `index`, reading or section marker alike, and
    /// returns it. The logged-amount counter is left as is: deleting a
    /// historical reading does not retroactively change today's progress.
    pub async fn delete_entry(&self, index: usize) -> Result<LedgerEntry> {
        let mut entries = self.entries().await?;
        if index >= entries.len() {
            return Err(TrackerError::IndexOutOfRange {
                index,
                len: entries.len(),
            });
        }

        let removed = entries.remove(index);
        self.write_entries(&entries).await?;
        Ok(removed)
    }

    /// Zeroes the counter and appends a section marker dated today. Each call
    /// appends a fresh marker; the counter just stays at zero.
    pub async fn reset_day(&self) -> Result<()> {
        self.reset_day_at(Local::now().date_naive()).await
    }

    pub async fn reset_day_at(&self, date: NaiveDate) -> Result<()> {
        let mut entries = self.entries().await?;

        self.store.set(keys::LOGGED_AMOUNT, "0").await?;

        entries.push(LedgerEntry::section_marker(date));
        self.write_entries(&entries).await?;

        info!("day reset on {date}");
        Ok(())
    }

    /// Ledger grouped into sections split at reset markers, oldest first.
    pub async fn sections(&self) -> Result<Vec<HistorySection>> {
        let entries = self.entries().await?;

        let mut sections = Vec::new();
        let mut current = HistorySection {
            marker_index: None,
            started_on: None,
            readings: Vec::new(),
        };

        for (index, entry) in entries.into_iter().enumerate() {
            if entry.is_section_marker() {
                if current.marker_index.is_some() || !current.readings.is_empty() {
                    sections.push(current);
                }
                current = HistorySection {
                    marker_index: Some(index),
                    started_on: Some(entry.date()),
                    readings: Vec::new(),
                };
            } else {
                current.readings.push((index, entry));
            }
        }

        if current.marker_index.is_some() || !current.readings.is_empty() {
            sections.push(current);
        }

        Ok(sections)
    }

    async fn write_entries(&self, entries: &[LedgerEntry]) -> Result<()> {
        let serialized = serde_json::to_string(entries)
            .map_err(|err| StoreError(format!("failed to serialize ledger: {err}")))?;
        self.store.set(keys::ENTRIES, &serialized).await?;
        Ok(())
    }
}
