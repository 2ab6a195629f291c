//! Durable reminder-delivery ledger.
//!
//! Maps a reminder key to the fire instant (epoch milliseconds) of the most
//! recent reminder delivered for that routine. The ledger exists to prevent
//! re-delivery across process restarts and poll cycles; entries are written
//! only at dispatch time and never deleted.
//!
//! On disk the ledger is an append-only JSONL file. Replay keeps the
//! maximum timestamp per key, so appending an already-recorded value is
//! harmless and the in-memory view is monotonic.

use crate::error::{ClassbellError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ReminderRecord {
    key: String,
    fire_at_ms: i64,
    recorded_at_ms: u64,
}

/// File-backed map of delivered reminders.
pub struct ReminderLedger {
    path: Option<PathBuf>,
    records: HashMap<String, i64>,
}

impl ReminderLedger {
    /// Open a ledger at `path`, replaying existing records.
    ///
    /// A missing file is an empty ledger. An unreadable file or malformed
    /// lines are logged and skipped; dedup state is best-effort, not
    /// load-bearing for correctness of anything but re-delivery.
    #[must_use]
    pub fn open(path: PathBuf) -> Self {
        let mut ledger = Self {
            path: Some(path),
            records: HashMap::new(),
        };
        ledger.replay();
        ledger
    }

    /// An in-memory ledger that never touches disk.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            path: None,
            records: HashMap::new(),
        }
    }

    /// Fire instant of the most recently delivered reminder for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<i64> {
        self.records.get(key).copied()
    }

    /// All delivered records, keyed by reminder key.
    #[must_use]
    pub fn records(&self) -> &HashMap<String, i64> {
        &self.records
    }

    /// Record a delivered reminder.
    ///
    /// Appends to the backing file and updates the in-memory view, keeping
    /// the maximum per key. Re-writing an existing value is a harmless
    /// no-op on the view.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing file cannot be written; the
    /// in-memory view is updated regardless, so the current process still
    /// dedups correctly.
    pub fn set(&mut self, key: &str, fire_at_ms: i64) -> Result<()> {
        let entry = self.records.entry(key.to_owned()).or_insert(fire_at_ms);
        *entry = (*entry).max(fire_at_ms);

        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ClassbellError::Ledger(format!("failed to create ledger directory: {e}"))
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| ClassbellError::Ledger(format!("failed to open ledger: {e}")))?;

        let record = ReminderRecord {
            key: key.to_owned(),
            fire_at_ms,
            recorded_at_ms: now_epoch_millis(),
        };
        let json = serde_json::to_string(&record)
            .map_err(|e| ClassbellError::Ledger(format!("failed to encode ledger record: {e}")))?;
        writeln!(file, "{json}")
            .map_err(|e| ClassbellError::Ledger(format!("failed to append ledger record: {e}")))?;

        Ok(())
    }

    fn replay(&mut self) {
        let Some(path) = &self.path else {
            return;
        };

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return,
            Err(e) => {
                tracing::warn!("cannot read reminder ledger at {}: {e}", path.display());
                return;
            }
        };

        for line in content.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<ReminderRecord>(trimmed) {
                Ok(record) => {
                    let entry = self.records.entry(record.key).or_insert(record.fire_at_ms);
                    *entry = (*entry).max(record.fire_at_ms);
                }
                Err(e) => {
                    tracing::warn!(
                        "ignoring malformed reminder ledger line in {}: {e}",
                        path.display()
                    );
                }
            }
        }
    }
}

/// Current epoch time in milliseconds.
#[must_use]
pub fn now_epoch_millis() -> u64 {
    match std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH) {
        Ok(duration) => u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        Err(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn missing_file_is_an_empty_ledger() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ledger = ReminderLedger::open(dir.path().join("reminders.jsonl"));
        assert!(ledger.records().is_empty());
    }

    #[test]
    fn set_and_get_round_trip_across_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("reminders.jsonl");

        let mut ledger = ReminderLedger::open(path.clone());
        ledger.set("r1", 1_000).expect("set");
        ledger.set("r2", 2_000).expect("set");
        assert_eq!(ledger.get("r1"), Some(1_000));

        let reopened = ReminderLedger::open(path);
        assert_eq!(reopened.get("r1"), Some(1_000));
        assert_eq!(reopened.get("r2"), Some(2_000));
        assert_eq!(reopened.get("r3"), None);
    }

    #[test]
    fn replay_keeps_the_maximum_per_key() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("reminders.jsonl");

        let mut ledger = ReminderLedger::open(path.clone());
        ledger.set("r1", 5_000).expect("set");
        ledger.set("r1", 3_000).expect("set");
        assert_eq!(ledger.get("r1"), Some(5_000));

        let reopened = ReminderLedger::open(path);
        assert_eq!(reopened.get("r1"), Some(5_000));
    }

    #[test]
    fn rewriting_the_same_value_is_harmless() {
        let mut ledger = ReminderLedger::in_memory();
        ledger.set("r1", 42).expect("set");
        ledger.set("r1", 42).expect("set");
        assert_eq!(ledger.get("r1"), Some(42));
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("reminders.jsonl");
        std::fs::write(
            &path,
            "not json\n{\"key\":\"ok\",\"fire_at_ms\":7,\"recorded_at_ms\":1}\n",
        )
        .expect("write");

        let ledger = ReminderLedger::open(path);
        assert_eq!(ledger.get("ok"), Some(7));
        assert_eq!(ledger.records().len(), 1);
    }
}
