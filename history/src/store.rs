//! History store: per-(user, month) JSON log files.
//!
//! Each user's turns for one calendar month live in
//! `{base_dir}/{user_id}/{YYYY-MM}/history.json`, an ordered JSON array of
//! [`HistoryRecord`]s. The reader is tolerant: a missing, empty, or corrupt
//! file reads back as an empty log rather than an error.

use crate::error::HistoryError;
use crate::record::{HistoryRecord, Role};
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const HISTORY_FILE: &str = "history.json";

/// Month's usage totals for a user, as shown by /profile and /users.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyUsage {
    /// Number of user-role records this month.
    pub message_count: usize,
    /// Sum of all record prices this month.
    pub total_cost: f64,
}

/// File-backed store of monthly conversation logs.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    base_dir: PathBuf,
}

impl HistoryStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Path of the monthly log for `user_id` in the month of `now`.
    fn month_path(&self, user_id: i64, now: DateTime<Local>) -> PathBuf {
        self.base_dir
            .join(user_id.to_string())
            .join(now.format("%Y-%m").to_string())
            .join(HISTORY_FILE)
    }

    /// Appends one record to the user's current-month log, creating the
    /// file and directories on first write. An unparseable existing file is
    /// replaced by a fresh log holding only the new record (logged, not an error).
    pub fn append(
        &self,
        user_id: i64,
        record: HistoryRecord,
        now: DateTime<Local>,
    ) -> Result<(), HistoryError> {
        let path = self.month_path(user_id, now);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let mut records = read_records(&path, user_id);
        records.push(record);

        fs::write(&path, serde_json::to_string_pretty(&records)?)?;
        info!(
            user_id = user_id,
            records = records.len(),
            path = %path.display(),
            "Appended history record"
        );
        Ok(())
    }

    /// Full ordered log for the month of `now`. Missing, empty, unreadable,
    /// or corrupt files all read back as an empty log, never an error.
    pub fn read_all(&self, user_id: i64, now: DateTime<Local>) -> Vec<HistoryRecord> {
        read_records(&self.month_path(user_id, now), user_id)
    }

    /// Usage totals for the month of `now`: user-message count and summed cost.
    pub fn monthly_usage(&self, user_id: i64, now: DateTime<Local>) -> MonthlyUsage {
        let records = self.read_all(user_id, now);
        MonthlyUsage {
            message_count: records.iter().filter(|r| r.role == Role::User).count(),
            total_cost: records.iter().map(|r| r.price).sum(),
        }
    }
}

fn read_records(path: &Path, user_id: i64) -> Vec<HistoryRecord> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            warn!(user_id = user_id, path = %path.display(), error = %e, "Failed to read history file, treating as empty");
            return Vec::new();
        }
    };

    if raw.trim().is_empty() {
        return Vec::new();
    }

    match serde_json::from_str(&raw) {
        Ok(records) => records,
        Err(e) => {
            warn!(user_id = user_id, path = %path.display(), error = %e, "Corrupt history file, treating as empty");
            Vec::new()
        }
    }
}
