//! # History Store
//!
//! Two layers of run history on disk:
//!
//! - `<dir>/history.json`: the head log, the most recent `max_entries` records
//!   (oldest evicted first).
//! - `<dir>/history/YYYY-MM.json`: one unbounded archive per calendar month.
//!
//! Every record of a run lands in both layers. Unreadable files are treated
//! as empty and rewritten on the next append. One writer at a time.

pub mod file;
pub mod normalize;
pub mod ring;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::scoring::ScoreResult;

pub use normalize::{month_key, normalize_url, utc_stamp};
pub use ring::BoundedLog;

pub const HEAD_FILE: &str = "history.json";
pub const ARCHIVE_DIR: &str = "history";
pub const DEFAULT_MAX_ENTRIES: usize = 500;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// A score result as persisted, with the instant of the run that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    #[serde(flatten)]
    pub result: ScoreResult,
    #[serde(default)]
    pub run_at_utc: String,
}

impl HistoryRecord {
    pub fn new(result: ScoreResult) -> Self {
        Self {
            result,
            run_at_utc: String::new(),
        }
    }

    fn normalized(mut self, run_stamp: &str) -> Self {
        self.result.url = normalize_url(&self.result.url);
        if self.run_at_utc.trim().is_empty() {
            self.run_at_utc = run_stamp.to_string();
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendReport {
    pub head_count: usize,
    pub month_count: usize,
    pub month_key: String,
    pub head_path: PathBuf,
    pub month_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct HistoryStore {
    dir: PathBuf,
    max_entries: usize,
}

impl HistoryStore {
    pub fn new(dir: impl Into<PathBuf>, max_entries: usize) -> Self {
        Self {
            dir: dir.into(),
            max_entries,
        }
    }

    pub fn head_path(&self) -> PathBuf {
        self.dir.join(HEAD_FILE)
    }

    pub fn month_path(&self, key: &str) -> PathBuf {
        self.dir.join(ARCHIVE_DIR).join(format!("{key}.json"))
    }

    pub fn append(&self, results: &[ScoreResult]) -> Result<AppendReport, HistoryError> {
        self.append_at(results, Utc::now())
    }

    pub fn append_at(
        &self,
        results: &[ScoreResult],
        now: DateTime<Utc>,
    ) -> Result<AppendReport, HistoryError> {
        let records = results.iter().cloned().map(HistoryRecord::new).collect();
        self.append_records(records, now)
    }

    /// Append records to the head log and the archive of the run's month.
    ///
    /// Records without `run_at_utc` are stamped with `now`; the archive month
    /// is always taken from `now`.
    pub fn append_records(
        &self,
        records: Vec<HistoryRecord>,
        now: DateTime<Utc>,
    ) -> Result<AppendReport, HistoryError> {
        let stamp = utc_stamp(now);
        let rows = records
            .into_iter()
            .map(|r| serde_json::to_value(r.normalized(&stamp)))
            .collect::<Result<Vec<Value>, _>>()?;

        let head_path = self.head_path();
        let mut head = BoundedLog::from_vec(file::load_entries(&head_path), self.max_entries);
        head.extend(rows.iter().cloned());
        file::write_entries(&head_path, &head)?;

        let key = month_key(&stamp).to_string();
        let month_path = self.month_path(&key);
        let mut month = file::load_entries(&month_path);
        month.extend(rows);
        file::write_entries(&month_path, &month)?;

        info!(
            "{} updated: {} records (last {}); {} archive: {} records",
            HEAD_FILE,
            head.len(),
            head.capacity(),
            key,
            month.len()
        );

        Ok(AppendReport {
            head_count: head.len(),
            month_count: month.len(),
            month_key: key,
            head_path,
            month_path,
        })
    }
}
