use std::path::Path;

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::history::{ARCHIVE_DIR, HEAD_FILE, file::load_entries};
use crate::trends::record::TrendRecord;

/// How many months before the current one are read back from the archive.
pub const ARCHIVE_LOOKBACK_MONTHS: u32 = 6;

/// `YYYY-MM` keys of the `count` months preceding `today`, nearest first.
pub fn preceding_months(today: NaiveDate, count: u32) -> Vec<String> {
    let base = today.year() * 12 + today.month0() as i32;
    (1..=count as i32)
        .map(|i| {
            let idx = base - i;
            format!("{:04}-{:02}", idx.div_euclid(12), idx.rem_euclid(12) + 1)
        })
        .collect()
}

/// Concatenate the head log and the preceding months' archives under `dir`.
/// Missing or invalid files contribute nothing.
pub fn load_history(dir: &Path, today: NaiveDate) -> Vec<TrendRecord> {
    let mut records: Vec<TrendRecord> = load_entries(&dir.join(HEAD_FILE))
        .iter()
        .filter_map(TrendRecord::from_value)
        .collect();

    for key in preceding_months(today, ARCHIVE_LOOKBACK_MONTHS) {
        let path = dir.join(ARCHIVE_DIR).join(format!("{key}.json"));
        let more = load_entries(&path);
        if !more.is_empty() {
            debug!("loaded {} archived records from {}", more.len(), path.display());
            records.extend(more.iter().filter_map(TrendRecord::from_value));
        }
    }
    records
}
