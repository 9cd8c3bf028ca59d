//! Display time in the fixed UTC+7 (WIB) zone used by the dashboard and chat messages.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};

pub const WIB_OFFSET_HOURS: i32 = 7;

pub fn wib_offset() -> FixedOffset {
    FixedOffset::east_opt(WIB_OFFSET_HOURS * 3600).expect("static offset is in range")
}

/// `dd/mm/yyyy HH:MM:SS WIB`
pub fn format_wib(instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&wib_offset())
        .format("%d/%m/%Y %H:%M:%S WIB")
        .to_string()
}

/// Parse a run timestamp, either ISO-8601 (`2026-10-16T01:02:03Z`) or the
/// display form `16/10/2026 08:02:03 WIB`, into a UTC instant.
pub fn parse_run_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Some(local) = raw.strip_suffix("WIB") {
        let naive = NaiveDateTime::parse_from_str(local.trim(), "%d/%m/%Y %H:%M:%S").ok()?;
        return Some(naive.and_utc() - chrono::Duration::hours(WIB_OFFSET_HOURS.into()));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // Offset-less ISO stamps are taken as UTC.
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .map(|n| n.and_utc())
}

/// Short human duration, e.g. `1h 02m 03s`, `4m 05s`, `9s`.
pub fn format_duration(duration: chrono::Duration) -> String {
    let total = duration.num_seconds().max(0);
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{h}h {m:02}m {s:02}s")
    } else if m > 0 {
        format!("{m}m {s:02}s")
    } else {
        format!("{s}s")
    }
}
