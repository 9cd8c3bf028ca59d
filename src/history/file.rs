use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::history::HistoryError;

/// Read a JSON array of entries. A missing, unreadable, invalid or non-array
/// file yields an empty list.
pub fn load_entries(path: &Path) -> Vec<Value> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(err) => {
            warn!("history file unreadable, starting empty: {} ({err})", path.display());
            return Vec::new();
        }
    };
    if text.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Array(entries)) => entries,
        Ok(_) => {
            warn!("history file is not an array, starting empty: {}", path.display());
            Vec::new()
        }
        Err(err) => {
            warn!("history file is not valid JSON, starting empty: {} ({err})", path.display());
            Vec::new()
        }
    }
}

/// Rewrite `path` in full as pretty JSON, via a sibling temp file and rename.
pub fn write_entries<T: Serialize + ?Sized>(path: &Path, entries: &T) -> Result<(), HistoryError> {
    crate::util::ensure_parent_dir(path)?;
    let mut text = serde_json::to_string_pretty(entries)?;
    text.push('\n');

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = std::path::PathBuf::from(tmp);
    std::fs::write(&tmp, text)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
