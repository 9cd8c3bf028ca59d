//! # Check List
//!
//! Reads the input CSV (`url,strategy`) into the list of pages to score.

use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Mobile,
    Desktop,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Mobile => "mobile",
            Strategy::Desktop => "desktop",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mobile" => Ok(Strategy::Mobile),
            "desktop" => Ok(Strategy::Desktop),
            other => Err(format!("unknown strategy: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckItem {
    pub url: String,
    pub strategy: Strategy,
}

#[derive(Debug, Error)]
pub enum ChecklistError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required column: {0} (expected headers: url,strategy)")]
    MissingColumn(&'static str),
    #[error("check list is empty or invalid (expected headers: url,strategy)")]
    Empty,
}

pub fn load_checklist(path: &Path) -> Result<Vec<CheckItem>, ChecklistError> {
    let file = std::fs::File::open(path)?;
    read_checklist(file)
}

/// Parse check items from CSV text with a `url,strategy` header.
///
/// Rows with an empty url or an unrecognized strategy are skipped; an empty
/// strategy cell means `mobile`.
pub fn read_checklist<R: Read>(reader: R) -> Result<Vec<CheckItem>, ChecklistError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let column = |name: &'static str| {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}').eq_ignore_ascii_case(name))
            .ok_or(ChecklistError::MissingColumn(name))
    };
    let url_idx = column("url")?;
    let strategy_idx = column("strategy")?;

    let mut items = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record?;
        let url = record.get(url_idx).unwrap_or("").trim();
        let raw_strategy = record.get(strategy_idx).unwrap_or("").trim();
        if url.is_empty() {
            debug!("skipping row {}: empty url", line + 1);
            continue;
        }
        let strategy = if raw_strategy.is_empty() {
            Strategy::Mobile
        } else {
            match raw_strategy.parse::<Strategy>() {
                Ok(s) => s,
                Err(err) => {
                    debug!("skipping row {}: {err}", line + 1);
                    continue;
                }
            }
        };
        items.push(CheckItem {
            url: url.to_string(),
            strategy,
        });
    }

    if items.is_empty() {
        return Err(ChecklistError::Empty);
    }
    Ok(items)
}
