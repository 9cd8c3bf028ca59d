use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::trends::Metric;
use crate::wib::parse_run_at;

/// Reader-side view of one history entry. Every field is optional on disk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendRecord {
    pub url: String,
    pub strategy: String,
    pub performance: f64,
    pub accessibility: f64,
    pub best_practices: f64,
    pub seo: f64,
    /// `run_at_wib` when present, otherwise `run_at_utc`.
    pub run_at: String,
}

fn text(obj: &serde_json::Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn number(obj: &serde_json::Map<String, Value>, key: &str) -> f64 {
    let v = match obj.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if v.is_finite() { v } else { 0.0 }
}

impl TrendRecord {
    /// `None` for entries that are not JSON objects.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let wib = text(obj, "run_at_wib");
        let run_at = if wib.is_empty() { text(obj, "run_at_utc") } else { wib };
        Some(Self {
            url: text(obj, "url"),
            strategy: text(obj, "strategy"),
            performance: number(obj, "performance"),
            accessibility: number(obj, "accessibility"),
            best_practices: number(obj, "best_practices"),
            seo: number(obj, "seo"),
            run_at,
        })
    }

    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Performance => self.performance,
            Metric::Accessibility => self.accessibility,
            Metric::BestPractices => self.best_practices,
            Metric::Seo => self.seo,
        }
    }

    pub fn instant(&self) -> Option<DateTime<Utc>> {
        parse_run_at(&self.run_at)
    }

    /// First `len` characters of the raw timestamp, used for date/month selectors.
    pub fn run_at_prefix(&self, len: usize) -> &str {
        match self.run_at.char_indices().nth(len) {
            Some((idx, _)) => &self.run_at[..idx],
            None => &self.run_at,
        }
    }
}
