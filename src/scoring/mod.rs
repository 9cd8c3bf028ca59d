//! # Scoring
//!
//! Category scores for one (url, strategy) check and the client seam used by
//! the batch driver.

pub mod psi;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::checklist::{CheckItem, Strategy};

/// Lighthouse category ids as requested from the API.
pub const CATEGORIES: [&str; 4] = ["performance", "accessibility", "best-practices", "seo"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryScores {
    pub performance: u8,
    pub accessibility: u8,
    pub best_practices: u8,
    pub seo: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub url: String,
    pub strategy: Strategy,
    pub performance: u8,
    pub accessibility: u8,
    pub best_practices: u8,
    pub seo: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScoreResult {
    pub fn scored(item: &CheckItem, scores: CategoryScores) -> Self {
        Self {
            url: item.url.clone(),
            strategy: item.strategy,
            performance: scores.performance,
            accessibility: scores.accessibility,
            best_practices: scores.best_practices,
            seo: scores.seo,
            error: None,
        }
    }

    pub fn failed(item: &CheckItem, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::scored(item, CategoryScores::default())
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {}", crate::util::error_chain(.0))]
    Transport(#[from] reqwest::Error),
    #[error("HTTP status {0}")]
    Status(reqwest::StatusCode),
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0}")]
    Other(String),
}

/// Source of category scores for a single check.
pub trait ScoreClient {
    fn fetch_scores(&self, item: &CheckItem) -> Result<CategoryScores, FetchError>;
}

/// Score one item, folding any failure into a zero-scored result.
pub fn score(client: &dyn ScoreClient, item: &CheckItem) -> ScoreResult {
    match client.fetch_scores(item) {
        Ok(scores) => ScoreResult::scored(item, scores),
        Err(err) => ScoreResult::failed(item, err.to_string()),
    }
}

/// Map a 0..1 fraction to an integer 0..=100, rounding half away from zero.
pub fn round_score(fraction: f64) -> u8 {
    if !fraction.is_finite() {
        return 0;
    }
    (fraction * 100.0).round().clamp(0.0, 100.0) as u8
}

fn category_score(categories: Option<&Value>, id: &str) -> u8 {
    let raw = categories
        .and_then(|c| c.get(id))
        .and_then(|c| c.get("score"));
    match raw {
        Some(Value::Number(n)) => n.as_f64().map(round_score).unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<f64>().map(round_score).unwrap_or(0),
        _ => 0,
    }
}

/// Extract the four category scores from a PageSpeed v5 response body.
pub fn scores_from_response(body: &Value) -> CategoryScores {
    let categories = body
        .get("lighthouseResult")
        .and_then(|lh| lh.get("categories"));
    CategoryScores {
        performance: category_score(categories, "performance"),
        accessibility: category_score(categories, "accessibility"),
        best_practices: category_score(categories, "best-practices"),
        seo: category_score(categories, "seo"),
    }
}
