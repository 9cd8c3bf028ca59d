//! # Dashboard Renderer
//!
//! Writes one self-contained HTML page: a card per score result plus an
//! embedded script that re-reads the history files in the browser and draws
//! trend charts. The page expects `history.json` and `history/YYYY-MM.json`
//! at `history_base` relative to its own location.

pub mod cards;

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::scoring::ScoreResult;
use crate::trends::{MIN_CHART_WIDTH_PX, PX_PER_POINT, Y_MAX, Y_MIN, Y_STEP, source::ARCHIVE_LOOKBACK_MONTHS};
use crate::wib::{WIB_OFFSET_HOURS, format_wib};

use cards::{card_html, escape_html};

const PAGE_TEMPLATE: &str = include_str!("assets/page.html");
const TREND_SCRIPT: &str = include_str!("assets/trends.js");

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct DashboardOptions {
    pub title: String,
    pub maintainer_name: String,
    pub maintainer_link: String,
    /// Prefix prepended to history file paths by the page script, e.g. `""` or `"data/"`.
    pub history_base: String,
    pub generated_at: DateTime<Utc>,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            title: "PageSpeed Dashboard".to_string(),
            maintainer_name: String::new(),
            maintainer_link: String::new(),
            history_base: String::new(),
            generated_at: Utc::now(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScriptConfig<'a> {
    history_base: &'a str,
    lookback_months: u32,
    min_width: u32,
    px_per_point: u32,
    wib_offset_hours: i32,
    y_min: u8,
    y_max: u8,
    y_step: u8,
}

fn script(opts: &DashboardOptions) -> Result<String, DashboardError> {
    let cfg = ScriptConfig {
        history_base: &opts.history_base,
        lookback_months: ARCHIVE_LOOKBACK_MONTHS,
        min_width: MIN_CHART_WIDTH_PX,
        px_per_point: PX_PER_POINT,
        wib_offset_hours: WIB_OFFSET_HOURS,
        y_min: Y_MIN,
        y_max: Y_MAX,
        y_step: Y_STEP,
    };
    // '<' is escaped so the literal cannot close the surrounding <script>.
    let json = serde_json::to_string(&cfg)?.replace('<', "\\u003c");
    Ok(TREND_SCRIPT.replace("__CONFIG__", &json))
}

/// Build the page markup for `results`.
pub fn render_html(results: &[ScoreResult], opts: &DashboardOptions) -> Result<String, DashboardError> {
    let cards = results
        .iter()
        .map(card_html)
        .collect::<Vec<_>>()
        .join("\n");

    // Cards go in last so placeholder-like text inside urls is left alone.
    Ok(PAGE_TEMPLATE
        .replace("__SCRIPT__", &script(opts)?)
        .replace("__TITLE__", &escape_html(&opts.title))
        .replace("__COUNT__", &results.len().to_string())
        .replace("__GENERATED__", &format_wib(opts.generated_at))
        .replace("__MAINTAINER_LINK__", &escape_html(&opts.maintainer_link))
        .replace("__MAINTAINER_NAME__", &escape_html(&opts.maintainer_name))
        .replace("__CARDS__", &cards))
}

pub fn render(
    results: &[ScoreResult],
    output_path: &Path,
    opts: &DashboardOptions,
) -> Result<(), DashboardError> {
    let html = render_html(results, opts)?;
    crate::util::ensure_parent_dir(output_path)?;
    std::fs::write(output_path, html)?;
    info!("dashboard saved to {}", output_path.display());
    Ok(())
}
