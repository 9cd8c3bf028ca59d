//! # Pipeline Module
//!
//! One monitoring run: read the check list, score every item, write the
//! result files, append to history, render the dashboard, notify.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::batch::{self, BatchStats};
use crate::checklist;
use crate::config::Config;
use crate::dashboard::{self, DashboardOptions};
use crate::history::{AppendReport, HistoryStore};
use crate::notify::{Notifier, RunNotice};
use crate::output::{self, Provenance};
use crate::scoring::{ScoreClient, ScoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every check returned scores.
    Success,
    /// Some checks failed; the report still went out.
    Partial,
    /// No check returned scores.
    Failed,
}

impl RunStatus {
    pub fn from_stats(stats: &BatchStats) -> Self {
        if stats.failed == 0 {
            RunStatus::Success
        } else if stats.failed < stats.checked {
            RunStatus::Partial
        } else {
            RunStatus::Failed
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RunStatus::Success => "SUCCESS",
            RunStatus::Partial => "PARTIAL",
            RunStatus::Failed => "FAILED",
        })
    }
}

/// Output locations for one run, resolved from config and CLI.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub input: PathBuf,
    pub out_csv: PathBuf,
    pub out_json: PathBuf,
    pub out_html: PathBuf,
    pub history_dir: PathBuf,
}

impl RunPaths {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            input: cfg.input.clone(),
            out_csv: cfg.output.csv.clone(),
            out_json: cfg.output.json.clone(),
            out_html: cfg.output.html.clone(),
            history_dir: cfg.history.dir.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub status: RunStatus,
    pub results: Vec<ScoreResult>,
    pub stats: BatchStats,
    pub history: AppendReport,
    pub notified: Option<bool>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

fn without_cur_dir(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Prefix from the dashboard's directory to the history directory, as used in
/// browser fetches. Empty when both are the same directory.
pub fn history_base(html_path: &Path, history_dir: &Path) -> String {
    let page_dir = without_cur_dir(html_path.parent().unwrap_or_else(|| Path::new("")));
    let history_dir = without_cur_dir(history_dir);
    if page_dir == history_dir {
        return String::new();
    }
    match history_dir.strip_prefix(&page_dir) {
        Ok(rel) if !rel.as_os_str().is_empty() => {
            let parts: Vec<String> = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            format!("{}/", parts.join("/"))
        }
        Ok(_) => String::new(),
        Err(_) => {
            warn!(
                "history dir {} is not below the dashboard dir {}; trend charts will look next to the page",
                history_dir.display(),
                page_dir.display()
            );
            String::new()
        }
    }
}

pub fn run_monitor(
    cfg: &Config,
    config_hash: &str,
    paths: &RunPaths,
    client: &dyn ScoreClient,
    notifier: Option<&Notifier<'_>>,
) -> Result<RunReport> {
    let started_at = Utc::now();

    let items = checklist::load_checklist(&paths.input)
        .with_context(|| format!("reading check list {}", paths.input.display()))?;
    info!("loaded {} check items from {}", items.len(), paths.input.display());

    let outcome = batch::run_batch(&items, client, cfg.request_delay());
    let results = outcome.results;
    let stats = outcome.stats;

    let provenance = Provenance {
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        config_hash: config_hash.to_string(),
    };
    output::write_results(&results, &paths.out_csv, &paths.out_json, &provenance)
        .context("writing result files")?;
    info!(
        "results written to {} and {}",
        paths.out_csv.display(),
        paths.out_json.display()
    );

    crate::util::ensure_output_dir(&paths.history_dir)?;
    let store = HistoryStore::new(&paths.history_dir, cfg.history.max_entries);
    let history = store.append(&results).context("appending history")?;

    let opts = DashboardOptions {
        maintainer_name: cfg.dashboard.maintainer_name.clone(),
        maintainer_link: cfg.dashboard.maintainer_link.clone(),
        history_base: history_base(&paths.out_html, &paths.history_dir),
        generated_at: Utc::now(),
        ..DashboardOptions::default()
    };
    dashboard::render(&results, &paths.out_html, &opts).context("rendering dashboard")?;

    let status = RunStatus::from_stats(&stats);
    let finished_at = Utc::now();
    let notified = notifier.map(|n| {
        let status_text = status.to_string();
        let notice = RunNotice::new(&status_text).with_window(Some(started_at), Some(finished_at));
        n.notify(&notice)
    });

    info!(
        "run finished status={} checked={} failed={} head={} month={}",
        status, stats.checked, stats.failed, history.head_count, history.month_count
    );

    Ok(RunReport {
        status,
        results,
        stats,
        history,
        notified,
        started_at,
        finished_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_from_stats() {
        let mut stats = BatchStats {
            checked: 3,
            ..BatchStats::default()
        };
        assert_eq!(RunStatus::from_stats(&stats), RunStatus::Success);
        stats.failed = 1;
        assert_eq!(RunStatus::from_stats(&stats), RunStatus::Partial);
        stats.failed = 3;
        assert_eq!(RunStatus::from_stats(&stats), RunStatus::Failed);
        assert_eq!(RunStatus::Failed.to_string(), "FAILED");
    }

    #[test]
    fn history_base_paths() {
        let html = Path::new("dashboard/dashboard.html");
        assert_eq!(history_base(html, Path::new("dashboard")), "");
        assert_eq!(history_base(html, Path::new("dashboard/data")), "data/");
        assert_eq!(history_base(Path::new("index.html"), Path::new("site/data")), "site/data/");
        assert_eq!(history_base(html, Path::new("elsewhere")), "");
        let html = Path::new("site/index.html");
        assert_eq!(history_base(html, Path::new("./site/data")), "data/");
        assert_eq!(history_base(Path::new("./site/index.html"), Path::new("site")), "");
        assert_eq!(history_base(Path::new("index.html"), Path::new(".")), "");
    }
}
