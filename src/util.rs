//! # Utility Module
//!
//! Filesystem helpers shared by the writers, and CLI enum conversions.

use std::path::Path;

use anyhow::{Result, anyhow};
use tracing::warn;

use crate::checklist::Strategy;
use crate::cli::{MetricArg, StrategyArg};
use crate::trends::{Metric, StrategyFilter};

/// Convert CLI metric to internal enum
pub fn metric_from_cli(metric: MetricArg) -> Metric {
    match metric {
        MetricArg::Performance => Metric::Performance,
        MetricArg::Accessibility => Metric::Accessibility,
        MetricArg::BestPractices => Metric::BestPractices,
        MetricArg::Seo => Metric::Seo,
    }
}

/// Convert CLI strategy to a trend filter
pub fn strategy_from_cli(strategy: StrategyArg) -> StrategyFilter {
    match strategy {
        StrategyArg::All => StrategyFilter::All,
        StrategyArg::Mobile => StrategyFilter::Only(Strategy::Mobile),
        StrategyArg::Desktop => StrategyFilter::Only(Strategy::Desktop),
    }
}

/// `err` followed by each distinct message in its `source()` chain, joined by `: `.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let msg = cause.to_string();
        if !msg.is_empty() && !text.contains(&msg) {
            text.push_str(": ");
            text.push_str(&msg);
        }
        source = cause.source();
    }
    text
}

/// Create the parent directory of `path` when it has one.
pub fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Ensure output directory exists and is a directory, warning on unsafe permissions.
pub fn ensure_output_dir(path: &Path) -> Result<()> {
    if path.exists() {
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_dir() {
            return Err(anyhow!(
                "output path is not a directory: {}",
                path.display()
            ));
        }
    } else {
        std::fs::create_dir_all(path)?;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(path)?.permissions().mode();
        if mode & 0o002 != 0 {
            warn!("output directory is world-writable: {}", path.display());
        }
    }

    Ok(())
}
