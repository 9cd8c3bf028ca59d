//! # Batch Driver
//!
//! Scores every check item in order, one request at a time, sleeping a fixed
//! delay between requests to stay under the upstream rate limit.

use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::checklist::CheckItem;
use crate::scoring::{self, ScoreClient, ScoreResult};

/// Statistics collected during a batch
#[derive(Debug, Clone, Default)]
pub struct BatchStats {
    pub checked: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub results: Vec<ScoreResult>,
    pub stats: BatchStats,
}

pub fn run_batch(items: &[CheckItem], client: &dyn ScoreClient, delay: Duration) -> BatchOutcome {
    let started = Instant::now();
    let total = items.len();
    let mut results = Vec::with_capacity(total);
    let mut stats = BatchStats::default();

    for (idx, item) in items.iter().enumerate() {
        if idx > 0 && !delay.is_zero() {
            std::thread::sleep(delay);
        }

        let result = scoring::score(client, item);
        stats.checked += 1;
        if result.is_error() {
            stats.failed += 1;
            warn!(
                "[{}/{}] {} ({}) failed: {}",
                idx + 1,
                total,
                item.url,
                item.strategy,
                result.error.as_deref().unwrap_or_default()
            );
        } else {
            info!(
                "[{}/{}] {} ({}) perf={} a11y={} bp={} seo={}",
                idx + 1,
                total,
                item.url,
                item.strategy,
                result.performance,
                result.accessibility,
                result.best_practices,
                result.seo
            );
        }
        results.push(result);
    }

    stats.elapsed = started.elapsed();
    info!(
        "batch finished checked={} failed={} elapsed_ms={}",
        stats.checked,
        stats.failed,
        stats.elapsed.as_millis()
    );
    BatchOutcome { results, stats }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use crate::checklist::Strategy;
    use crate::scoring::{CategoryScores, FetchError};

    struct Scripted {
        calls: RefCell<Vec<String>>,
    }

    impl ScoreClient for Scripted {
        fn fetch_scores(&self, item: &CheckItem) -> Result<CategoryScores, FetchError> {
            self.calls.borrow_mut().push(item.url.clone());
            if item.url.contains("broken") {
                return Err(FetchError::Other("HTTP status 500".to_string()));
            }
            Ok(CategoryScores {
                performance: 91,
                accessibility: 80,
                best_practices: 70,
                seo: 60,
            })
        }
    }

    fn item(url: &str) -> CheckItem {
        CheckItem {
            url: url.to_string(),
            strategy: Strategy::Mobile,
        }
    }

    #[test]
    fn failures_do_not_abort_the_batch() {
        let client = Scripted {
            calls: RefCell::new(Vec::new()),
        };
        let items = [item("https://a.io/"), item("https://broken.io/"), item("https://c.io/")];
        let outcome = run_batch(&items, &client, Duration::ZERO);

        assert_eq!(outcome.results.len(), 3);
        assert_eq!(outcome.stats.checked, 3);
        assert_eq!(outcome.stats.failed, 1);
        assert!(outcome.results[1].is_error());
        assert_eq!(outcome.results[2].performance, 91);
        assert_eq!(
            *client.calls.borrow(),
            vec!["https://a.io/", "https://broken.io/", "https://c.io/"]
        );
    }
}
