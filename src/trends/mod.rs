//! # Trend Aggregation
//!
//! Selector options and chart series built from the history files. The
//! dashboard's embedded script applies the same rules in the browser; the two
//! share nothing but the JSON layout written by [`crate::history`].

pub mod record;
pub mod source;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::checklist::Strategy;
use crate::wib::format_wib;

pub use record::TrendRecord;
pub use source::{load_history, preceding_months};

pub const Y_MIN: u8 = 0;
pub const Y_MAX: u8 = 100;
pub const Y_STEP: u8 = 10;
pub const MIN_CHART_WIDTH_PX: u32 = 900;
pub const PX_PER_POINT: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Metric {
    #[default]
    Performance,
    Accessibility,
    BestPractices,
    Seo,
}

impl Metric {
    pub fn key(&self) -> &'static str {
        match self {
            Metric::Performance => "performance",
            Metric::Accessibility => "accessibility",
            Metric::BestPractices => "best_practices",
            Metric::Seo => "seo",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "performance" => Ok(Metric::Performance),
            "accessibility" => Ok(Metric::Accessibility),
            "best_practices" => Ok(Metric::BestPractices),
            "seo" => Ok(Metric::Seo),
            other => Err(format!("unknown metric: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategyFilter {
    #[default]
    All,
    Only(Strategy),
}

/// Current selector state. `None` means "all" for url, date and month.
#[derive(Debug, Clone, Default)]
pub struct TrendQuery {
    pub url: Option<String>,
    pub metric: Metric,
    pub strategy: StrategyFilter,
    pub date: Option<String>,
    pub month: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Selectors {
    pub urls: Vec<String>,
    /// `YYYY-MM-DD` prefixes
    pub dates: Vec<String>,
    /// `YYYY-MM` prefixes
    pub months: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub at: DateTime<Utc>,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    /// One slot per label; `None` is a gap, never a zero.
    pub data: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendChart {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    pub width_px: u32,
    pub y_min: u8,
    pub y_max: u8,
    pub y_step: u8,
}

fn distinct<'a>(records: &'a [TrendRecord], key: impl Fn(&'a TrendRecord) -> &'a str) -> Vec<String> {
    records
        .iter()
        .map(key)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn selectors(records: &[TrendRecord]) -> Selectors {
    Selectors {
        urls: distinct(records, |r| r.url.as_str()),
        dates: distinct(records, |r| r.run_at_prefix(10)),
        months: distinct(records, |r| r.run_at_prefix(7)),
    }
}

fn matches_prefix(value: &str, prefix: Option<&str>) -> bool {
    prefix.is_none_or(|p| p.is_empty() || value.starts_with(p))
}

/// Records passing the url, date, month and metric filters. A metric value
/// of zero means "no data" and drops the record.
pub fn filter_records<'a>(records: &'a [TrendRecord], query: &TrendQuery) -> Vec<&'a TrendRecord> {
    records
        .iter()
        .filter(|r| query.url.as_deref().is_none_or(|u| u.is_empty() || r.url == u))
        .filter(|r| matches_prefix(&r.run_at, query.date.as_deref()))
        .filter(|r| matches_prefix(&r.run_at, query.month.as_deref()))
        .filter(|r| r.metric(query.metric) > 0.0)
        .collect()
}

/// Points of one strategy, ascending by time. Unparseable timestamps are dropped.
pub fn series(records: &[&TrendRecord], strategy: Strategy, metric: Metric) -> Vec<Point> {
    let mut points: Vec<Point> = records
        .iter()
        .filter(|r| r.strategy == strategy.as_str())
        .filter_map(|r| {
            r.instant().map(|at| Point {
                at,
                value: r.metric(metric),
            })
        })
        .collect();
    points.sort_by_key(|p| p.at);
    points
}

/// Project `points` onto `axis`, leaving gaps where the series has no point.
/// When a series has several points at one instant the last one wins.
pub fn align(axis: &[DateTime<Utc>], points: &[Point]) -> Vec<Option<f64>> {
    let by_time: BTreeMap<DateTime<Utc>, f64> = points.iter().map(|p| (p.at, p.value)).collect();
    axis.iter().map(|t| by_time.get(t).copied()).collect()
}

pub fn chart_width(points: usize) -> u32 {
    let n = u32::try_from(points.max(1)).unwrap_or(u32::MAX);
    MIN_CHART_WIDTH_PX.max(n.saturating_mul(PX_PER_POINT))
}

pub fn build_chart(records: &[TrendRecord], query: &TrendQuery) -> TrendChart {
    let rows = filter_records(records, query);

    let (labels, datasets) = match query.strategy {
        StrategyFilter::All => {
            let mobile = series(&rows, Strategy::Mobile, query.metric);
            let desktop = series(&rows, Strategy::Desktop, query.metric);
            let axis: Vec<DateTime<Utc>> = mobile
                .iter()
                .chain(desktop.iter())
                .map(|p| p.at)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();

            let mut datasets = Vec::new();
            for (strategy, points) in [(Strategy::Mobile, &mobile), (Strategy::Desktop, &desktop)] {
                if !points.is_empty() {
                    datasets.push(Dataset {
                        label: strategy.to_string(),
                        data: align(&axis, points),
                    });
                }
            }
            (axis.into_iter().map(format_wib).collect::<Vec<_>>(), datasets)
        }
        StrategyFilter::Only(strategy) => {
            let points = series(&rows, strategy, query.metric);
            let labels = points.iter().map(|p| format_wib(p.at)).collect();
            let dataset = Dataset {
                label: format!("{} ({})", query.metric, strategy),
                data: points.iter().map(|p| Some(p.value)).collect(),
            };
            (labels, vec![dataset])
        }
    };

    TrendChart {
        width_px: chart_width(labels.len()),
        labels,
        datasets,
        y_min: Y_MIN,
        y_max: Y_MAX,
        y_step: Y_STEP,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(url: &str, strategy: &str, perf: f64, at: &str) -> TrendRecord {
        TrendRecord {
            url: url.to_string(),
            strategy: strategy.to_string(),
            performance: perf,
            accessibility: 0.0,
            best_practices: 0.0,
            seo: 0.0,
            run_at: at.to_string(),
        }
    }

    #[test]
    fn selectors_are_sorted_and_distinct() {
        let records = vec![
            rec("https://b.io", "mobile", 50.0, "2026-10-02T00:00:00Z"),
            rec("https://a.io", "mobile", 50.0, "2026-09-30T00:00:00Z"),
            rec("https://b.io", "desktop", 50.0, "2026-10-02T05:00:00Z"),
        ];
        let s = selectors(&records);
        assert_eq!(s.urls, vec!["https://a.io", "https://b.io"]);
        assert_eq!(s.dates, vec!["2026-09-30", "2026-10-02"]);
        assert_eq!(s.months, vec!["2026-09", "2026-10"]);
    }

    #[test]
    fn zero_metric_is_not_plotted() {
        let records = vec![
            rec("https://a.io", "mobile", 0.0, "2026-10-01T00:00:00Z"),
            rec("https://a.io", "mobile", 77.0, "2026-10-02T00:00:00Z"),
        ];
        let query = TrendQuery {
            strategy: StrategyFilter::Only(Strategy::Mobile),
            ..TrendQuery::default()
        };
        let chart = build_chart(&records, &query);
        assert_eq!(chart.labels.len(), 1);
        assert_eq!(chart.datasets[0].data, vec![Some(77.0)]);
        assert_eq!(chart.datasets[0].label, "performance (mobile)");
    }

    #[test]
    fn filters_by_url_date_and_month() {
        let records = vec![
            rec("https://a.io", "mobile", 60.0, "2026-10-01T00:00:00Z"),
            rec("https://a.io", "mobile", 61.0, "2026-10-02T00:00:00Z"),
            rec("https://b.io", "mobile", 62.0, "2026-10-02T00:00:00Z"),
            rec("https://a.io", "mobile", 63.0, "2026-09-02T00:00:00Z"),
        ];
        let by_date = TrendQuery {
            url: Some("https://a.io".to_string()),
            date: Some("2026-10-02".to_string()),
            ..TrendQuery::default()
        };
        let rows = filter_records(&records, &by_date);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].performance, 61.0);

        let by_month = TrendQuery {
            month: Some("2026-10".to_string()),
            ..TrendQuery::default()
        };
        assert_eq!(filter_records(&records, &by_month).len(), 3);

        let everything = TrendQuery {
            url: Some(String::new()),
            ..TrendQuery::default()
        };
        assert_eq!(filter_records(&records, &everything).len(), 4);
    }

    #[test]
    fn all_strategies_merge_with_gaps() {
        let records = vec![
            rec("https://a.io", "mobile", 40.0, "2026-10-01T00:00:00Z"),
            rec("https://a.io", "desktop", 90.0, "2026-10-01T00:00:00Z"),
            rec("https://a.io", "desktop", 95.0, "2026-10-02T00:00:00Z"),
            rec("https://a.io", "mobile", 45.0, "2026-10-03T00:00:00Z"),
        ];
        let chart = build_chart(&records, &TrendQuery::default());
        assert_eq!(
            chart.labels,
            vec![
                "01/10/2026 07:00:00 WIB",
                "02/10/2026 07:00:00 WIB",
                "03/10/2026 07:00:00 WIB"
            ]
        );
        assert_eq!(chart.datasets.len(), 2);
        assert_eq!(chart.datasets[0].label, "mobile");
        assert_eq!(chart.datasets[0].data, vec![Some(40.0), None, Some(45.0)]);
        assert_eq!(chart.datasets[1].label, "desktop");
        assert_eq!(chart.datasets[1].data, vec![Some(90.0), Some(95.0), None]);
    }

    #[test]
    fn wib_and_utc_stamps_share_an_axis_slot() {
        let records = vec![
            rec("https://a.io", "mobile", 40.0, "2026-10-01T00:00:00Z"),
            rec("https://a.io", "desktop", 90.0, "01/10/2026 07:00:00 WIB"),
        ];
        let chart = build_chart(&records, &TrendQuery::default());
        assert_eq!(chart.labels.len(), 1);
        assert_eq!(chart.datasets[1].data, vec![Some(90.0)]);
    }

    #[test]
    fn empty_series_are_omitted() {
        let records = vec![rec("https://a.io", "desktop", 90.0, "2026-10-01T00:00:00Z")];
        let chart = build_chart(&records, &TrendQuery::default());
        assert_eq!(chart.datasets.len(), 1);
        assert_eq!(chart.datasets[0].label, "desktop");
        assert_eq!(chart.width_px, MIN_CHART_WIDTH_PX);
    }

    #[test]
    fn width_grows_with_points() {
        assert_eq!(chart_width(0), 900);
        assert_eq!(chart_width(15), 900);
        assert_eq!(chart_width(16), 960);
        assert_eq!(chart_width(100), 6000);
    }

    #[test]
    fn metric_names_parse() {
        assert_eq!("best-practices".parse::<Metric>(), Ok(Metric::BestPractices));
        assert_eq!("SEO".parse::<Metric>(), Ok(Metric::Seo));
        assert!("speed".parse::<Metric>().is_err());
    }
}
