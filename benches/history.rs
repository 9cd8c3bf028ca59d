use chrono::{Duration, TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use psiwatch::checklist::{CheckItem, Strategy};
use psiwatch::history::HistoryStore;
use psiwatch::scoring::{CategoryScores, ScoreResult};
use psiwatch::trends::{self, TrendQuery, TrendRecord};

fn results(n: usize) -> Vec<ScoreResult> {
    (0..n)
        .map(|i| {
            let item = CheckItem {
                url: format!("https://bench.example/page/{i}/"),
                strategy: if i % 2 == 0 {
                    Strategy::Mobile
                } else {
                    Strategy::Desktop
                },
            };
            ScoreResult::scored(
                &item,
                CategoryScores {
                    performance: (i % 100) as u8,
                    accessibility: 90,
                    best_practices: 95,
                    seo: 100,
                },
            )
        })
        .collect()
}

fn records(n: usize) -> Vec<TrendRecord> {
    let start = Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            let at = start + Duration::hours(i as i64 * 6);
            TrendRecord {
                url: format!("https://bench.example/page/{}", i % 10),
                strategy: if i % 2 == 0 { "mobile" } else { "desktop" }.to_string(),
                performance: (i % 100) as f64 + 1.0,
                accessibility: 90.0,
                best_practices: 95.0,
                seo: 100.0,
                run_at: at.to_rfc3339(),
            }
        })
        .collect()
}

fn bench_history_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("history_append");
    let now = Utc.with_ymd_and_hms(2026, 10, 16, 1, 0, 0).unwrap();
    for batch in [10usize, 100] {
        let rows = results(batch);
        group.bench_with_input(BenchmarkId::from_parameter(batch), &rows, |b, rows| {
            let dir = tempfile::tempdir().expect("tempdir");
            let store = HistoryStore::new(dir.path(), 500);
            b.iter(|| store.append_at(rows, now).expect("append"));
        });
    }
    group.finish();
}

fn bench_build_chart(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_chart");
    for n in [500usize, 5000] {
        let recs = records(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &recs, |b, recs| {
            let query = TrendQuery::default();
            b.iter(|| trends::build_chart(recs, &query));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_history_append, bench_build_chart);
criterion_main!(benches);
