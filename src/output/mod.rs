pub mod csv;
pub mod json;

use std::path::Path;

use thiserror::Error;

use crate::scoring::ScoreResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Csv,
    Json,
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Provenance stamped into structured outputs.
#[derive(Debug, Clone)]
pub struct Provenance {
    pub tool_version: String,
    pub config_hash: String,
}

/// Output sink for the results of one run.
///
/// # Example
/// ```rust
/// use psiwatch::checklist::{CheckItem, Strategy};
/// use psiwatch::output::{self, OutputKind, Provenance};
/// use psiwatch::scoring::{CategoryScores, ScoreResult};
///
/// let dir = std::env::temp_dir().join("psiwatch_output_example");
/// let provenance = Provenance {
///     tool_version: "0.1.0".to_string(),
///     config_hash: String::new(),
/// };
/// let mut sink = output::build_sink(OutputKind::Csv, &dir.join("results.csv"), &provenance).unwrap();
///
/// let item = CheckItem { url: "https://example.com/".to_string(), strategy: Strategy::Mobile };
/// sink.record_result(&ScoreResult::scored(&item, CategoryScores::default())).unwrap();
/// sink.finish().unwrap();
/// ```
pub trait ResultSink {
    fn record_result(&mut self, result: &ScoreResult) -> Result<(), OutputError>;
    fn finish(&mut self) -> Result<(), OutputError>;
}

pub fn build_sink(
    kind: OutputKind,
    path: &Path,
    provenance: &Provenance,
) -> Result<Box<dyn ResultSink>, OutputError> {
    crate::util::ensure_parent_dir(path)?;
    match kind {
        OutputKind::Csv => Ok(Box::new(csv::CsvSink::new(path)?)),
        OutputKind::Json => Ok(Box::new(json::JsonSink::new(path, provenance))),
    }
}

/// Write `results` to the tabular and structured outputs.
pub fn write_results(
    results: &[ScoreResult],
    csv_path: &Path,
    json_path: &Path,
    provenance: &Provenance,
) -> Result<(), OutputError> {
    let mut sinks = vec![
        build_sink(OutputKind::Csv, csv_path, provenance)?,
        build_sink(OutputKind::Json, json_path, provenance)?,
    ];
    for sink in sinks.iter_mut() {
        for result in results {
            sink.record_result(result)?;
        }
        sink.finish()?;
    }
    Ok(())
}
