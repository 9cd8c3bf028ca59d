use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::output::{OutputError, ResultSink};
use crate::scoring::ScoreResult;

pub const CSV_COLUMNS: [&str; 7] = [
    "url",
    "strategy",
    "performance",
    "accessibility",
    "best_practices",
    "seo",
    "error",
];

pub struct CsvSink {
    writer: csv::Writer<File>,
}

#[derive(Serialize)]
struct ScoreResultCsv<'a> {
    url: &'a str,
    strategy: &'a str,
    performance: u8,
    accessibility: u8,
    best_practices: u8,
    seo: u8,
    error: Option<&'a str>,
}

impl CsvSink {
    pub fn new(path: &Path) -> Result<Self, OutputError> {
        let file = File::create(path)?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        writer.write_record(CSV_COLUMNS)?;
        Ok(Self { writer })
    }
}

impl ResultSink for CsvSink {
    fn record_result(&mut self, result: &ScoreResult) -> Result<(), OutputError> {
        let record = ScoreResultCsv {
            url: &result.url,
            strategy: result.strategy.as_str(),
            performance: result.performance,
            accessibility: result.accessibility,
            best_practices: result.best_practices,
            seo: result.seo,
            error: result.error.as_deref(),
        };
        self.writer.serialize(record)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), OutputError> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checklist::{CheckItem, Strategy};
    use crate::scoring::CategoryScores;
    use tempfile::tempdir;

    #[test]
    fn writes_header_and_rows() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("results.csv");
        let mut sink = CsvSink::new(&path).expect("csv sink");

        let item = CheckItem {
            url: "https://example.com/a,b".to_string(),
            strategy: Strategy::Desktop,
        };
        let ok = ScoreResult::scored(
            &item,
            CategoryScores {
                performance: 87,
                accessibility: 95,
                best_practices: 100,
                seo: 90,
            },
        );
        let failed = ScoreResult::failed(&item, "HTTP status 500 Internal Server Error");
        sink.record_result(&ok).expect("record");
        sink.record_result(&failed).expect("record");
        sink.finish().expect("finish");

        let text = std::fs::read_to_string(&path).expect("read");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "url,strategy,performance,accessibility,best_practices,seo,error");
        assert_eq!(lines[1], "\"https://example.com/a,b\",desktop,87,95,100,90,");
        assert_eq!(
            lines[2],
            "\"https://example.com/a,b\",desktop,0,0,0,0,HTTP status 500 Internal Server Error"
        );
    }
}
