use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::output::{OutputError, Provenance, ResultSink};
use crate::scoring::ScoreResult;

/// Buffers results and writes `{generated_at, tool_version, config_hash, data}` on finish.
pub struct JsonSink {
    path: PathBuf,
    tool_version: String,
    config_hash: String,
    rows: Vec<ScoreResult>,
}

#[derive(Serialize)]
struct ResultsDocument<'a> {
    generated_at: String,
    tool_version: &'a str,
    config_hash: &'a str,
    data: &'a [ScoreResult],
}

impl JsonSink {
    pub fn new(path: &Path, provenance: &Provenance) -> Self {
        Self {
            path: path.to_path_buf(),
            tool_version: provenance.tool_version.clone(),
            config_hash: provenance.config_hash.clone(),
            rows: Vec::new(),
        }
    }
}

impl ResultSink for JsonSink {
    fn record_result(&mut self, result: &ScoreResult) -> Result<(), OutputError> {
        self.rows.push(result.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), OutputError> {
        let doc = ResultsDocument {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            tool_version: &self.tool_version,
            config_hash: &self.config_hash,
            data: &self.rows,
        };
        let mut text = serde_json::to_string_pretty(&doc)?;
        text.push('\n');
        std::fs::write(&self.path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checklist::{CheckItem, Strategy};
    use crate::scoring::CategoryScores;
    use serde_json::Value;
    use tempfile::tempdir;

    #[test]
    fn writes_document_with_data() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("results.json");
        let provenance = Provenance {
            tool_version: "0.2.1".to_string(),
            config_hash: "abc".to_string(),
        };
        let mut sink = JsonSink::new(&path, &provenance);
        let item = CheckItem {
            url: "https://example.com/".to_string(),
            strategy: Strategy::Mobile,
        };
        sink.record_result(&ScoreResult::scored(&item, CategoryScores::default()))
            .expect("record");
        sink.record_result(&ScoreResult::failed(&item, "boom")).expect("record");
        sink.finish().expect("finish");

        let doc: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("json");
        assert!(doc["generated_at"].as_str().expect("ts").ends_with('Z'));
        assert_eq!(doc["config_hash"], "abc");
        let data = doc["data"].as_array().expect("data");
        assert_eq!(data.len(), 2);
        assert!(data[0].get("error").is_none());
        assert_eq!(data[1]["error"], "boom");
    }
}
