//! JSON output formatter

use super::OutputFormatter;
use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use zsplit_core::{PipelineError, RunStats};

/// JSON formatter - outputs one run summary object
pub struct JsonFormatter<W: Write> {
    writer: W,
}

/// Data structure for JSON output
#[derive(Debug, Serialize)]
pub struct RunSummary<'a> {
    /// Input file that was split
    pub input: &'a Path,
    /// "ok" or "failed"
    pub status: &'static str,
    /// Segment in flight when the run failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_segment: Option<u32>,
    /// Failure cause
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Statistics of the run
    pub stats: &'a RunStats,
}

impl<W: Write> JsonFormatter<W> {
    /// Create a new JSON formatter
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn write_summary(&mut self, summary: &RunSummary<'_>) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, summary)?;
        writeln!(self.writer)?;
        Ok(())
    }
}

impl<W: Write> OutputFormatter for JsonFormatter<W> {
    fn format_success(&mut self, input: &Path, stats: &RunStats) -> Result<()> {
        self.write_summary(&RunSummary {
            input,
            status: "ok",
            failed_segment: None,
            error: None,
            stats,
        })
    }

    fn format_failure(&mut self, input: &Path, error: &PipelineError) -> Result<()> {
        self.write_summary(&RunSummary {
            input,
            status: "failed",
            failed_segment: error.segment,
            error: Some(error.source.to_string()),
            stats: &error.stats,
        })
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_success_summary() {
        let stats = RunStats {
            total_records: 2,
            total_bytes: 20,
            segments: 1,
            artifacts: vec![PathBuf::from("out_part_001.parquet")],
            ..Default::default()
        };

        let mut buffer = Vec::new();
        JsonFormatter::new(&mut buffer)
            .format_success(Path::new("in.zst"), &stats)
            .unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["status"], "ok");
        assert_eq!(value["input"], "in.zst");
        assert_eq!(value["stats"]["total_records"], 2);
        assert_eq!(value["stats"]["artifacts"][0], "out_part_001.parquet");
        assert!(value["stats"]["elapsed_secs"].is_number());
        assert!(value.get("error").is_none());
    }
}
