//! Run-level statistics

use crate::segment::SegmentReport;
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Aggregate statistics of a run, owned by the pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStats {
    /// Records written across all segments
    pub total_records: u64,
    /// Bytes written across all segments, terminators included
    pub total_bytes: u64,
    /// Segments that received at least one record
    pub segments: u32,
    /// Columnar artifacts produced, in segment order
    pub artifacts: Vec<PathBuf>,
    /// Wall-clock duration of the run
    #[serde(rename = "elapsed_secs", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

impl RunStats {
    /// Account for a written segment
    pub(crate) fn record_segment(&mut self, report: &SegmentReport) {
        self.segments += 1;
        self.add_counts(report);
    }

    /// Account for records of a segment that failed part-way
    pub(crate) fn record_partial(&mut self, report: &SegmentReport) {
        self.add_counts(report);
    }

    pub(crate) fn record_artifact(&mut self, artifact: PathBuf) {
        self.artifacts.push(artifact);
    }

    pub(crate) fn finish(&mut self, started: Instant) {
        self.elapsed = started.elapsed();
    }

    fn add_counts(&mut self, report: &SegmentReport) {
        self.total_records += report.records_written;
        self.total_bytes += report.bytes_written;
    }

    /// Average write throughput in MB/s over `elapsed`
    pub fn throughput_mb_per_sec(&self, elapsed: Duration) -> f64 {
        let secs = elapsed.as_secs_f64();
        if secs > 0.0 {
            self.total_bytes as f64 / secs / (1024.0 * 1024.0)
        } else {
            0.0
        }
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Statistics:")?;
        writeln!(f, "  Total lines processed: {}", self.total_records)?;
        writeln!(f, "  Parts written: {}", self.segments)?;
        write!(f, "  Execution time: {:.3?}", self.elapsed)
    }
}
