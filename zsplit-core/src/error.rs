//! Error types for the splitter

use crate::stats::RunStats;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for splitter operations
///
/// Every variant is fatal for a run; there are no automatic retries.
#[derive(Debug, Error)]
pub enum Error {
    /// The input file could not be opened
    #[error("Failed to open input file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The compressed stream has an unrecognised or invalid header
    #[error("Failed to create decompressor: {0}")]
    DecompressionInit(String),

    /// I/O failure while decompressing or reading records
    #[error("Read error: {0}")]
    Read(#[source] io::Error),

    /// A single record is longer than the configured maximum
    #[error("Record too large: {size} bytes exceeds the limit of {limit} bytes")]
    RecordTooLarge { size: usize, limit: usize },

    /// Failure creating, writing or flushing an intermediate segment file
    #[error("Write error on {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The external converter failed or did not produce its artifact
    #[error("Conversion of {} failed: {reason}\nOutput: {output}", .segment.display())]
    Conversion {
        segment: PathBuf,
        reason: String,
        output: String,
    },

    /// The first segment of the run received no records
    #[error("No data was written from the input file")]
    NoData,

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for splitter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Terminal failure of a pipeline run
///
/// Carries the segment that was in flight (if the run got that far) and the
/// statistics accumulated up to the failure, so callers can decide whether
/// the segments already converted are still useful.
#[derive(Debug)]
pub struct PipelineError {
    /// Segment number being processed, `None` if the run failed during setup
    pub segment: Option<u32>,
    /// Partial statistics at the time of failure
    pub stats: RunStats,
    /// Underlying cause
    pub source: Error,
}

impl PipelineError {
    pub(crate) fn new(segment: Option<u32>, stats: RunStats, source: Error) -> Self {
        Self {
            segment,
            stats,
            source,
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.segment {
            Some(segment) => write!(f, "Failed to process part {segment}: {}", self.source),
            None => write!(f, "Failed to start processing: {}", self.source),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}
