//! Segment writer: materializes one size-bounded run of records on disk

use crate::error::Error;
use crate::reader::RecordReader;
use std::ffi::OsString;
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Records between progress log lines
const PROGRESS_INTERVAL: u64 = 1_000_000;

const MIB: f64 = 1024.0 * 1024.0;

/// File names belonging to one segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentPaths {
    /// 1-based segment number
    pub number: u32,
    /// Intermediate line-delimited file, e.g. `out_part_001.jsonl`
    pub intermediate: PathBuf,
    /// Base name handed to the converter, e.g. `out_part_001`
    pub output_base: PathBuf,
}

impl SegmentPaths {
    pub fn new(prefix: &Path, number: u32, extension: &str) -> Self {
        let base = format!("_part_{number:03}");
        Self {
            number,
            intermediate: with_suffix(prefix, &format!("{base}.{extension}")),
            output_base: with_suffix(prefix, &base),
        }
    }
}

/// Append `suffix` to the last path component without touching separators
pub(crate) fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Why the writer stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentStatus {
    /// The segment reached the size threshold; more input may follow
    ThresholdReached,
    /// The reader signalled end of input
    EndOfInput,
}

/// Byte and record counts for one segment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SegmentReport {
    /// Bytes written, one newline per record included
    pub bytes_written: u64,
    /// Records written
    pub records_written: u64,
}

/// Result of a completed segment write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentOutcome {
    pub report: SegmentReport,
    pub status: SegmentStatus,
}

impl SegmentOutcome {
    /// True if no record was written (input ended immediately)
    pub fn is_empty(&self) -> bool {
        self.report.bytes_written == 0
    }
}

/// A segment write that stopped on an error
///
/// `report` holds what had been written before the failure; that data stays
/// in the intermediate file.
#[derive(Debug)]
pub struct SegmentFailure {
    pub report: SegmentReport,
    pub error: Error,
}

impl fmt::Display for SegmentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (after {} records, {} bytes)",
            self.error, self.report.records_written, self.report.bytes_written
        )
    }
}

impl std::error::Error for SegmentFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Writes records into segment files until a size threshold is crossed
#[derive(Debug, Clone)]
pub struct SegmentWriter {
    threshold: u64,
    buffer_size: usize,
}

impl SegmentWriter {
    /// Create a writer closing segments at `threshold` bytes
    pub fn new(threshold: u64) -> Self {
        Self {
            threshold,
            buffer_size: crate::config::defaults::WRITE_BUFFER_SIZE,
        }
    }

    /// Set the write buffer size
    pub fn with_buffer_size(mut self, bytes: usize) -> Self {
        self.buffer_size = bytes;
        self
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    /// Fill a new file at `path` from `reader`
    ///
    /// The threshold is checked after each record, so a segment can exceed
    /// it by at most one record. On success the file is flushed and synced
    /// before returning.
    pub fn write<R: Read>(
        &self,
        reader: &mut RecordReader<R>,
        path: &Path,
    ) -> Result<SegmentOutcome, SegmentFailure> {
        let mut report = SegmentReport::default();
        let fail = |report, source| SegmentFailure {
            report,
            error: write_error(path, source),
        };

        let file = File::create(path).map_err(|e| fail(report, e))?;
        let mut writer = BufWriter::with_capacity(self.buffer_size, file);

        let status = loop {
            let record = match reader.next_record() {
                Ok(Some(record)) => record,
                Ok(None) => break SegmentStatus::EndOfInput,
                Err(error) => return Err(SegmentFailure { report, error }),
            };

            if let Err(e) = write_record(&mut writer, record) {
                return Err(fail(report, e));
            }

            report.bytes_written += record.len() as u64 + 1;
            report.records_written += 1;

            if report.records_written % PROGRESS_INTERVAL == 0 {
                log::info!(
                    "Progress: processed {} lines, {:.2} MB written",
                    report.records_written,
                    report.bytes_written as f64 / MIB
                );
            }

            if report.bytes_written >= self.threshold {
                break SegmentStatus::ThresholdReached;
            }
        };

        finish(writer).map_err(|e| fail(report, e))?;

        Ok(SegmentOutcome { report, status })
    }
}

fn write_record<W: Write>(writer: &mut W, record: &[u8]) -> io::Result<()> {
    writer.write_all(record)?;
    writer.write_all(b"\n")
}

fn write_error(path: &Path, source: io::Error) -> Error {
    Error::Write {
        path: path.to_path_buf(),
        source,
    }
}

/// Flush buffered data and sync the file to disk
fn finish(mut writer: BufWriter<File>) -> io::Result<()> {
    writer.flush()?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()
}
