//! Pipeline orchestration: read, segment, convert, clean up
//!
//! The run is strictly sequential. Segment N is written, flushed, converted
//! and its intermediate file removed before segment N+1 is read, so at most
//! one segment is ever in flight.

use crate::config::Config;
use crate::converter::SegmentConverter;
use crate::decompress::open_source;
use crate::error::{Error, PipelineError};
use crate::reader::RecordReader;
use crate::segment::{SegmentPaths, SegmentReport, SegmentStatus, SegmentWriter};
use crate::stats::RunStats;
use std::fs;
use std::path::Path;
use std::time::Instant;

/// Receives progress callbacks at segment boundaries
pub trait SegmentObserver {
    /// A new segment is about to be written
    fn segment_started(&mut self, _segment: u32) {}

    /// A non-empty segment was written; `compressed_read` is the input
    /// position in compressed bytes
    fn segment_written(&mut self, _segment: u32, _report: &SegmentReport, _compressed_read: u64) {}

    /// A segment's artifact was confirmed on disk
    fn segment_converted(&mut self, _segment: u32, _artifact: &Path) {}
}

/// Observer that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SegmentObserver for NoopObserver {}

/// Splits a compressed record file into converted segments
pub struct Pipeline<C> {
    config: Config,
    converter: C,
}

impl<C: SegmentConverter> Pipeline<C> {
    /// Create a pipeline for `config` using `converter` per segment
    pub fn new(config: Config, converter: C) -> Self {
        Self { config, converter }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run to completion
    pub fn run(&self) -> Result<RunStats, PipelineError> {
        self.run_with_observer(&mut NoopObserver)
    }

    /// Run to completion, reporting segment events to `observer`
    ///
    /// On failure the returned error names the segment in flight and carries
    /// the statistics gathered so far. Artifacts of earlier segments are left
    /// in place; the failing segment's intermediate file is kept for
    /// inspection.
    pub fn run_with_observer(
        &self,
        observer: &mut dyn SegmentObserver,
    ) -> Result<RunStats, PipelineError> {
        let started = Instant::now();
        let mut stats = RunStats::default();

        log::info!("Reading and processing {}", self.config.input.display());

        let stream = match open_source(&self.config.input, &self.config.decompression) {
            Ok(stream) => stream,
            Err(e) => return Err(fail(None, stats, started, e)),
        };
        let compressed_read = stream.progress_handle();
        let mut reader = RecordReader::new(
            stream,
            self.config.read_buffer_size,
            self.config.max_record_size,
        );
        let writer = SegmentWriter::new(self.config.segment_threshold)
            .with_buffer_size(self.config.write_buffer_size);

        let mut number = 1u32;
        loop {
            let paths = self.config.segment_paths(number);
            observer.segment_started(number);

            let outcome = match writer.write(&mut reader, &paths.intermediate) {
                Ok(outcome) => outcome,
                Err(failure) => {
                    stats.record_partial(&failure.report);
                    return Err(fail(Some(number), stats, started, failure.error));
                }
            };

            if outcome.is_empty() {
                discard_empty(&paths);
                if stats.segments == 0 {
                    return Err(fail(Some(number), stats, started, Error::NoData));
                }
            } else {
                stats.record_segment(&outcome.report);
                log_segment(number, &outcome.report, &stats, started);
                observer.segment_written(
                    number,
                    &outcome.report,
                    compressed_read.load(std::sync::atomic::Ordering::Relaxed),
                );

                log::info!("Converting part {number} to Parquet format...");
                let artifact = match self
                    .converter
                    .convert(&paths.intermediate, &paths.output_base)
                {
                    Ok(artifact) => artifact,
                    Err(e) => return Err(fail(Some(number), stats, started, e)),
                };
                observer.segment_converted(number, &artifact);
                stats.record_artifact(artifact);

                if let Err(e) = fs::remove_file(&paths.intermediate) {
                    log::warn!(
                        "Failed to remove intermediate file {}: {e}",
                        paths.intermediate.display()
                    );
                }
            }

            match outcome.status {
                SegmentStatus::ThresholdReached => number += 1,
                SegmentStatus::EndOfInput => {
                    log::info!("Reached end of input file");
                    break;
                }
            }
        }

        stats.finish(started);
        log::info!("Processing complete");
        log::info!("{stats}");
        Ok(stats)
    }
}

fn fail(segment: Option<u32>, mut stats: RunStats, started: Instant, error: Error) -> PipelineError {
    stats.finish(started);
    PipelineError::new(segment, stats, error)
}

/// Remove the file created for a segment that received no records
fn discard_empty(paths: &SegmentPaths) {
    if let Err(e) = fs::remove_file(&paths.intermediate) {
        log::debug!(
            "Could not remove empty segment file {}: {e}",
            paths.intermediate.display()
        );
    }
}

fn log_segment(number: u32, report: &SegmentReport, stats: &RunStats, started: Instant) {
    log::info!(
        "Part {}: processed {} lines, {:.2} MB/s, {:.2} MB written",
        number,
        report.records_written,
        stats.throughput_mb_per_sec(started.elapsed()),
        report.bytes_written as f64 / (1024.0 * 1024.0)
    );
}
