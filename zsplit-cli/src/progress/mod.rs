//! Progress reporting module

use indicatif::{HumanBytes, ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use zsplit_core::{SegmentObserver, SegmentReport};

/// Progress bar over the compressed input, advanced at segment boundaries
pub struct ProgressReporter {
    progress_bar: Option<ProgressBar>,
    quiet: bool,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new(quiet: bool) -> Self {
        Self {
            progress_bar: None,
            quiet,
        }
    }

    /// Initialize the bar for an input of `compressed_size` bytes
    pub fn init_input(&mut self, compressed_size: u64) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new(compressed_size);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "[{elapsed_precise}] {bar:40.cyan/blue} {bytes}/{total_bytes} compressed {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("##-"),
        );
        pb.enable_steady_tick(Duration::from_millis(100));

        self.progress_bar = Some(pb);
    }

    /// Finish progress reporting
    pub fn finish(&self) {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message("Complete");
        }
    }

    /// Clear the bar after a failed run
    pub fn abandon(&self) {
        if let Some(pb) = &self.progress_bar {
            pb.abandon_with_message("Failed");
        }
    }
}

impl SegmentObserver for ProgressReporter {
    fn segment_started(&mut self, segment: u32) {
        if let Some(pb) = &self.progress_bar {
            pb.set_message(format!("writing part {segment:03}"));
        }
    }

    fn segment_written(&mut self, segment: u32, report: &SegmentReport, compressed_read: u64) {
        if let Some(pb) = &self.progress_bar {
            pb.set_position(compressed_read);
            pb.set_message(format!(
                "converting part {segment:03} ({} lines, {})",
                report.records_written,
                HumanBytes(report.bytes_written)
            ));
        }
    }

    fn segment_converted(&mut self, segment: u32, artifact: &Path) {
        if let Some(pb) = &self.progress_bar {
            pb.println(format!("part {segment:03} -> {}", artifact.display()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_reporter_has_no_bar() {
        let mut reporter = ProgressReporter::new(true);
        reporter.init_input(1024);
        assert!(reporter.progress_bar.is_none());

        // Events are ignored without a bar
        reporter.segment_started(1);
        reporter.segment_written(1, &SegmentReport::default(), 512);
        reporter.segment_converted(1, Path::new("out_part_001.parquet"));
        reporter.finish();
    }

    #[test]
    fn test_position_tracks_compressed_bytes() {
        let mut reporter = ProgressReporter::new(false);
        reporter.init_input(1024);
        reporter.segment_written(1, &SegmentReport::default(), 700);

        let pb = reporter.progress_bar.as_ref().unwrap();
        assert_eq!(pb.position(), 700);
        assert_eq!(pb.length(), Some(1024));
        reporter.finish();
    }
}
