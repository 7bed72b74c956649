//! Output formatting module

use anyhow::Result;
use std::path::Path;
use zsplit_core::{PipelineError, RunStats};

/// Trait for run report formatters
pub trait OutputFormatter {
    /// Report a completed run
    fn format_success(&mut self, input: &Path, stats: &RunStats) -> Result<()>;

    /// Report a failed run with the statistics gathered before the failure
    fn format_failure(&mut self, input: &Path, error: &PipelineError) -> Result<()>;

    /// Finalize output
    fn finish(&mut self) -> Result<()>;
}

pub mod json;
pub mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;
