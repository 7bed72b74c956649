//! Plain text output formatter

use super::OutputFormatter;
use anyhow::Result;
use std::io::{self, Write};
use std::path::Path;
use zsplit_core::{PipelineError, RunStats};

/// Plain text formatter - statistics block followed by the artifact list
pub struct TextFormatter<W: Write> {
    writer: W,
}

impl<W: Write> TextFormatter<W> {
    /// Create a new text formatter
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn write_stats(&mut self, stats: &RunStats) -> Result<()> {
        writeln!(self.writer)?;
        writeln!(self.writer, "{stats}")?;
        if !stats.artifacts.is_empty() {
            writeln!(self.writer, "  Artifacts:")?;
            for artifact in &stats.artifacts {
                writeln!(self.writer, "    {}", artifact.display())?;
            }
        }
        Ok(())
    }
}

impl TextFormatter<io::Stdout> {
    /// Create a formatter that writes to stdout
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> OutputFormatter for TextFormatter<W> {
    fn format_success(&mut self, _input: &Path, stats: &RunStats) -> Result<()> {
        self.write_stats(stats)
    }

    fn format_failure(&mut self, _input: &Path, error: &PipelineError) -> Result<()> {
        self.write_stats(&error.stats)
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
