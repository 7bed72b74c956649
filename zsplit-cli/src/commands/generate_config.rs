//! Generate config command implementation

use crate::config::CliConfig;
use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;

/// Arguments for the generate-config command
#[derive(Debug, Args)]
pub struct GenerateConfigArgs {
    /// Output file path
    #[arg(short, long, value_name = "FILE", required = true)]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

impl GenerateConfigArgs {
    /// Execute the generate-config command
    pub fn execute(&self) -> Result<()> {
        if self.output.exists() && !self.force {
            anyhow::bail!(
                "{} already exists (use --force to overwrite)",
                self.output.display()
            );
        }

        println!("Generating configuration template...");
        println!("  Output file: {}", self.output.display());

        let template = generate_template();
        fs::write(&self.output, template)
            .with_context(|| format!("Failed to write to {}", self.output.display()))?;

        println!("✓ Configuration template generated successfully!");
        println!();
        println!("Next steps:");
        println!("1. Edit the configuration file to adjust sizes and the converter");
        println!("2. Validate your configuration:");
        println!("   zsplit validate -c {}", self.output.display());
        println!("3. Use it for splitting:");
        println!(
            "   zsplit split -i RC_2023-01.zst -c {}",
            self.output.display()
        );

        Ok(())
    }
}

/// Template configuration content, populated with the library defaults
fn generate_template() -> String {
    let defaults = CliConfig::default();
    let script = defaults
        .converter
        .script
        .as_ref()
        .map(|script| script.display().to_string())
        .unwrap_or_default();

    format!(
        r#"# zsplit configuration
#
# Every table and key is optional. Command-line flags take precedence.

[input]
# "auto" detects zstd or gzip from the file header
codec = "{codec}"
# Largest zstd window accepted (log2); 31 reads `zstd --long=31` archives
window_log_max = {window_log_max}

[segments]
# Files are named <output_prefix>_part_NNN.<extension>
output_prefix = "{output_prefix}"
# A segment is closed once it holds at least this many bytes
threshold_bytes = {threshold_bytes}
write_buffer_bytes = {write_buffer_bytes}
extension = "{extension}"

[reader]
buffer_bytes = {buffer_bytes}
# Records longer than this abort the run
max_record_bytes = {max_record_bytes}

[converter]
# Invoked as: <program> <script> <segment file> <output base>
# and must create <output base>.<extension>
program = "{program}"
script = "{script}"
extension = "{artifact_extension}"
"#,
        codec = defaults.input.codec,
        window_log_max = defaults.input.window_log_max,
        output_prefix = defaults.segments.output_prefix.display(),
        threshold_bytes = defaults.segments.threshold_bytes,
        write_buffer_bytes = defaults.segments.write_buffer_bytes,
        extension = defaults.segments.extension,
        buffer_bytes = defaults.reader.buffer_bytes,
        max_record_bytes = defaults.reader.max_record_bytes,
        program = defaults.converter.program,
        script = script,
        artifact_extension = defaults.converter.extension,
    )
}
