//! Validate command implementation

use crate::config::CliConfig;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use zsplit_core::ScriptConverter;

/// Arguments for the validate command
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short = 'c', long, value_name = "FILE", required = true)]
    pub config: PathBuf,
}

impl ValidateArgs {
    /// Execute the validate command
    pub fn execute(&self) -> Result<()> {
        println!("Validating configuration: {}", self.config.display());

        match check(&self.config) {
            Ok(config) => {
                println!("✓ Configuration is valid!");
                println!("  Output prefix: {}", config.segments.output_prefix.display());
                println!("  Segment threshold: {} bytes", config.segments.threshold_bytes);
                println!("  Converter: {}", config.converter.program);
                if let Some(script) = &config.converter.script {
                    if !script.is_file() {
                        println!(
                            "  Warning: converter script {} not found from the current directory",
                            script.display()
                        );
                    }
                }
                Ok(())
            }
            Err(e) => {
                println!("✗ Configuration is invalid!");
                println!("  Error: {e:#}");
                Err(anyhow::anyhow!("Validation failed: {e:#}"))
            }
        }
    }
}

/// Parse the file and run the same validation a split would
fn check(path: &std::path::Path) -> Result<CliConfig> {
    let config = CliConfig::from_file(path)?;
    // The input is supplied per run; any non-empty path satisfies validation
    config.builder()?.input("input.zst").build()?;
    ScriptConverter::new(config.converter_config())?;
    Ok(config)
}
