//! Split command implementation

use crate::config::CliConfig;
use crate::error::CliError;
use crate::input::InputFile;
use crate::output::{JsonFormatter, OutputFormatter, TextFormatter};
use crate::progress::ProgressReporter;
use anyhow::{Context, Result};
use clap::Args;
use std::io;
use std::path::PathBuf;
use zsplit_core::{Codec, Config, Pipeline, ScriptConverter};

const MIB: u64 = 1024 * 1024;

/// Arguments for the split command
#[derive(Debug, Args)]
pub struct SplitArgs {
    /// Compressed input file (.zst or .gz)
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Prefix for segment and artifact files [default: output]
    #[arg(short, long, value_name = "PREFIX")]
    pub output: Option<PathBuf>,

    /// Configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Input codec
    #[arg(long, value_enum)]
    pub codec: Option<CodecArg>,

    /// Segment size threshold in MiB
    #[arg(long, value_name = "MB", conflicts_with = "segment_bytes")]
    pub segment_mb: Option<u64>,

    /// Segment size threshold in bytes
    #[arg(long, value_name = "BYTES")]
    pub segment_bytes: Option<u64>,

    /// Read buffer size in MiB
    #[arg(long, value_name = "MB", conflicts_with = "buffer_bytes")]
    pub buffer_mb: Option<u64>,

    /// Read buffer size in bytes
    #[arg(long, value_name = "BYTES")]
    pub buffer_bytes: Option<u64>,

    /// Largest accepted record in MiB
    #[arg(long, value_name = "MB", conflicts_with = "max_record_bytes")]
    pub max_record_mb: Option<u64>,

    /// Largest accepted record in bytes
    #[arg(long, value_name = "BYTES")]
    pub max_record_bytes: Option<u64>,

    /// Program that runs the converter
    #[arg(long, value_name = "PROGRAM", env = "ZSPLIT_CONVERTER_PROGRAM")]
    pub converter_program: Option<String>,

    /// Converter script passed to the program
    #[arg(long, value_name = "FILE", env = "ZSPLIT_CONVERTER_SCRIPT")]
    pub converter_script: Option<PathBuf>,

    /// Output format of the final report
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Supported report formats
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable statistics
    Text,
    /// JSON run summary
    Json,
}

/// Codec selection on the command line
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CodecArg {
    /// Detect from the frame magic
    Auto,
    /// Zstandard
    Zstd,
    /// Gzip
    Gzip,
}

impl From<CodecArg> for Codec {
    fn from(arg: CodecArg) -> Self {
        match arg {
            CodecArg::Auto => Codec::Auto,
            CodecArg::Zstd => Codec::Zstd,
            CodecArg::Gzip => Codec::Gzip,
        }
    }
}

impl SplitArgs {
    /// Execute the split command
    pub fn execute(&self) -> Result<()> {
        // Initialize logging based on verbosity
        self.init_logging();

        log::info!("Starting split");
        log::debug!("Arguments: {:?}", self);

        let input = InputFile::resolve(&self.input)?;
        let file_config = self.load_config()?;
        let config = self.build_config(&file_config, &input)?;
        let converter =
            ScriptConverter::new(self.converter_config(&file_config)).map_err(config_error)?;

        log::info!("Input file: {}", config.input().display());
        log::info!("Output prefix: {}", config.output_prefix().display());

        let mut reporter = ProgressReporter::new(self.quiet);
        reporter.init_input(input.size());

        let mut formatter: Box<dyn OutputFormatter> = match self.format {
            OutputFormat::Text => Box::new(TextFormatter::stdout()),
            OutputFormat::Json => Box::new(JsonFormatter::new(io::stdout())),
        };

        match Pipeline::new(config, converter).run_with_observer(&mut reporter) {
            Ok(stats) => {
                reporter.finish();
                formatter.format_success(input.path(), &stats)?;
                formatter.finish()?;
                log::info!("All done");
                Ok(())
            }
            Err(e) => {
                reporter.abandon();
                formatter.format_failure(input.path(), &e)?;
                formatter.finish()?;
                Err(CliError::ProcessingError(e.to_string()).into())
            }
        }
    }

    /// Initialize logging based on verbosity level
    fn init_logging(&self) {
        let log_level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        if !self.quiet {
            // A logger may already be installed when run from tests
            let _ = env_logger::Builder::from_env(
                env_logger::Env::default().default_filter_or(log_level),
            )
            .try_init();
        }
    }

    fn load_config(&self) -> Result<CliConfig> {
        match &self.config {
            Some(path) => CliConfig::from_file(path),
            None => Ok(CliConfig::default()),
        }
    }

    /// Merge the configuration file with command-line overrides
    fn build_config(&self, file_config: &CliConfig, input: &InputFile) -> Result<Config> {
        let mut builder = file_config.builder()?.input(input.path());

        if let Some(prefix) = &self.output {
            builder = builder.output_prefix(prefix);
        }
        if let Some(codec) = self.codec {
            builder = builder.codec(codec.into());
        }
        if let Some(bytes) = size_override(self.segment_mb, self.segment_bytes)? {
            builder = builder.segment_threshold(bytes);
        }
        if let Some(bytes) = size_override(self.buffer_mb, self.buffer_bytes)? {
            builder = builder.read_buffer_size(to_usize(bytes)?);
        }
        if let Some(bytes) = size_override(self.max_record_mb, self.max_record_bytes)? {
            builder = builder.max_record_size(to_usize(bytes)?);
        }

        Ok(builder.build().map_err(config_error)?)
    }

    fn converter_config(&self, file_config: &CliConfig) -> zsplit_core::ConverterConfig {
        let mut config = file_config.converter_config();
        if let Some(program) = &self.converter_program {
            config.program = program.clone();
        }
        if let Some(script) = &self.converter_script {
            config.script = Some(script.clone());
        }
        config
    }
}

fn config_error(error: zsplit_core::Error) -> CliError {
    match error {
        zsplit_core::Error::Configuration(msg) => CliError::ConfigError(msg),
        other => CliError::ConfigError(other.to_string()),
    }
}

/// Byte value from either a MiB or a raw byte flag
fn size_override(mb: Option<u64>, bytes: Option<u64>) -> Result<Option<u64>> {
    match (mb, bytes) {
        (_, Some(bytes)) => Ok(Some(bytes)),
        (Some(mb), None) => mb
            .checked_mul(MIB)
            .map(Some)
            .with_context(|| format!("{mb} MB does not fit in 64 bits")),
        (None, None) => Ok(None),
    }
}

fn to_usize(bytes: u64) -> Result<usize> {
    usize::try_from(bytes).with_context(|| format!("{bytes} bytes exceeds the address space"))
}
