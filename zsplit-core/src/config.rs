//! Run configuration

use crate::decompress::{Codec, DecompressionConfig};
use crate::error::{Error, Result};
use crate::segment::SegmentPaths;
use std::path::{Path, PathBuf};

/// Default configuration constants
pub mod defaults {
    /// Segment size threshold in bytes (8GB)
    pub const SEGMENT_THRESHOLD: u64 = 8 * 1024 * 1024 * 1024;

    /// Read buffer in front of the record splitter (512MB)
    pub const READ_BUFFER_SIZE: usize = 512 * 1024 * 1024;

    /// Largest single record accepted (512MB)
    pub const MAX_RECORD_SIZE: usize = 512 * 1024 * 1024;

    /// Write buffer for intermediate segment files (64MB)
    pub const WRITE_BUFFER_SIZE: usize = 64 * 1024 * 1024;

    /// Prefix for output files
    pub const OUTPUT_PREFIX: &str = "output";

    /// Extension of intermediate segment files
    pub const SEGMENT_EXTENSION: &str = "jsonl";

    /// zstd window log accepted by the decoder (`zstd --long=31` archives)
    pub const ZSTD_WINDOW_LOG_MAX: u32 = 31;
}

/// Configuration for a splitting run
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) input: PathBuf,
    pub(crate) output_prefix: PathBuf,
    pub(crate) segment_threshold: u64,
    pub(crate) read_buffer_size: usize,
    pub(crate) max_record_size: usize,
    pub(crate) write_buffer_size: usize,
    pub(crate) segment_extension: String,
    pub(crate) decompression: DecompressionConfig,
}

impl Config {
    /// Create a configuration builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output_prefix(&self) -> &Path {
        &self.output_prefix
    }

    pub fn segment_threshold(&self) -> u64 {
        self.segment_threshold
    }

    pub fn read_buffer_size(&self) -> usize {
        self.read_buffer_size
    }

    pub fn max_record_size(&self) -> usize {
        self.max_record_size
    }

    pub fn write_buffer_size(&self) -> usize {
        self.write_buffer_size
    }

    pub fn segment_extension(&self) -> &str {
        &self.segment_extension
    }

    pub fn decompression(&self) -> &DecompressionConfig {
        &self.decompression
    }

    /// File names used for segment `number`
    pub fn segment_paths(&self, number: u32) -> SegmentPaths {
        SegmentPaths::new(&self.output_prefix, number, &self.segment_extension)
    }

    /// Validate the configuration
    pub(crate) fn validate(&self) -> Result<()> {
        if self.input.as_os_str().is_empty() {
            return Err(Error::Configuration("input path is required".into()));
        }

        if self.output_prefix.as_os_str().is_empty() {
            return Err(Error::Configuration(
                "output prefix must not be empty".into(),
            ));
        }

        if self.segment_threshold == 0 {
            return Err(Error::Configuration(
                "segment threshold must be greater than 0".into(),
            ));
        }

        if self.read_buffer_size == 0 {
            return Err(Error::Configuration(
                "read buffer size must be greater than 0".into(),
            ));
        }

        if self.max_record_size == 0 {
            return Err(Error::Configuration(
                "max record size must be greater than 0".into(),
            ));
        }

        if self.write_buffer_size == 0 {
            return Err(Error::Configuration(
                "write buffer size must be greater than 0".into(),
            ));
        }

        if self.segment_extension.is_empty() || self.segment_extension.contains('/') {
            return Err(Error::Configuration(format!(
                "invalid segment extension: {:?}",
                self.segment_extension
            )));
        }

        // zstd accepts window logs in 10..=31
        if !(10..=31).contains(&self.decompression.window_log_max) {
            return Err(Error::Configuration(format!(
                "zstd window log must be between 10 and 31, got {}",
                self.decompression.window_log_max
            )));
        }

        Ok(())
    }
}

/// Fluent builder for configuration
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    input: Option<PathBuf>,
    output_prefix: Option<PathBuf>,
    segment_threshold: Option<u64>,
    read_buffer_size: Option<usize>,
    max_record_size: Option<usize>,
    write_buffer_size: Option<usize>,
    segment_extension: Option<String>,
    codec: Option<Codec>,
    window_log_max: Option<u32>,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the compressed input file
    pub fn input(mut self, path: impl Into<PathBuf>) -> Self {
        self.input = Some(path.into());
        self
    }

    /// Set the prefix used for segment and artifact file names
    pub fn output_prefix(mut self, prefix: impl Into<PathBuf>) -> Self {
        self.output_prefix = Some(prefix.into());
        self
    }

    /// Set the segment size threshold in bytes
    pub fn segment_threshold(mut self, bytes: u64) -> Self {
        self.segment_threshold = Some(bytes);
        self
    }

    /// Set the read buffer size in bytes
    pub fn read_buffer_size(mut self, bytes: usize) -> Self {
        self.read_buffer_size = Some(bytes);
        self
    }

    /// Set the maximum size of a single record in bytes
    pub fn max_record_size(mut self, bytes: usize) -> Self {
        self.max_record_size = Some(bytes);
        self
    }

    /// Set the write buffer size in bytes
    pub fn write_buffer_size(mut self, bytes: usize) -> Self {
        self.write_buffer_size = Some(bytes);
        self
    }

    /// Set the extension of intermediate segment files
    pub fn segment_extension(mut self, ext: impl Into<String>) -> Self {
        self.segment_extension = Some(ext.into());
        self
    }

    /// Set the input codec (default: detect)
    pub fn codec(mut self, codec: Codec) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Set the largest zstd window log the decoder accepts
    pub fn window_log_max(mut self, log: u32) -> Self {
        self.window_log_max = Some(log);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<Config> {
        let mut decompression = DecompressionConfig::default();
        if let Some(codec) = self.codec {
            decompression.codec = codec;
        }
        if let Some(log) = self.window_log_max {
            decompression.window_log_max = log;
        }

        let config = Config {
            input: self.input.unwrap_or_default(),
            output_prefix: self
                .output_prefix
                .unwrap_or_else(|| PathBuf::from(defaults::OUTPUT_PREFIX)),
            segment_threshold: self
                .segment_threshold
                .unwrap_or(defaults::SEGMENT_THRESHOLD),
            read_buffer_size: self.read_buffer_size.unwrap_or(defaults::READ_BUFFER_SIZE),
            max_record_size: self.max_record_size.unwrap_or(defaults::MAX_RECORD_SIZE),
            write_buffer_size: self
                .write_buffer_size
                .unwrap_or(defaults::WRITE_BUFFER_SIZE),
            segment_extension: self
                .segment_extension
                .unwrap_or_else(|| defaults::SEGMENT_EXTENSION.to_string()),
            decompression,
        };

        config.validate()?;
        Ok(config)
    }
}
