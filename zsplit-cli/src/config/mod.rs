//! Configuration file support
//!
//! Every table is optional; missing keys fall back to the library defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use zsplit_core::converter::{ARTIFACT_EXTENSION, DEFAULT_PROGRAM, DEFAULT_SCRIPT};
use zsplit_core::{defaults, Codec, Config, ConfigBuilder, ConverterConfig};

/// CLI configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// Input decoding configuration
    #[serde(default)]
    pub input: InputConfig,

    /// Segment layout configuration
    #[serde(default)]
    pub segments: SegmentsConfig,

    /// Record reader configuration
    #[serde(default)]
    pub reader: ReaderConfig,

    /// External converter configuration
    #[serde(default)]
    pub converter: ConverterSection,
}

/// Input-related configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Codec name: "auto", "zstd" or "gzip"
    pub codec: String,

    /// Largest zstd window accepted, as a power of two
    pub window_log_max: u32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            codec: Codec::Auto.to_string(),
            window_log_max: defaults::ZSTD_WINDOW_LOG_MAX,
        }
    }
}

/// Segment-related configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SegmentsConfig {
    /// Prefix for segment and artifact files
    pub output_prefix: PathBuf,

    /// Close a segment once it holds at least this many bytes
    pub threshold_bytes: u64,

    /// Write buffer per segment file (bytes)
    pub write_buffer_bytes: usize,

    /// Extension of intermediate segment files
    pub extension: String,
}

impl Default for SegmentsConfig {
    fn default() -> Self {
        Self {
            output_prefix: PathBuf::from(defaults::OUTPUT_PREFIX),
            threshold_bytes: defaults::SEGMENT_THRESHOLD,
            write_buffer_bytes: defaults::WRITE_BUFFER_SIZE,
            extension: defaults::SEGMENT_EXTENSION.to_string(),
        }
    }
}

/// Reader-related configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ReaderConfig {
    /// Read buffer in front of the record splitter (bytes)
    pub buffer_bytes: usize,

    /// Largest record accepted (bytes)
    pub max_record_bytes: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            buffer_bytes: defaults::READ_BUFFER_SIZE,
            max_record_bytes: defaults::MAX_RECORD_SIZE,
        }
    }
}

/// Converter-related configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConverterSection {
    /// Program to execute
    pub program: String,

    /// Script passed to the program; omit to run the program directly
    pub script: Option<PathBuf>,

    /// Extension of the produced artifacts
    pub extension: String,
}

impl Default for ConverterSection {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            script: Some(PathBuf::from(DEFAULT_SCRIPT)),
            extension: ARTIFACT_EXTENSION.to_string(),
        }
    }
}

impl CliConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Decoded codec setting
    pub fn codec(&self) -> Result<Codec> {
        Ok(self.input.codec.parse::<Codec>()?)
    }

    /// Library configuration builder seeded from this file
    pub fn builder(&self) -> Result<ConfigBuilder> {
        Ok(Config::builder()
            .output_prefix(&self.segments.output_prefix)
            .segment_threshold(self.segments.threshold_bytes)
            .write_buffer_size(self.segments.write_buffer_bytes)
            .segment_extension(&self.segments.extension)
            .read_buffer_size(self.reader.buffer_bytes)
            .max_record_size(self.reader.max_record_bytes)
            .codec(self.codec()?)
            .window_log_max(self.input.window_log_max))
    }

    /// Converter settings from this file
    pub fn converter_config(&self) -> ConverterConfig {
        ConverterConfig {
            program: self.converter.program.clone(),
            script: self.converter.script.clone(),
            extension: self.converter.extension.clone(),
        }
    }
}
