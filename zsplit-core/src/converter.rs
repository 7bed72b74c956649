//! Conversion of finished segments into columnar artifacts
//!
//! The converter is an external batch process. The pipeline only sees the
//! [`SegmentConverter`] trait, so tests can substitute an in-memory fake.

use crate::error::{Error, Result};
use crate::segment::with_suffix;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Default converter script, resolved against the working directory
pub const DEFAULT_SCRIPT: &str = "json_to_parquet_duckdb.sh";

/// Default interpreter for the converter script
pub const DEFAULT_PROGRAM: &str = "bash";

/// Extension of converted artifacts
pub const ARTIFACT_EXTENSION: &str = "parquet";

/// Turns one intermediate segment file into a columnar artifact
pub trait SegmentConverter {
    /// Convert `segment`, producing `<output_base>.<ext>`
    ///
    /// Returns the path of the artifact, which must exist on success.
    fn convert(&self, segment: &Path, output_base: &Path) -> Result<PathBuf>;
}

impl<C: SegmentConverter + ?Sized> SegmentConverter for &C {
    fn convert(&self, segment: &Path, output_base: &Path) -> Result<PathBuf> {
        (**self).convert(segment, output_base)
    }
}

impl<C: SegmentConverter + ?Sized> SegmentConverter for Box<C> {
    fn convert(&self, segment: &Path, output_base: &Path) -> Result<PathBuf> {
        (**self).convert(segment, output_base)
    }
}

/// Settings for [`ScriptConverter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterConfig {
    /// Program to execute
    pub program: String,
    /// Script passed as the first argument; `None` runs `program` directly
    pub script: Option<PathBuf>,
    /// Extension of the artifact the converter produces
    pub extension: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            script: Some(PathBuf::from(DEFAULT_SCRIPT)),
            extension: ARTIFACT_EXTENSION.to_string(),
        }
    }
}

/// Runs an external converter process per segment
///
/// Invocation is `<program> [script] <segment> <output base>`. Success
/// requires both a zero exit status and the artifact on disk.
#[derive(Debug, Clone)]
pub struct ScriptConverter {
    program: String,
    script: Option<PathBuf>,
    extension: String,
}

impl ScriptConverter {
    /// Create a converter, resolving a relative script against the current
    /// working directory
    pub fn new(config: ConverterConfig) -> Result<Self> {
        if config.program.is_empty() {
            return Err(Error::Configuration(
                "converter program must not be empty".into(),
            ));
        }
        if config.extension.is_empty() {
            return Err(Error::Configuration(
                "artifact extension must not be empty".into(),
            ));
        }

        let script = match config.script {
            Some(script) if script.is_relative() => {
                let cwd = std::env::current_dir().map_err(|e| {
                    Error::Configuration(format!("failed to get current working directory: {e}"))
                })?;
                Some(cwd.join(script))
            }
            other => other,
        };

        Ok(Self {
            program: config.program,
            script,
            extension: config.extension,
        })
    }

    /// Resolved script path, if any
    pub fn script(&self) -> Option<&Path> {
        self.script.as_deref()
    }

    /// Path of the artifact produced for `output_base`
    pub fn artifact_path(&self, output_base: &Path) -> PathBuf {
        with_suffix(output_base, &format!(".{}", self.extension))
    }

    fn command(&self, segment: &Path, output_base: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        if let Some(script) = &self.script {
            cmd.arg(script);
        }
        cmd.arg(segment).arg(output_base);
        cmd
    }
}

/// Join stdout and stderr into one diagnostic string
fn combined_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    match (stdout.trim_end().is_empty(), stderr.trim_end().is_empty()) {
        (_, true) => stdout.trim_end().to_string(),
        (true, false) => stderr.trim_end().to_string(),
        (false, false) => format!("{}\n{}", stdout.trim_end(), stderr.trim_end()),
    }
}

impl SegmentConverter for ScriptConverter {
    fn convert(&self, segment: &Path, output_base: &Path) -> Result<PathBuf> {
        let conversion_error = |reason: String, output: String| Error::Conversion {
            segment: segment.to_path_buf(),
            reason,
            output,
        };

        if let Some(script) = &self.script {
            if !script.is_file() {
                return Err(conversion_error(
                    format!("converter script not found at {}", script.display()),
                    String::new(),
                ));
            }
            log::info!("Using converter script: {}", script.display());
        }

        let artifact = self.artifact_path(output_base);
        log::info!(
            "Converting {} to {}",
            segment.display(),
            artifact.display()
        );

        let output = self.command(segment, output_base).output().map_err(|e| {
            conversion_error(format!("failed to run {}: {e}", self.program), String::new())
        })?;
        let diagnostics = combined_output(&output);

        if !output.status.success() {
            return Err(conversion_error(
                format!("converter exited with {}", output.status),
                diagnostics,
            ));
        }

        if !artifact.is_file() {
            return Err(conversion_error(
                format!("artifact was not created at {}", artifact.display()),
                diagnostics,
            ));
        }

        log::info!(
            "Successfully converted {} to {}",
            segment
                .file_name()
                .map(|name| name.to_string_lossy())
                .unwrap_or_default(),
            artifact.display()
        );
        if !diagnostics.is_empty() {
            log::info!("Converter output: {diagnostics}");
        }
        Ok(artifact)
    }
}
