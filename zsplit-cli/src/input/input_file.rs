//! Input file checks performed before a run starts

use crate::error::CliError;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// A compressed input file that exists and is a regular file
#[derive(Debug, Clone)]
pub struct InputFile {
    path: PathBuf,
    size: u64,
}

impl InputFile {
    /// Resolve `path`, failing with [`CliError::FileNotFound`] if it is missing
    pub fn resolve(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CliError::FileNotFound(path.display().to_string()).into());
        }

        let metadata = fs::metadata(path)
            .with_context(|| format!("Failed to get metadata for: {}", path.display()))?;
        if !metadata.is_file() {
            let reason = format!("{} (not a regular file)", path.display());
            return Err(CliError::FileNotFound(reason).into());
        }

        Ok(Self {
            path: path.to_path_buf(),
            size: metadata.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Compressed size in bytes
    pub fn size(&self) -> u64 {
        self.size
    }
}
