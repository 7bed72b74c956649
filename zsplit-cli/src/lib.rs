//! zsplit CLI library
//!
//! This library provides the command-line interface for splitting large
//! compressed record dumps into size-bounded, converted parts.

pub mod commands;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod progress;

pub use error::{CliError, CliResult};
