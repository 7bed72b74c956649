//! zsplit command-line entry point

use clap::Parser;
use zsplit_cli::commands::Commands;
use zsplit_cli::CliResult;

/// Split compressed line-delimited dumps into size-bounded Parquet parts
#[derive(Debug, Parser)]
#[command(name = "zsplit", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> CliResult<()> {
    Cli::parse().command.execute()
}
