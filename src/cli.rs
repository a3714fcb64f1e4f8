use std::path::PathBuf;

use clap::Parser;

/// Memory-telemetry charts for concurrent data-structure benchmarks.
#[derive(Debug, Parser)]
#[command(name = "memplot", version, about)]
pub struct Cli {
    /// Print a text summary of each file instead of opening the viewer.
    #[arg(long, requires = "files")]
    pub summary: bool,

    /// Pipeline settings (JSON) to start with instead of the defaults.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// CSV exports to process. The viewer opens the first one.
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,
}
