use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "shrinkcast")]
#[command(author, version, about = "Shrink videos to low-rate HEVC/Opus with live progress")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a file and transcode it to fit the target limits
    Run {
        /// Input file to transcode
        #[arg(required = true)]
        input: PathBuf,

        /// Output file (defaults to the input name with an .mp4 extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Analyze a file and show which parameters would change
    Plan {
        /// Input file to analyze
        #[arg(required = true)]
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Probe a media file and display its stream properties
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that required external tools are available
    CheckTools,
}
