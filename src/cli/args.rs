//! Command-line argument definitions

use clap::Args;

/// Arguments for the parse command
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Full ffmpeg command line to parse (quote the whole string)
    pub command: String,

    /// Print the reconstructed graph as JSON instead of a normalized command
    #[arg(long)]
    pub json: bool,

    /// Pass through options that are not in the built-in catalogue
    #[arg(long)]
    pub no_validate: bool,
}

/// Arguments for the probe command
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Media file to probe
    pub input: String,

    /// Print compact JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,

    /// Kill ffprobe after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Full ffmpeg command line to parse and execute
    pub command: String,

    /// Overwrite existing output files
    #[arg(short = 'y', long)]
    pub overwrite: bool,

    /// Suppress ffmpeg's banner and non-error output
    #[arg(long)]
    pub quiet: bool,

    /// Kill ffmpeg after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Pass through options that are not in the built-in catalogue
    #[arg(long)]
    pub no_validate: bool,
}
