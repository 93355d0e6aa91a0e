use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

struct DefaultArgs;

impl DefaultArgs {
    pub const DIR: &'static str = ".";
}

/// Fan work out to concurrent workers and collect every result in one place.
#[derive(Clone, Parser)]
#[command(name = "fanjob")]
#[command(about = "Search files or fetch pages concurrently; results and errors are collected into one report.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Clone, Subcommand)]
pub enum Commands {
    /// Search every file in DIR for TERM (one job per file).
    Grep {
        /// Substring to look for.
        #[arg(value_name = "TERM")]
        term: String,

        /// Directory whose files are searched. Default: current directory.
        #[arg(value_name = "DIR", default_value = DefaultArgs::DIR)]
        dir: PathBuf,

        /// Descend into subdirectories.
        #[arg(long, short = 'r')]
        recursive: bool,

        /// Exclude patterns (glob syntax). Can specify multiple: -e pattern1 pattern2 pattern3
        #[arg(long, short = 'e', num_args = 1..)]
        exclude: Vec<String>,
    },
    /// GET every URL and keep the bodies of 200 responses (one job per URL).
    Fetch {
        /// URLs to fetch.
        #[arg(value_name = "URL", required = true, num_args = 1..)]
        urls: Vec<String>,
    },
}

/// Flags shared by every subcommand. Unset flags fall back to `.fanjob.toml`, then defaults.
#[derive(Clone, Args)]
pub struct CommonArgs {
    /// Worker pool size. Default: derived from CPU count and FD limit.
    #[arg(long, short = 'w', global = true)]
    pub workers: Option<usize>,

    /// Spawn one thread per item instead of using a fixed pool.
    #[arg(long, global = true, num_args = 0..=1, require_equals = true, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub per_item: Option<bool>,

    /// Print results as JSON.
    #[arg(long, global = true, num_args = 0..=1, require_equals = true, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub json: Option<bool>,

    /// Verbose output (debug logs and progress bar).
    #[arg(long, short = 'v', global = true, num_args = 0..=1, require_equals = true, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}
