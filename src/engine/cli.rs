//! CLI command handler: build options, run the selected job kind, print the collected results.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::Serialize;
use std::path::Path;

use crate::engine::arg_parser::{Cli, Commands, CommonArgs};
use crate::engine::fetch::{build_client, fetch_urls};
use crate::engine::progress::{ProgressBar, collected_callback, create_progress_bar, finish_bar};
use crate::engine::search::{list_files, search_files, sorted_matches};
use crate::engine::tools::truncate_line;
use crate::utils::config::MAX_PRINTED_LINE_LEN;
use crate::utils::fanjob_toml::{apply_file_to_opts, load_fanjob_toml};
use crate::utils::{Colors, setup_logging};
use crate::{JobOpts, Opts, ResultSink, default_pool_size};

/// Defaults, then `.fanjob.toml` in the working directory, then flags.
pub fn build_opts(common: &CommonArgs, config_dir: &Path) -> Opts {
    let mut opts = Opts::default();
    if let Some(file) = load_fanjob_toml(config_dir) {
        apply_file_to_opts(&file, &mut opts);
    }
    if common.workers.is_some() {
        opts.workers = common.workers;
    }
    if let Some(v) = common.per_item {
        opts.per_item = v;
    }
    if let Some(v) = common.json {
        opts.json = v;
    }
    if let Some(v) = common.verbose {
        opts.verbose = v;
    }
    opts
}

/// Translate CLI options into run options, with a progress bar when verbose.
pub fn job_opts(opts: &Opts, total: usize) -> (JobOpts, Option<ProgressBar>) {
    let mut job = if opts.per_item {
        JobOpts::default()
    } else {
        JobOpts::pooled(opts.workers.unwrap_or_else(default_pool_size))
    };
    let bar = (opts.verbose && total > 0).then(|| create_progress_bar(total, "Collecting"));
    job.on_collected = bar.as_ref().map(|b| collected_callback(b, total));
    debug!("{:?}", job);
    (job, bar)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value).context("serialize results")?;
    println!("{s}");
    Ok(())
}

fn report_errors<V>(sink: &ResultSink<V>) {
    for (key, err) in sink.errors() {
        warn!("{}: {}", key, err);
    }
}

fn run_grep(
    opts: &Opts,
    term: &str,
    dir: &Path,
    recursive: bool,
    exclude: &[String],
) -> Result<()> {
    let files = list_files(dir, recursive, exclude)?;
    info!("Searching {} files for {:?}", files.len(), term);
    let total = files.len();
    let (job, bar) = job_opts(opts, total);
    let sink = search_files(files, term, &opts.capacity, job)?;
    if let Some(bar) = &bar {
        finish_bar(bar, total);
    }

    if opts.json {
        return print_json(&sink);
    }
    report_errors(&sink);
    for m in sorted_matches(&sink) {
        println!(
            "{}:{}: {}",
            Colors::colorize(Colors::KEY, &m.file),
            Colors::colorize(Colors::OK, &m.line_number.to_string()),
            truncate_line(&m.text, MAX_PRINTED_LINE_LEN)
        );
    }
    info!(
        "{} files searched, {} with matches, {} errors",
        sink.outcomes_received(),
        sink.success().values().filter(|v| !v.is_empty()).count(),
        sink.errors().len()
    );
    Ok(())
}

fn run_fetch(opts: &Opts, urls: &[String]) -> Result<()> {
    let client = build_client()?;
    let total = urls.len();
    let (job, bar) = job_opts(opts, total);
    let sink = fetch_urls(urls.to_vec(), client, &opts.capacity, job)?;
    if let Some(bar) = &bar {
        finish_bar(bar, total);
    }

    if opts.json {
        return print_json(&sink);
    }
    report_errors(&sink);
    let mut fetched: Vec<_> = sink.success().iter().collect();
    fetched.sort_by(|a, b| a.0.cmp(b.0));
    for (url, body) in fetched {
        println!(
            "{} {}",
            Colors::colorize(Colors::KEY, url),
            Colors::colorize(Colors::OK, &format!("({} bytes)", body.len()))
        );
    }
    if !sink.errors().is_empty() {
        info!(
            "{}",
            Colors::colorize(Colors::ERROR, &format!("{} failed", sink.errors().len()))
        );
    }
    Ok(())
}

/// Run the selected subcommand. Item failures are reported, not returned; only run-level errors fail.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("read current directory")?;
    let opts = build_opts(&cli.common, &cwd);
    setup_logging(opts.verbose);
    match &cli.command {
        Commands::Grep {
            term,
            dir,
            recursive,
            exclude,
        } => run_grep(&opts, term, dir, *recursive, exclude),
        Commands::Fetch { urls } => run_fetch(&opts, urls),
    }
}
