//! Fanjob CLI: search files or fetch pages concurrently and report every result and error.

use anyhow::Result;
use clap::Parser;
use fanjob::engine::arg_parser::Cli;
use fanjob::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
