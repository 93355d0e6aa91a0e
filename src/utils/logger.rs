use colored::{ColoredString, Colorize};
use env_logger::Builder;
use log::Level;
use std::io::Write;

use crate::utils::config::PackagePaths;

/// Colours for CLI result output.
pub struct Colors;

impl Colors {
    pub const KEY: &'static str = "cyan";
    pub const OK: &'static str = "green";
    pub const ERROR: &'static str = "red";

    pub fn colorize(color: &str, text: &str) -> ColoredString {
        text.color(color)
    }
}

/// Thread tag for a log line: `worker-3`, `pool-1`, `collector`, or `main`.
fn thread_tag(pkg: &str) -> String {
    let current = std::thread::current();
    let name = current.name().unwrap_or("?");
    name.strip_prefix(pkg)
        .and_then(|rest| rest.strip_prefix('-'))
        .unwrap_or(name)
        .to_string()
}

fn format_line(pkg: &str, level: Level, target: &str, args: &std::fmt::Arguments<'_>) -> String {
    let tag = thread_tag(pkg).dimmed();
    let level_str = match level {
        Level::Error => "ERROR".red(),
        Level::Warn => "WARN".yellow(),
        Level::Info => return format!("[{}] {}", pkg.cyan(), args),
        Level::Debug | Level::Trace => return format!("[{} {}] {}", pkg.cyan(), tag, args),
    };
    format!(
        "[{} {} {} {}] {}",
        pkg.cyan(),
        level_str,
        tag,
        target.white(),
        args
    )
}

/// Install the crate logger: `level` for this crate (debug when verbose), warnings only for
/// dependencies. Debug, warn and error lines carry the emitting thread so worker and collector
/// activity can be told apart.
pub fn setup_logging(verbose: bool) {
    use log::LevelFilter;

    let pkg = PackagePaths::get().pkg_name();
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // try_init: tests and embedding programs may have installed a logger already
    let _ = Builder::from_default_env()
        .filter_level(LevelFilter::Warn)
        .filter_module(pkg, level)
        .format(move |buf, record| {
            writeln!(
                buf,
                "{}",
                format_line(pkg, record.level(), record.target(), record.args())
            )
        })
        .try_init();
}
