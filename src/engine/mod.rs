//! Engine module: the concrete job kinds (file search, page fetch) and CLI plumbing

pub mod arg_parser;
pub mod cli;
pub mod fetch;
pub mod progress;
pub mod search;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::{Cli, Commands, CommonArgs};
pub use cli::handle_run;
pub use fetch::{build_client, fetch_body, fetch_urls};
pub use search::{Match, list_files, scan_by_line, search_files, sorted_matches};
pub use tools::{glob_match, is_os_hidden_file, should_search, truncate_line};
