//! File search: list files under a directory and scan each one for a term, one job per file.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::tools::should_search;
use crate::capacity::CapacityPolicy;
use crate::{ItemError, JobOpts, ResultSink, run_jobs_with};

/// One matching line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Match {
    pub file: String,
    /// 1-based.
    pub line_number: usize,
    pub text: String,
}

/// Regular files directly under `dir` (or the whole tree when `recursive`), minus OS-hidden files
/// and `exclude` globs. Sorted for stable dispatch.
pub fn list_files(dir: &Path, recursive: bool, exclude: &[String]) -> Result<Vec<PathBuf>> {
    let mut walker = WalkDir::new(dir).min_depth(1);
    if !recursive {
        walker = walker.max_depth(1);
    }
    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.with_context(|| format!("walk {}", dir.display()))?;
        if entry.file_type().is_file() && should_search(entry.path(), exclude) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Scan `path` line by line and return every line containing `term`.
pub fn scan_by_line(path: &Path, term: &str) -> Result<Vec<Match>> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let key = path.display().to_string();
    let mut matches = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("read {} line {}", path.display(), idx + 1))?;
        if line.contains(term) {
            matches.push(Match {
                file: key.clone(),
                line_number: idx + 1,
                text: line,
            });
        }
    }
    Ok(matches)
}

/// Search every file in `files` for `term` concurrently. Unreadable files land in the error log.
pub fn search_files<C>(
    files: Vec<PathBuf>,
    term: &str,
    capacity_policy: &C,
    opts: JobOpts,
) -> crate::Result<ResultSink<Vec<Match>>>
where
    C: CapacityPolicy + ?Sized,
{
    let term = term.to_string();
    let processor = move |path: &PathBuf| -> Result<Vec<Match>, ItemError> {
        scan_by_line(path, &term).map_err(ItemError::from)
    };
    run_jobs_with(files, processor, capacity_policy, opts)
}

/// Flatten a search sink into matches ordered by file then line.
pub fn sorted_matches(sink: &ResultSink<Vec<Match>>) -> Vec<&Match> {
    let mut all: Vec<&Match> = sink.success().values().flatten().collect();
    all.sort_by(|a, b| (&a.file, a.line_number).cmp(&(&b.file, b.line_number)));
    all
}
