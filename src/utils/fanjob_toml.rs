//! Load `.fanjob.toml` from a directory (CLI only). The library never reads it; callers pass
//! [`JobOpts`](crate::JobOpts) and a capacity policy directly.

use serde::Deserialize;
use std::path::Path;

use crate::Opts;
use crate::utils::config::PackagePaths;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FanjobToml {
    #[serde(default)]
    settings: Settings,
}

#[derive(Debug, Default, Deserialize)]
struct Settings {
    workers: Option<usize>,
    per_item: Option<bool>,
    verbose: Option<bool>,
    json: Option<bool>,
    small_max: Option<usize>,
    medium_max: Option<usize>,
    small_cap: Option<usize>,
    medium_cap: Option<usize>,
    large_cap: Option<usize>,
}

/// Load `.fanjob.toml` from `dir` if present. Returns None if file missing or unreadable.
pub(crate) fn load_fanjob_toml(dir: &Path) -> Option<FanjobToml> {
    let path = dir.join(PackagePaths::get().config_filename());
    let s = std::fs::read_to_string(&path).ok()?;
    parse_fanjob_toml(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

pub(crate) fn parse_fanjob_toml(s: &str) -> Result<FanjobToml, toml::de::Error> {
    toml::from_str(s)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($src:expr, $opts:expr, $src_field:ident => $($opts_field:ident).+) => {
        if let Some(v) = $src.$src_field {
            $opts.$($opts_field).+ = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before applying CLI flags.
pub(crate) fn apply_file_to_opts(file: &FanjobToml, opts: &mut Opts) {
    let s = &file.settings;
    if s.workers.is_some() {
        opts.workers = s.workers;
    }
    apply_file_opt!(s, opts, per_item => per_item);
    apply_file_opt!(s, opts, verbose => verbose);
    apply_file_opt!(s, opts, json => json);
    apply_file_opt!(s, opts, small_max => capacity.small_max);
    apply_file_opt!(s, opts, medium_max => capacity.medium_max);
    apply_file_opt!(s, opts, small_cap => capacity.small_cap);
    apply_file_opt!(s, opts, medium_cap => capacity.medium_cap);
    apply_file_opt!(s, opts, large_cap => capacity.large_cap);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CapacityPolicy;

    #[test]
    fn empty_file_leaves_defaults() {
        let file = parse_fanjob_toml("").unwrap();
        let mut opts = Opts::default();
        apply_file_to_opts(&file, &mut opts);
        assert_eq!(opts.workers, None);
        assert!(!opts.per_item);
        assert_eq!(opts.capacity, crate::ThresholdPolicy::default());
    }

    #[test]
    fn settings_override_opts_and_tiers() {
        let file = parse_fanjob_toml(
            "[settings]\nworkers = 3\nper_item = true\nsmall_max = 10\nsmall_cap = 2\nlarge_cap = 64\n",
        )
        .unwrap();
        let mut opts = Opts::default();
        apply_file_to_opts(&file, &mut opts);
        assert_eq!(opts.workers, Some(3));
        assert!(opts.per_item);
        assert_eq!(opts.capacity.capacity(10), 2);
        assert_eq!(opts.capacity.capacity(11), 10);
        assert_eq!(opts.capacity.capacity(5000), 64);
    }

    #[test]
    fn load_reads_file_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".fanjob.toml"),
            "[settings]\njson = true\n",
        )
        .unwrap();
        let file = load_fanjob_toml(dir.path()).unwrap();
        let mut opts = Opts::default();
        apply_file_to_opts(&file, &mut opts);
        assert!(opts.json);
    }

    #[test]
    fn load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_fanjob_toml(dir.path()).is_none());
    }
}
