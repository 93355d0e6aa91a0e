//! Application configuration constants.
//! Tuning and thresholds in one place.

use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    config_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                config_filename: format!(".{pkg}.toml"),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// Per-directory config file (e.g. `.fanjob.toml`).
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }
}

// ---- Conduit capacity ----

/// Default tiers for [`ThresholdPolicy`](crate::capacity::ThresholdPolicy).
/// Every non-empty item count lands in exactly one tier.
pub struct CapacityTiers;

impl CapacityTiers {
    /// Upper bound (inclusive) of the small tier.
    pub const SMALL_MAX: usize = 50;
    /// Upper bound (inclusive) of the medium tier.
    pub const MEDIUM_MAX: usize = 1000;
    /// Capacity for 1..=SMALL_MAX items.
    pub const SMALL_CAP: usize = 5;
    /// Capacity for SMALL_MAX+1..=MEDIUM_MAX items.
    pub const MEDIUM_CAP: usize = 10;
    /// Capacity above MEDIUM_MAX items.
    pub const LARGE_CAP: usize = 100;
}

// ---- Worker threads ----

/// Thread limits for pooled dispatch.
/// Use [`WorkerLimits::current()`] to fill `all_threads` from rayon; the rest are const.
#[derive(Clone, Copy, Debug)]
pub struct WorkerLimits {
    /// Available threads (from rayon); set by [`WorkerLimits::current()`].
    pub all_threads: usize,
    /// Floor for pooled workers.
    pub floor: usize,
    /// Ceiling for pooled workers on I/O-bound work (fetch, file scans).
    pub io_max: usize,
}

impl Default for WorkerLimits {
    fn default() -> Self {
        Self {
            all_threads: 0, // use current() to set from rayon
            floor: Self::FLOOR_THREADS,
            io_max: Self::IO_MAX_THREADS,
        }
    }
}

impl WorkerLimits {
    pub const FLOOR_THREADS: usize = 2;
    pub const IO_MAX_THREADS: usize = 32;

    /// Build limits with `all_threads` set from `rayon::current_num_threads()`.
    pub fn current() -> Self {
        Self {
            all_threads: rayon::current_num_threads(),
            ..Self::default()
        }
    }

    /// Default pool size for I/O-bound work: twice the cores, clamped to `[floor, io_max]`.
    pub fn io_pool_size(&self) -> usize {
        (self.all_threads * 2).clamp(self.floor, self.io_max)
    }
}

// ---- Progress ----

/// Update the progress bar every N collected outcomes (reduce lock traffic).
pub const PROGRESS_UPDATE_BATCH_SIZE: usize = 10;

// ---- Fetch ----

/// Per-request timeout for `fetch` (seconds). Applies inside the processor only; runs have no global timeout.
pub const FETCH_TIMEOUT_SECS: u64 = 30;

// ---- Output ----

/// When printing matches, cap the per-line text to this many chars.
pub const MAX_PRINTED_LINE_LEN: usize = 200;
