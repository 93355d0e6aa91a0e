//! Fanjob: bounded fan-out/fan-in job coordination.
//!
//! Items are handed to concurrent workers; each worker publishes exactly one [`Outcome`] on a
//! bounded conduit; a single collector thread folds them into a [`ResultSink`]. The coordinator
//! closes the conduit only after every worker has finished, then waits for the collector to drain.

pub mod capacity;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use capacity::{CapacityPolicy, ThresholdPolicy, resolve_capacity};
pub use error::JobError;
pub use pipeline::{DispatchMode, JobOpts, Processor, run_jobs, run_jobs_with};

/// Result alias used by the public fanjob API.
pub type Result<T> = std::result::Result<T, JobError>;

/// Worker count for a pooled run when the caller has no preference: I/O-sized pool from rayon's
/// thread count, capped so pooled workers stay under the process FD limit.
pub fn default_pool_size() -> usize {
    let n = utils::config::WorkerLimits::current().io_pool_size();
    match utils::fd_limit::max_workers_by_fd_limit() {
        Some(cap) if cap < n => {
            log::debug!("Capping pool {} -> {} (FD limit ~80%)", n, cap);
            cap
        }
        _ => n,
    }
}
