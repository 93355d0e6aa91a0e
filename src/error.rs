//! Run-level errors. Item failures never show up here; they live in the sink's error log.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobError {
    /// Capacity policy produced an unusable conduit size for a non-empty batch.
    #[error("capacity policy returned {capacity} for {item_count} items; a non-empty run needs capacity >= 1")]
    Configuration { item_count: usize, capacity: usize },

    /// Pooled dispatch was asked for zero workers.
    #[error("pooled dispatch needs at least one worker (got 0) for {item_count} items")]
    InvalidWorkers { item_count: usize },

    /// Conduit close attempted while workers were still registered.
    #[error("conduit closed with {active} worker(s) still active")]
    Protocol { active: usize },

    #[error("failed to spawn {role} thread: {source}")]
    Spawn {
        role: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// Worker threads died outside the per-item panic guard; their outcomes may be missing.
    #[error("{count} worker thread(s) panicked outside item processing")]
    WorkerPanicked { count: usize },

    #[error("collector thread panicked")]
    CollectorPanicked,
}

pub type Result<T> = std::result::Result<T, JobError>;
