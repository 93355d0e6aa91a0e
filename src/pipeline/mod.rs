//! Pipeline components: tracker, conduit, workers, collector and the coordinator that sequences them.

pub mod collector;
pub mod context;
pub mod dispatch;
pub mod orchestrator;
pub mod tracker;
pub mod worker;

pub use collector::{collector_loop, spawn_collector};
pub use context::{Conduit, DispatchMode, JobOpts, ProgressFn};
pub use dispatch::{Launched, launch};
pub use orchestrator::{CoordinatorState, run_jobs, run_jobs_with};
pub use tracker::{CompletionGuard, CompletionTracker};
pub use worker::{Processor, process_item};
