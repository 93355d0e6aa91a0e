//! Coordinator: start the collector, launch workers, wait for them, close the conduit, drain.

use log::{debug, error};
use std::sync::Arc;

use super::collector::spawn_collector;
use super::context::{Conduit, DispatchMode, JobOpts};
use super::dispatch::{Launched, launch};
use super::tracker::CompletionTracker;
use super::worker::Processor;
use crate::capacity::{CapacityPolicy, resolve_capacity};
use crate::error::{JobError, Result};
use crate::{ResultSink, WorkItem};

/// Coordinator phases, in order. Each run walks them front to back exactly once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    CollectorStarted,
    WorkersLaunching,
    WorkersRunning,
    AllWorkersDone,
    ConduitClosed,
    CollectorDrained,
    Done,
}

impl CoordinatorState {
    pub fn next(self) -> Self {
        use CoordinatorState::*;
        match self {
            Idle => CollectorStarted,
            CollectorStarted => WorkersLaunching,
            WorkersLaunching => WorkersRunning,
            WorkersRunning => AllWorkersDone,
            AllWorkersDone => ConduitClosed,
            ConduitClosed => CollectorDrained,
            CollectorDrained | Done => Done,
        }
    }
}

fn advance(state: &mut CoordinatorState) {
    let next = state.next();
    debug!("coordinator: {:?} -> {:?}", state, next);
    *state = next;
}

/// Process every item concurrently and collect all outcomes, with default options (one worker per item).
pub fn run_jobs<I, P, C>(items: Vec<I>, processor: P, capacity_policy: &C) -> Result<ResultSink<P::Value>>
where
    I: WorkItem,
    P: Processor<I>,
    C: CapacityPolicy + ?Sized,
{
    run_jobs_with(items, processor, capacity_policy, JobOpts::default())
}

/// Process every item concurrently and collect all outcomes.
///
/// Item failures land in the sink's error log. `Err` is returned only for run-level defects: a
/// capacity policy that yields 0 for a non-empty batch, a zero-sized pool, a thread that could not be
/// spawned, or a worker or collector thread that panicked outside item processing. Configuration
/// errors are raised before any thread starts.
pub fn run_jobs_with<I, P, C>(
    items: Vec<I>,
    processor: P,
    capacity_policy: &C,
    opts: JobOpts,
) -> Result<ResultSink<P::Value>>
where
    I: WorkItem,
    P: Processor<I>,
    C: CapacityPolicy + ?Sized,
{
    let item_count = items.len();
    let capacity = resolve_capacity(capacity_policy, item_count)?;
    if item_count == 0 {
        debug!("coordinator: no items, nothing to dispatch");
        return Ok(ResultSink::new());
    }
    if opts.dispatch == DispatchMode::Pooled(0) {
        return Err(JobError::InvalidWorkers { item_count });
    }

    let mut state = CoordinatorState::Idle;
    let (conduit, outcome_rx) = Conduit::open(capacity);
    debug!(
        "coordinator: {} items, conduit capacity {}, {:?}",
        item_count,
        conduit.capacity(),
        opts.dispatch
    );
    let collector = spawn_collector(outcome_rx, opts.on_collected)
        .map_err(|source| JobError::Spawn {
            role: "collector",
            source,
        })?;
    advance(&mut state);

    let tracker = Arc::new(CompletionTracker::new());
    advance(&mut state);
    let Launched {
        handles,
        spawn_error,
    } = launch(
        items,
        Arc::new(processor),
        &conduit,
        &tracker,
        opts.dispatch,
    );
    advance(&mut state);

    tracker.wait_idle();
    advance(&mut state);

    conduit.close(&tracker)?;
    advance(&mut state);

    let sink = collector.join().map_err(|_| JobError::CollectorPanicked)?;
    advance(&mut state);

    let panicked = handles.into_iter().map(|h| h.join()).filter(|r| r.is_err()).count();
    if let Some(e) = spawn_error {
        return Err(e);
    }
    if panicked > 0 {
        error!("coordinator: {} worker thread(s) panicked", panicked);
        return Err(JobError::WorkerPanicked { count: panicked });
    }
    advance(&mut state);
    debug_assert_eq!(state, CoordinatorState::Done);
    debug!(
        "coordinator: {} items, {} successes, {} errors",
        item_count,
        sink.success().len(),
        sink.errors().len()
    );
    Ok(sink)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_advance_in_order_and_stop_at_done() {
        let mut s = CoordinatorState::Idle;
        let mut seen = vec![s];
        while s != CoordinatorState::Done {
            s = s.next();
            seen.push(s);
        }
        assert_eq!(seen.len(), 8);
        assert_eq!(CoordinatorState::Done.next(), CoordinatorState::Done);
    }
}
