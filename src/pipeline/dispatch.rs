//! Dispatcher: launch workers for every item, registering each with the tracker before it starts.

use crossbeam_channel::{Sender, unbounded};
use log::debug;
use std::sync::Arc;
use std::thread::JoinHandle;

use super::context::{Conduit, DispatchMode};
use super::tracker::CompletionTracker;
use super::worker::{Processor, spawn_item_worker, spawn_pool_worker};
use crate::error::JobError;
use crate::{Outcome, WorkItem};

/// Handles of launched workers plus the first launch failure, if any.
///
/// A launch failure is held until the already-running workers have been drained, so the
/// coordinator can still close the conduit safely.
pub struct Launched {
    pub handles: Vec<JoinHandle<()>>,
    pub spawn_error: Option<JobError>,
}

fn spawn_error(role: &'static str, source: std::io::Error) -> JobError {
    JobError::Spawn { role, source }
}

/// Launch workers for `items` according to `mode`.
pub fn launch<I, P>(
    items: Vec<I>,
    processor: Arc<P>,
    conduit: &Conduit<Outcome<P::Value>>,
    tracker: &Arc<CompletionTracker>,
    mode: DispatchMode,
) -> Launched
where
    I: WorkItem,
    P: Processor<I>,
{
    match mode {
        DispatchMode::PerItem => launch_per_item(items, processor, conduit, tracker),
        DispatchMode::Pooled(workers) => launch_pool(items, processor, conduit, tracker, workers),
    }
}

fn launch_per_item<I, P>(
    items: Vec<I>,
    processor: Arc<P>,
    conduit: &Conduit<Outcome<P::Value>>,
    tracker: &Arc<CompletionTracker>,
) -> Launched
where
    I: WorkItem,
    P: Processor<I>,
{
    let mut handles = Vec::with_capacity(items.len());
    for (id, item) in items.into_iter().enumerate() {
        let guard = tracker.register();
        match spawn_item_worker(
            id,
            item,
            Arc::clone(&processor),
            conduit.publisher(),
            guard,
        ) {
            Ok(h) => handles.push(h),
            Err(e) => {
                return Launched {
                    handles,
                    spawn_error: Some(spawn_error("worker", e)),
                };
            }
        }
    }
    debug!("dispatch: launched {} per-item workers", handles.len());
    Launched {
        handles,
        spawn_error: None,
    }
}

fn fill_queue<I>(item_tx: Sender<(usize, I)>, items: Vec<I>) {
    for entry in items.into_iter().enumerate() {
        // The caller still holds a receiver, so this cannot fail.
        let _ = item_tx.send(entry);
    }
}

fn launch_pool<I, P>(
    items: Vec<I>,
    processor: Arc<P>,
    conduit: &Conduit<Outcome<P::Value>>,
    tracker: &Arc<CompletionTracker>,
    workers: usize,
) -> Launched
where
    I: WorkItem,
    P: Processor<I>,
{
    let workers = workers.min(items.len()).max(1);
    let (item_tx, item_rx) = unbounded::<(usize, I)>();
    // Queue is filled and closed up front: pool workers exit once it is drained.
    fill_queue(item_tx, items);

    let mut handles = Vec::with_capacity(workers);
    for id in 0..workers {
        let guard = tracker.register();
        match spawn_pool_worker(
            id,
            item_rx.clone(),
            Arc::clone(&processor),
            conduit.publisher(),
            guard,
        ) {
            Ok(h) => handles.push(h),
            Err(e) => {
                return Launched {
                    handles,
                    spawn_error: Some(spawn_error("pool worker", e)),
                };
            }
        }
    }
    debug!("dispatch: launched pool of {} workers", handles.len());
    Launched {
        handles,
        spawn_error: None,
    }
}
