//! Run options and the publish conduit shared between workers and the collector.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::fmt;

use super::tracker::CompletionTracker;
use crate::error::{JobError, Result};

/// How workers are launched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DispatchMode {
    /// One thread per item.
    #[default]
    PerItem,
    /// Fixed pool of N threads pulling items from a queue. Same outcomes, bounded parallelism.
    Pooled(usize),
}

/// Called on the collector thread after each outcome with the running total.
pub type ProgressFn = Box<dyn Fn(usize) + Send>;

/// Per-run options besides the capacity policy.
#[derive(Default)]
pub struct JobOpts {
    pub dispatch: DispatchMode,
    pub on_collected: Option<ProgressFn>,
}

impl fmt::Debug for JobOpts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobOpts")
            .field("dispatch", &self.dispatch)
            .field("on_collected", &self.on_collected.is_some())
            .finish()
    }
}

impl JobOpts {
    pub fn pooled(workers: usize) -> Self {
        Self {
            dispatch: DispatchMode::Pooled(workers),
            ..Self::default()
        }
    }
}

/// Coordinator's end of the many-writer / one-reader outcome channel.
///
/// Workers get sender clones through [`Conduit::publisher`]. The channel reports closed to the
/// collector once the coordinator has called [`Conduit::close`] and every worker has dropped its
/// clone.
pub struct Conduit<T> {
    tx: Sender<T>,
    capacity: usize,
}

impl<T> Conduit<T> {
    /// Open a bounded conduit; the receiver goes to the collector.
    pub fn open(capacity: usize) -> (Self, Receiver<T>) {
        let (tx, rx) = bounded(capacity);
        (Self { tx, capacity }, rx)
    }

    pub fn publisher(&self) -> Sender<T> {
        self.tx.clone()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop the coordinator's sender. Refused while any worker is still registered with `tracker`.
    pub fn close(self, tracker: &CompletionTracker) -> Result<()> {
        let active = tracker.active();
        if active > 0 {
            return Err(JobError::Protocol { active });
        }
        drop(self.tx);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn close_with_active_worker_is_protocol_error() {
        let tracker = Arc::new(CompletionTracker::new());
        let (conduit, _rx) = Conduit::<u32>::open(4);
        let _guard = tracker.register();
        let err = conduit.close(&tracker).unwrap_err();
        assert!(matches!(err, JobError::Protocol { active: 1 }));
    }

    #[test]
    fn close_after_workers_done_ends_receiver() {
        let tracker = Arc::new(CompletionTracker::new());
        let (conduit, rx) = Conduit::<u32>::open(4);
        let publisher = conduit.publisher();
        let guard = tracker.register();
        publisher.send(7).unwrap();
        drop(publisher);
        drop(guard);
        conduit.close(&tracker).unwrap();
        assert_eq!(rx.recv().ok(), Some(7));
        assert!(rx.recv().is_err());
    }

    #[test]
    fn job_opts_default_is_per_item() {
        let opts = JobOpts::default();
        assert_eq!(opts.dispatch, DispatchMode::PerItem);
        assert!(opts.on_collected.is_none());
        assert_eq!(JobOpts::pooled(3).dispatch, DispatchMode::Pooled(3));
    }
}
