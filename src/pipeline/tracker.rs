//! Completion tracker: counts outstanding workers so the coordinator can block until all are done.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

/// Wait-group style counter. Register before spawning, the returned guard decrements on drop.
#[derive(Debug, Default)]
pub struct CompletionTracker {
    active: Mutex<usize>,
    idle: Condvar,
}

impl CompletionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    // Only integer updates happen under the lock, so a poisoned count is still accurate.
    fn lock(&self) -> MutexGuard<'_, usize> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record one more active worker. Must be called before the worker is launched.
    pub fn register(self: &Arc<Self>) -> CompletionGuard {
        *self.lock() += 1;
        CompletionGuard {
            tracker: Arc::clone(self),
        }
    }

    /// Workers registered and not yet finished.
    pub fn active(&self) -> usize {
        *self.lock()
    }

    /// Block until every registered worker has dropped its guard.
    pub fn wait_idle(&self) {
        let mut active = self.lock();
        while *active > 0 {
            active = self
                .idle
                .wait(active)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn done(&self) {
        let mut active = self.lock();
        *active = active.saturating_sub(1);
        if *active == 0 {
            self.idle.notify_all();
        }
    }
}

/// Marks one worker as active until dropped. Runs on unwind too, so a panicking worker still counts down.
#[derive(Debug)]
pub struct CompletionGuard {
    tracker: Arc<CompletionTracker>,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.tracker.done();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn wait_idle_returns_immediately_when_nothing_registered() {
        CompletionTracker::new().wait_idle();
    }

    #[test]
    fn guard_drop_decrements() {
        let tracker = Arc::new(CompletionTracker::new());
        let a = tracker.register();
        let b = tracker.register();
        assert_eq!(tracker.active(), 2);
        drop(a);
        assert_eq!(tracker.active(), 1);
        drop(b);
        assert_eq!(tracker.active(), 0);
    }

    #[test]
    fn wait_idle_blocks_until_threads_finish() {
        let tracker = Arc::new(CompletionTracker::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let guard = tracker.register();
                thread::spawn(move || {
                    thread::sleep(Duration::from_millis(5 * i));
                    drop(guard);
                })
            })
            .collect();
        tracker.wait_idle();
        assert_eq!(tracker.active(), 0);
        for h in handles {
            h.join().unwrap();
        }
    }

    #[test]
    fn guard_released_when_thread_panics() {
        let tracker = Arc::new(CompletionTracker::new());
        let guard = tracker.register();
        let h = thread::spawn(move || {
            let _guard = guard;
            panic!("worker blew up");
        });
        assert!(h.join().is_err());
        tracker.wait_idle();
        assert_eq!(tracker.active(), 0);
    }
}
