//! Collector: the only writer of the result sink. Drains the conduit until it is closed.

use crossbeam_channel::Receiver;
use log::debug;
use std::io;
use std::thread::{self, JoinHandle};

use super::context::ProgressFn;
use crate::{Outcome, ResultSink};

/// Receive outcomes until every sender is gone, folding each into a fresh sink.
pub fn collector_loop<V>(
    outcome_rx: Receiver<Outcome<V>>,
    on_collected: Option<ProgressFn>,
) -> ResultSink<V> {
    let mut sink = ResultSink::new();
    while let Ok(outcome) = outcome_rx.recv() {
        if let Outcome::Failure { key, error } = &outcome {
            debug!("item failed: {}: {}", key, error);
        }
        sink.record(outcome);
        if let Some(f) = &on_collected {
            f(sink.outcomes_received());
        }
    }
    debug!(
        "collector: conduit closed, {} outcomes ({} errors)",
        sink.outcomes_received(),
        sink.errors().len()
    );
    sink
}

/// Start the collector thread. Joining the handle is the collector's completion signal.
pub fn spawn_collector<V>(
    outcome_rx: Receiver<Outcome<V>>,
    on_collected: Option<ProgressFn>,
) -> io::Result<JoinHandle<ResultSink<V>>>
where
    V: Send + 'static,
{
    thread::Builder::new()
        .name(format!("{}-collector", env!("CARGO_PKG_NAME")))
        .spawn(move || collector_loop(outcome_rx, on_collected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ItemError;
    use crossbeam_channel::bounded;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn loop_exits_when_all_senders_dropped() {
        let (tx, rx) = bounded(2);
        let tx2 = tx.clone();
        let h = spawn_collector(rx, None).unwrap();
        tx.send(Outcome::Success {
            key: "a".to_string(),
            value: 1,
        })
        .unwrap();
        tx2.send(Outcome::Failure {
            key: "b".to_string(),
            error: ItemError::from("nope"),
        })
        .unwrap();
        drop(tx);
        drop(tx2);
        let sink = h.join().unwrap();
        assert_eq!(sink.outcomes_received(), 2);
        assert_eq!(sink.success()["a"], 1);
        assert_eq!(sink.errors()[0].0, "b");
    }

    #[test]
    fn progress_callback_sees_running_total() {
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_cb = Arc::clone(&seen);
        let (tx, rx) = bounded(8);
        for i in 0..5 {
            tx.send(Outcome::Success {
                key: i.to_string(),
                value: i,
            })
            .unwrap();
        }
        drop(tx);
        let cb: ProgressFn = Box::new(move |n| seen_cb.store(n, Ordering::SeqCst));
        let sink = collector_loop(rx, Some(cb));
        assert_eq!(sink.success().len(), 5);
        assert_eq!(seen.load(Ordering::SeqCst), 5);
    }
}
