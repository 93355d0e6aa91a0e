//! Workers: run the processor on an item, wrap the result, publish exactly one outcome per item.

use crossbeam_channel::{Receiver, Sender};
use log::{debug, error};
use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::tracker::CompletionGuard;
use crate::{ItemError, Outcome, WorkItem};

/// The caller-supplied unit of work. Blanket-implemented for `Fn(&I) -> Result<V, ItemError>`.
pub trait Processor<I>: Send + Sync + 'static {
    type Value: Send + 'static;

    fn process(&self, item: &I) -> Result<Self::Value, ItemError>;
}

impl<I, V, F> Processor<I> for F
where
    F: Fn(&I) -> Result<V, ItemError> + Send + Sync + 'static,
    V: Send + 'static,
{
    type Value = V;

    fn process(&self, item: &I) -> Result<V, ItemError> {
        self(item)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Run `processor` on `item`, the `index`-th item of the run. A panic inside the processor becomes
/// a failure outcome. A panic in `item.key()` also becomes a failure, keyed `#<index>`, and the
/// processor is not run.
pub fn process_item<I, P>(index: usize, processor: &P, item: &I) -> Outcome<P::Value>
where
    I: WorkItem,
    P: Processor<I> + ?Sized,
{
    let key = match panic::catch_unwind(AssertUnwindSafe(|| item.key())) {
        Ok(key) => key,
        Err(payload) => {
            return Outcome::Failure {
                key: format!("#{index}"),
                error: ItemError::new(format!(
                    "item key panicked: {}",
                    panic_message(payload.as_ref())
                )),
            };
        }
    };
    let result = panic::catch_unwind(AssertUnwindSafe(|| processor.process(item)))
        .unwrap_or_else(|payload| {
            Err(ItemError::new(format!(
                "processor panicked: {}",
                panic_message(payload.as_ref())
            )))
        });
    Outcome::from_result(key, result)
}

/// Send one outcome. Blocks while the conduit is full; the collector is always draining.
fn publish<V>(publisher: &Sender<Outcome<V>>, outcome: Outcome<V>) {
    if let Err(e) = publisher.send(outcome) {
        error!("collector gone; dropped outcome for {}", e.0.key());
    }
}

/// Spawn one worker for one item. The guard is released after the outcome is published and the
/// sender dropped, or on unwind, or when the spawn itself fails.
pub fn spawn_item_worker<I, P>(
    id: usize,
    item: I,
    processor: Arc<P>,
    publisher: Sender<Outcome<P::Value>>,
    guard: CompletionGuard,
) -> io::Result<JoinHandle<()>>
where
    I: WorkItem,
    P: Processor<I>,
{
    thread::Builder::new()
        .name(format!("{}-worker-{id}", env!("CARGO_PKG_NAME")))
        .spawn(move || {
            let outcome = process_item(id, processor.as_ref(), &item);
            publish(&publisher, outcome);
            drop(publisher);
            drop(item);
            drop(guard);
        })
}

/// Pool worker: pull indexed items from `item_rx` until the queue is closed and drained.
fn pool_worker_loop<I, P>(
    id: usize,
    item_rx: Receiver<(usize, I)>,
    processor: Arc<P>,
    publisher: Sender<Outcome<P::Value>>,
) where
    I: WorkItem,
    P: Processor<I>,
{
    let mut handled = 0_usize;
    while let Ok((index, item)) = item_rx.recv() {
        let outcome = process_item(index, processor.as_ref(), &item);
        publish(&publisher, outcome);
        handled += 1;
    }
    debug!("pool worker {}: queue drained after {} items", id, handled);
}

/// Spawn one pool worker sharing `item_rx` with its siblings.
pub fn spawn_pool_worker<I, P>(
    id: usize,
    item_rx: Receiver<(usize, I)>,
    processor: Arc<P>,
    publisher: Sender<Outcome<P::Value>>,
    guard: CompletionGuard,
) -> io::Result<JoinHandle<()>>
where
    I: WorkItem,
    P: Processor<I>,
{
    thread::Builder::new()
        .name(format!("{}-pool-{id}", env!("CARGO_PKG_NAME")))
        .spawn(move || {
            pool_worker_loop(id, item_rx, processor, publisher);
            drop(guard);
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_item_wraps_ok_and_err() {
        let p = |s: &String| -> Result<usize, ItemError> {
            if s.is_empty() {
                Err(ItemError::from("empty"))
            } else {
                Ok(s.len())
            }
        };
        assert_eq!(
            process_item(0, &p, &"abc".to_string()),
            Outcome::Success {
                key: "abc".to_string(),
                value: 3
            }
        );
        assert_eq!(
            process_item(0, &p, &String::new()),
            Outcome::Failure {
                key: String::new(),
                error: ItemError::from("empty")
            }
        );
    }

    #[test]
    fn process_item_turns_panic_into_failure() {
        let p = |_: &String| -> Result<(), ItemError> { panic!("kaboom") };
        match process_item(0, &p, &"x".to_string()) {
            Outcome::Failure { key, error } => {
                assert_eq!(key, "x");
                assert_eq!(error.message(), "processor panicked: kaboom");
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    struct BadKey;

    impl WorkItem for BadKey {
        fn key(&self) -> String {
            panic!("no key")
        }
    }

    #[test]
    fn process_item_turns_key_panic_into_indexed_failure() {
        let p = |_: &BadKey| -> Result<u8, ItemError> { Ok(1) };
        match process_item(7, &p, &BadKey) {
            Outcome::Failure { key, error } => {
                assert_eq!(key, "#7");
                assert_eq!(error.message(), "item key panicked: no key");
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
