//! Public types for the fanjob API: work items, outcomes and the aggregated result sink.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// One independent unit of input. The key names the item in the result sink (file name, URL, ...).
pub trait WorkItem: Send + 'static {
    fn key(&self) -> String;
}

impl WorkItem for String {
    fn key(&self) -> String {
        self.clone()
    }
}

impl WorkItem for &'static str {
    fn key(&self) -> String {
        (*self).to_string()
    }
}

impl WorkItem for PathBuf {
    fn key(&self) -> String {
        self.display().to_string()
    }
}

/// Generic work item: an explicit key plus whatever payload the processor needs.
#[derive(Clone, Debug)]
pub struct Job<P> {
    pub key: String,
    pub payload: P,
}

impl<P> Job<P> {
    pub fn new(key: impl Into<String>, payload: P) -> Self {
        Self {
            key: key.into(),
            payload,
        }
    }
}

impl<P: Send + 'static> WorkItem for Job<P> {
    fn key(&self) -> String {
        self.key.clone()
    }
}

/// Failure to process a single item. Recorded in the error log; never aborts the batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ItemError {
    message: String,
}

impl ItemError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ItemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ItemError {}

impl From<&str> for ItemError {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ItemError {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<std::io::Error> for ItemError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<anyhow::Error> for ItemError {
    fn from(e: anyhow::Error) -> Self {
        // `{:#}` keeps the context chain on one line
        Self::new(format!("{e:#}"))
    }
}

/// Result of processing one work item. Immutable once built by the worker.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome<V> {
    Success { key: String, value: V },
    Failure { key: String, error: ItemError },
}

impl<V> Outcome<V> {
    /// Wrap a processor result for the item identified by `key`.
    pub fn from_result(key: String, result: Result<V, ItemError>) -> Self {
        match result {
            Ok(value) => Outcome::Success { key, value },
            Err(error) => Outcome::Failure { key, error },
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Outcome::Success { key, .. } | Outcome::Failure { key, .. } => key,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }
}

/// Aggregate of every outcome in a run: successes by key plus an ordered error log.
///
/// Only the collector thread writes to a sink ([`ResultSink::record`] is crate-private). Once a run
/// returns, the sink has no writer left and can be read from anywhere.
///
/// **Duplicate keys:** last write wins in the success map. A failure never removes an earlier success
/// for the same key; both layers then mention the key.
#[derive(Clone, Debug, Serialize)]
pub struct ResultSink<V> {
    success: HashMap<String, V>,
    errors: Vec<(String, ItemError)>,
    #[serde(skip)]
    received: usize,
}

impl<V> Default for ResultSink<V> {
    fn default() -> Self {
        Self {
            success: HashMap::new(),
            errors: Vec::new(),
            received: 0,
        }
    }
}

impl<V> ResultSink<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one outcome into the aggregate.
    pub(crate) fn record(&mut self, outcome: Outcome<V>) {
        self.received += 1;
        match outcome {
            Outcome::Success { key, value } => {
                self.success.insert(key, value);
            }
            Outcome::Failure { key, error } => self.errors.push((key, error)),
        }
    }

    pub fn success(&self) -> &HashMap<String, V> {
        &self.success
    }

    pub fn errors(&self) -> &[(String, ItemError)] {
        &self.errors
    }

    /// Number of outcomes folded in, duplicates included. Equals the number of items dispatched.
    pub fn outcomes_received(&self) -> usize {
        self.received
    }

    pub fn is_empty(&self) -> bool {
        self.received == 0
    }

    pub fn into_parts(self) -> (HashMap<String, V>, Vec<(String, ItemError)>) {
        (self.success, self.errors)
    }
}

/// Full CLI options, built from `.fanjob.toml` then overridden by flags.
#[derive(Clone, Debug)]
pub struct Opts {
    /// Pool size for pooled dispatch. When None, derived from thread count and FD limit.
    pub workers: Option<usize>,
    /// Spawn one thread per item instead of a fixed pool.
    pub per_item: bool,
    /// Show progress bar and debug logs.
    pub verbose: bool,
    /// Print the result sink as JSON instead of coloured text.
    pub json: bool,
    /// Capacity tiers for the outcome conduit.
    pub capacity: crate::capacity::ThresholdPolicy,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            workers: None,
            per_item: false,
            verbose: false,
            json: false,
            capacity: crate::capacity::ThresholdPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_success_and_failure_land_in_separate_layers() {
        let mut sink = ResultSink::new();
        sink.record(Outcome::Success {
            key: "a".to_string(),
            value: 1,
        });
        sink.record(Outcome::Failure {
            key: "b".to_string(),
            error: ItemError::from("boom"),
        });
        assert_eq!(sink.success().get("a"), Some(&1));
        assert!(!sink.success().contains_key("b"));
        assert_eq!(
            sink.errors(),
            &[("b".to_string(), ItemError::new("boom"))][..]
        );
        assert_eq!(sink.outcomes_received(), 2);
    }

    #[test]
    fn duplicate_success_key_last_write_wins() {
        let mut sink = ResultSink::new();
        for v in [1, 2, 3] {
            sink.record(Outcome::Success {
                key: "k".to_string(),
                value: v,
            });
        }
        assert_eq!(sink.success().len(), 1);
        assert_eq!(sink.success()["k"], 3);
        assert_eq!(sink.outcomes_received(), 3);
    }

    #[test]
    fn failure_does_not_evict_prior_success() {
        let mut sink = ResultSink::new();
        sink.record(Outcome::Success {
            key: "k".to_string(),
            value: "ok",
        });
        sink.record(Outcome::Failure {
            key: "k".to_string(),
            error: ItemError::from("late failure"),
        });
        assert_eq!(sink.success()["k"], "ok");
        assert_eq!(sink.errors().len(), 1);
    }

    #[test]
    fn outcome_from_result_keeps_key() {
        let ok: Outcome<u8> = Outcome::from_result("x".into(), Ok(7));
        let err: Outcome<u8> = Outcome::from_result("y".into(), Err(ItemError::from("no")));
        assert!(ok.is_success());
        assert_eq!(ok.key(), "x");
        assert!(!err.is_success());
        assert_eq!(err.key(), "y");
    }

    #[test]
    fn item_error_keeps_anyhow_context_chain() {
        let e = anyhow::anyhow!("inner").context("outer");
        assert_eq!(ItemError::from(e).message(), "outer: inner");
    }
}
