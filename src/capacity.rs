//! Conduit capacity policy: how many outcomes may sit buffered between workers and the collector.
//!
//! A small capacity keeps workers close to lockstep with the collector; a larger one lets short-lived
//! workers burst ahead at the cost of buffered outcomes. A non-empty run must never get capacity 0.

use log::debug;

use crate::error::{JobError, Result};
use crate::utils::config::CapacityTiers;

/// Maps an expected item count to a conduit capacity.
pub trait CapacityPolicy: Send + Sync {
    fn capacity(&self, item_count: usize) -> usize;
}

impl<F> CapacityPolicy for F
where
    F: Fn(usize) -> usize + Send + Sync,
{
    fn capacity(&self, item_count: usize) -> usize {
        self(item_count)
    }
}

/// Three-tier policy, total over all counts: small / medium / large.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThresholdPolicy {
    pub small_max: usize,
    pub medium_max: usize,
    pub small_cap: usize,
    pub medium_cap: usize,
    pub large_cap: usize,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self {
            small_max: CapacityTiers::SMALL_MAX,
            medium_max: CapacityTiers::MEDIUM_MAX,
            small_cap: CapacityTiers::SMALL_CAP,
            medium_cap: CapacityTiers::MEDIUM_CAP,
            large_cap: CapacityTiers::LARGE_CAP,
        }
    }
}

impl CapacityPolicy for ThresholdPolicy {
    fn capacity(&self, item_count: usize) -> usize {
        match item_count {
            0 => 0,
            n if n <= self.small_max => self.small_cap,
            n if n <= self.medium_max => self.medium_cap,
            _ => self.large_cap,
        }
    }
}

/// Evaluate `policy` for `item_count` and reject a zero capacity for a non-empty run.
///
/// Called before any thread is started, so a bad policy never launches a worker.
pub fn resolve_capacity<P>(policy: &P, item_count: usize) -> Result<usize>
where
    P: CapacityPolicy + ?Sized,
{
    let capacity = policy.capacity(item_count);
    if item_count > 0 && capacity == 0 {
        return Err(JobError::Configuration {
            item_count,
            capacity,
        });
    }
    debug!("Conduit capacity {} for {} items", capacity, item_count);
    Ok(capacity)
}
