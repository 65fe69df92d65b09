//! Actor-owned batch state.
//!
//! `BatchState` is mutated only inside the actor's sequential command loop;
//! it is never shared across tasks. Invariants: every identifier in
//! `pending` is present in `unique_seen`, and `unique_seen` only grows for
//! the lifetime of the actor, so an identifier flushed in an earlier batch
//! and re-observed later is still recognized as a repeat.

use crate::observation::TagObservation;
use std::collections::HashSet;
use std::time::Instant;

/// Pending observations plus dedup bookkeeping.
#[derive(Debug)]
pub struct BatchState {
    pending: Vec<TagObservation>,
    unique_seen: HashSet<String>,
    last_flush_at: Instant,
}

impl BatchState {
    /// Creates empty state with the flush clock starting now.
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            unique_seen: HashSet::new(),
            last_flush_at: Instant::now(),
        }
    }

    /// Accepts an observation if its identifier is new.
    ///
    /// Returns `true` when the observation was appended to `pending`,
    /// `false` when it is a repeat (the observation is discarded).
    pub fn accept(&mut self, observation: TagObservation) -> bool {
        if self.unique_seen.contains(&observation.identifier) {
            return false;
        }
        self.unique_seen.insert(observation.identifier.clone());
        self.pending.push(observation);
        true
    }

    /// Number of pending, not-yet-flushed observations.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Whether there is anything to flush.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Distinct identifiers ever accepted.
    pub fn unique_count(&self) -> usize {
        self.unique_seen.len()
    }

    /// Elapsed time since the last flush (or construction).
    pub fn since_last_flush(&self) -> std::time::Duration {
        self.last_flush_at.elapsed()
    }

    /// Snapshots and clears `pending`, resetting the flush clock.
    ///
    /// `unique_seen` is deliberately untouched; repeats across flush
    /// boundaries must still be recognized.
    pub fn take_pending(&mut self) -> Vec<TagObservation> {
        self.last_flush_at = Instant::now();
        std::mem::take(&mut self.pending)
    }

    /// Re-merges a failed flush snapshot ahead of anything accepted since,
    /// preserving original observation order for the retry.
    pub fn restore_front(&mut self, snapshot: Vec<TagObservation>) {
        let newer = std::mem::replace(&mut self.pending, snapshot);
        self.pending.extend(newer);
    }
}

impl Default for BatchState {
    fn default() -> Self {
        Self::new()
    }
}
