use std::sync::atomic::{AtomicU64, Ordering};

use crate::contracts::{SequenceError, SequenceGenerator};

/// Atomic identifier generator.
///
/// Lock-free in the hot path. Durability comes from the store: on startup the
/// generator is advanced to the highest identifier found on disk.
pub struct AtomicSequenceGenerator {
    counter: AtomicU64,
}

impl AtomicSequenceGenerator {
    /// Creates a new sequence generator starting from 0.
    pub fn new() -> Self {
        Self::starting_from(0)
    }

    /// Creates a sequence generator starting from a specific value.
    pub fn starting_from(value: u64) -> Self {
        Self {
            counter: AtomicU64::new(value),
        }
    }
}

impl Default for AtomicSequenceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceGenerator for AtomicSequenceGenerator {
    fn next(&self) -> Result<u64, SequenceError> {
        // Only atomicity matters here; record visibility is ordered by RocksDB.
        let prev = self
            .counter
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| v.checked_add(1))
            .map_err(|_| SequenceError::Overflow)?;
        Ok(prev + 1)
    }

    fn current(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }

    fn advance_to(&self, floor: u64) {
        self.counter.fetch_max(floor, Ordering::AcqRel);
    }
}
