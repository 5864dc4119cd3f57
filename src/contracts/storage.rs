use serde::{Deserialize, Serialize};

use crate::contracts::error::StorageError;

/// Durable, append-only collection of integers.
///
/// # Invariants
/// - Every acknowledged `insert` is visible to every later `list_sorted`
/// - Records are never mutated or deleted
/// - Duplicate values are kept as separate records
pub trait NumberStore: Send + Sync {
    /// Creates the backing relation if absent. Safe to call repeatedly and
    /// against a relation left by a previous run.
    fn ensure_schema(&self) -> Result<(), StorageError>;

    /// Appends a value as a new record with a store-assigned identifier and
    /// creation timestamp.
    fn insert(&self, value: i64) -> Result<StoredNumber, StorageError>;

    /// Returns every committed value in ascending numeric order.
    /// Order among equal values is unspecified.
    fn list_sorted(&self) -> Result<Vec<i64>, StorageError>;
}

/// A persisted number with its storage metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredNumber {
    pub id: u64,
    pub value: i64,
    pub created_at_ms: i64,
}
