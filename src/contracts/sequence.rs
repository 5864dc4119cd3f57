use crate::contracts::error::SequenceError;

/// Issues record identifiers.
///
/// # Invariants
/// - `next()` is strictly greater than every value it returned before
/// - an identifier is never issued twice, including across restarts, provided
///   the generator is seeded from the highest persisted identifier
pub trait SequenceGenerator: Send + Sync {
    /// Returns the next identifier.
    fn next(&self) -> Result<u64, SequenceError>;

    /// Returns the last issued identifier without incrementing.
    fn current(&self) -> u64;

    /// Raises the counter to at least `floor`. Never lowers it.
    fn advance_to(&self, floor: u64);
}
