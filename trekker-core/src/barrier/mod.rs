//! The barrier contract and its reference implementations.
//!
//! A barrier is the minority pipeline stage that must observe an entire
//! logical group of traversers before it may emit anything. The contract
//! is four named operations plus one capability flag:
//!
//! - [`BarrierFunction::initial`] — fresh empty accumulator
//! - [`BarrierFunction::fold`] — one traverser into the accumulator
//! - [`BarrierFunction::merge`] — combine two partial accumulators
//! - [`BarrierFunction::flush`] — drain the finished accumulator
//! - [`BarrierFunction::emits_traversers`] — output tagging
//!
//! Reference barriers:
//!
//! - [`CountBarrier`], [`SumBarrier`], [`MinBarrier`], [`MaxBarrier`] —
//!   scalar running aggregates
//! - [`GroupBarrier`] — unordered bag accumulation keyed by a field
//! - [`OrderBarrier`], [`TopKBarrier`] — ordered accumulation with
//!   arrival-ordinal provenance
//! - [`DedupBarrier`] — stream-wide deduplication by structural identity

use crate::error::BarrierError;
use crate::types::Traverser;

mod aggregate;
mod dedup;
mod group;
mod order;

pub use aggregate::*;
pub use dedup::*;
pub use group::*;
pub use order::*;

/// The barrier operator contract.
///
/// `C` is the execution context type, `S` the incoming value type.
///
/// # Mutation discipline
///
/// Accumulators are mutated **in place**: `fold` and `merge` take
/// `&mut Self::Barrier` and the consumed side of a merge is moved in by
/// value. An accumulator handed to `merge` is gone afterwards; callers
/// never observe it again.
///
/// # Laws
///
/// - `initial` is idempotent: repeated calls yield independent,
///   behaviorally-equivalent empty accumulators.
/// - `merge` is associative, and `merge(initial(), x)` is observably
///   equal to `x` (identity element).
/// - Order-insensitive barriers have a commutative `merge`; order-sensitive
///   barriers carry each traverser's arrival ordinal inside the accumulator
///   so any merge order flushes to the same sequence.
///
/// # Exclusivity
///
/// An accumulator is folded into by at most one execution unit at a time.
/// This is a hard requirement, not a convention; it is what lets `fold`
/// stay lock-free.
pub trait BarrierFunction<C, S>: Send + Sync {
    /// The accumulator type, private to one barrier activation.
    type Barrier: Send;

    /// The output element type produced by `flush`.
    type Output: Send + 'static;

    /// A fresh, side-effect-free empty accumulator.
    fn initial(&self) -> Self::Barrier;

    /// Fold one traverser into the accumulator.
    ///
    /// A value outside the barrier's domain is a [`BarrierError::Domain`];
    /// it terminates the whole traversal rather than being coerced or
    /// dropped.
    fn fold(
        &self,
        traverser: Traverser<C, S>,
        barrier: &mut Self::Barrier,
    ) -> Result<(), BarrierError>;

    /// Combine two accumulators built from disjoint subsets of the same
    /// logical group. `other` is consumed.
    fn merge(&self, into: &mut Self::Barrier, other: Self::Barrier);

    /// Convert the finished accumulator into a finite output sequence.
    ///
    /// Consumes the accumulator: some barriers drain internal state here,
    /// so re-deriving output requires a fresh fold cycle.
    fn flush(&self, barrier: Self::Barrier) -> BarrierDrain<Self::Output>;

    /// Whether flushed elements re-enter the pipeline as successor
    /// traversers (`true`) or are terminal result values (`false`).
    ///
    /// Fixed per barrier type, not per call.
    fn emits_traversers(&self) -> bool {
        false
    }
}

/// A finite, lazy, non-restartable producer of flushed output elements.
///
/// Drained exactly once per activation; dropping it mid-drain discards
/// the remainder. Concurrency-safety of the drain is the coordinator's
/// responsibility, not the barrier's.
pub struct BarrierDrain<E> {
    inner: Box<dyn Iterator<Item = E> + Send>,
}

impl<E: Send + 'static> BarrierDrain<E> {
    /// Wrap an iterator as a drain.
    pub fn new<I>(iter: I) -> Self
    where
        I: Iterator<Item = E> + Send + 'static,
    {
        Self {
            inner: Box::new(iter),
        }
    }

    /// A drain producing nothing.
    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }

    /// A drain producing exactly one element.
    pub fn once(element: E) -> Self {
        Self::new(std::iter::once(element))
    }

    /// A drain over an already-materialized sequence.
    pub fn from_vec(elements: Vec<E>) -> Self {
        Self::new(elements.into_iter())
    }
}

impl<E> Iterator for BarrierDrain<E> {
    type Item = E;

    fn next(&mut self) -> Option<E> {
        self.inner.next()
    }
}

impl<E> std::fmt::Debug for BarrierDrain<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BarrierDrain(..)")
    }
}

#[cfg(test)]
#[path = "tests/barrier_tests.rs"]
mod tests;
