//! Barrier activation lifecycle: one run from initial accumulator through
//! folds and merges to exactly one flush.
//!
//! An activation exclusively owns its accumulator. Parallel execution
//! units fold into [`Partial`]s opened from the activation; the
//! coordinator absorbs every partial back before flushing. Flush consumes
//! the activation, so double flush cannot compile, and partials expose no
//! flush at all, so premature flush cannot compile either. Dropping an
//! activation without flushing discards its state; partial results never
//! reach downstream.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::barrier::{BarrierDrain, BarrierFunction};
use crate::error::BarrierError;
use crate::types::Traverser;

static NEXT_ACTIVATION: AtomicU64 = AtomicU64::new(0);

/// Identifies one barrier activation. Partials are tagged with the id of
/// the activation that opened them; absorbing a partial into any other
/// activation is a fatal coordinator error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivationId(u64);

impl ActivationId {
    fn next() -> Self {
        Self(NEXT_ACTIVATION.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for ActivationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "activation-{}", self.0)
    }
}

/// A partial accumulator owned by one execution unit.
///
/// Folded into by exactly one unit at a time (the exclusivity invariant),
/// then moved back to the coordinator and absorbed into its activation.
pub struct Partial<C, S, F>
where
    F: BarrierFunction<C, S>,
{
    activation: ActivationId,
    function: Arc<F>,
    barrier: F::Barrier,
    folded: u64,
    _phantom: PhantomData<fn(C, S)>,
}

impl<C, S, F> Partial<C, S, F>
where
    F: BarrierFunction<C, S>,
{
    /// The activation this partial belongs to.
    pub fn activation(&self) -> ActivationId {
        self.activation
    }

    /// Number of traversers folded so far.
    pub fn folded(&self) -> u64 {
        self.folded
    }

    /// Fold one traverser into this partial.
    pub fn fold(&mut self, traverser: Traverser<C, S>) -> Result<(), BarrierError> {
        self.function.fold(traverser, &mut self.barrier)?;
        self.folded += 1;
        Ok(())
    }
}

/// One complete barrier lifecycle, from empty accumulator to single flush.
pub struct BarrierActivation<C, S, F>
where
    F: BarrierFunction<C, S>,
{
    id: ActivationId,
    function: Arc<F>,
    barrier: F::Barrier,
    _phantom: PhantomData<fn(C, S)>,
}

impl<C, S, F> BarrierActivation<C, S, F>
where
    F: BarrierFunction<C, S>,
{
    /// Open a new activation with a fresh accumulator.
    pub fn new(function: Arc<F>) -> Self {
        let id = ActivationId::next();
        debug!(%id, "opened barrier activation");
        Self {
            id,
            barrier: function.initial(),
            function,
            _phantom: PhantomData,
        }
    }

    pub fn id(&self) -> ActivationId {
        self.id
    }

    /// Whether flushed elements re-enter the pipeline as traversers.
    pub fn emits_traversers(&self) -> bool {
        self.function.emits_traversers()
    }

    /// Open a partial accumulator for one execution unit.
    pub fn open_partial(&self) -> Partial<C, S, F> {
        Partial {
            activation: self.id,
            function: Arc::clone(&self.function),
            barrier: self.function.initial(),
            folded: 0,
            _phantom: PhantomData,
        }
    }

    /// Fold directly into the activation's own accumulator.
    ///
    /// This is the single-unit path; with parallel units, fold into
    /// partials and [`absorb`](Self::absorb) them instead.
    pub fn fold(&mut self, traverser: Traverser<C, S>) -> Result<(), BarrierError> {
        self.function.fold(traverser, &mut self.barrier)
    }

    /// Merge a finished partial back into the activation.
    pub fn absorb(&mut self, partial: Partial<C, S, F>) -> Result<(), BarrierError> {
        if partial.activation != self.id {
            return Err(BarrierError::ActivationMismatch {
                expected: self.id,
                found: partial.activation,
            });
        }
        self.function.merge(&mut self.barrier, partial.barrier);
        Ok(())
    }

    /// Drain the finished accumulator, ending the activation.
    pub fn flush(self) -> BarrierDrain<F::Output> {
        debug!(id = %self.id, "flushing barrier activation");
        self.function.flush(self.barrier)
    }
}
