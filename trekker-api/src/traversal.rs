use std::collections::HashMap;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use trekker_core::barrier::BarrierFunction;
use trekker_core::types::{Emission, Traverser, TraverserData};

use crate::coordinator;

/// A stream of admitted traversers.
///
/// Created by [`TraversalEnvironment::from_iter`](crate::TraversalEnvironment::from_iter).
/// Attach a barrier directly for whole-stream semantics, or
/// [`key_by`](Self::key_by) first for one activation per key.
pub struct TraverserStream<C, S> {
    name: String,
    context: C,
    traversers: Vec<Traverser<C, S>>,
}

impl<C, S> TraverserStream<C, S>
where
    C: Clone + Send + 'static,
    S: TraverserData,
{
    pub(crate) fn new(name: String, context: C, traversers: Vec<Traverser<C, S>>) -> Self {
        Self {
            name,
            context,
            traversers,
        }
    }

    /// Attach a barrier observing the entire stream as one logical group.
    pub fn barrier<F>(self, function: F) -> BarrierJob<C, S, F>
    where
        F: BarrierFunction<C, S> + 'static,
    {
        BarrierJob {
            name: self.name,
            context: self.context,
            traversers: self.traversers,
            function: Arc::new(function),
        }
    }

    /// Partition the stream by key: each distinct key becomes its own
    /// logical group with its own barrier activation.
    pub fn key_by<K, KF>(self, key_fn: KF) -> KeyedTraverserStream<C, S, K, KF>
    where
        K: TraverserData + Hash + Eq + Sync,
        KF: Fn(&S) -> K + Send + Sync + 'static,
    {
        KeyedTraverserStream {
            name: self.name,
            context: self.context,
            traversers: self.traversers,
            key_fn: Arc::new(key_fn),
            _phantom: PhantomData,
        }
    }
}

/// A barrier over the whole stream. Run it to fold, merge, and flush one
/// activation.
pub struct BarrierJob<C, S, F>
where
    F: BarrierFunction<C, S>,
{
    name: String,
    context: C,
    traversers: Vec<Traverser<C, S>>,
    function: Arc<F>,
}

impl<C, S, F> BarrierJob<C, S, F>
where
    C: Clone + Send + 'static,
    S: TraverserData,
    F: BarrierFunction<C, S> + 'static,
{
    /// Execute with the given number of execution units.
    ///
    /// Returns the flushed output sequence, each element tagged as a
    /// terminal value or a successor traverser per the barrier's
    /// capability flag.
    pub fn run_with_parallelism(self, parallelism: usize) -> Result<Vec<Emission<C, F::Output>>> {
        debug!(job = %self.name, parallelism, "executing barrier job");
        coordinator::run_barrier(self.function, self.context, self.traversers, parallelism)
    }
}

/// A keyed stream: elements with the same key form one logical group.
pub struct KeyedTraverserStream<C, S, K, KF> {
    name: String,
    context: C,
    traversers: Vec<Traverser<C, S>>,
    key_fn: Arc<KF>,
    _phantom: PhantomData<K>,
}

impl<C, S, K, KF> KeyedTraverserStream<C, S, K, KF>
where
    C: Clone + Send + 'static,
    S: TraverserData,
    K: TraverserData + Hash + Eq + Sync,
    KF: Fn(&S) -> K + Send + Sync + 'static,
{
    /// Attach a barrier instantiated once per distinct key.
    pub fn barrier<F>(self, function: F) -> KeyedBarrierJob<C, S, K, KF, F>
    where
        F: BarrierFunction<C, S> + 'static,
    {
        KeyedBarrierJob {
            name: self.name,
            context: self.context,
            traversers: self.traversers,
            key_fn: self.key_fn,
            function: Arc::new(function),
            _phantom: PhantomData,
        }
    }
}

/// A barrier running one activation per distinct key.
pub struct KeyedBarrierJob<C, S, K, KF, F>
where
    F: BarrierFunction<C, S>,
{
    name: String,
    context: C,
    traversers: Vec<Traverser<C, S>>,
    key_fn: Arc<KF>,
    function: Arc<F>,
    _phantom: PhantomData<K>,
}

impl<C, S, K, KF, F> KeyedBarrierJob<C, S, K, KF, F>
where
    C: Clone + Send + 'static,
    S: TraverserData,
    K: TraverserData + Hash + Eq + Sync,
    KF: Fn(&S) -> K + Send + Sync + 'static,
    F: BarrierFunction<C, S> + 'static,
{
    /// Execute with the given number of execution units.
    ///
    /// Returns each key's flushed output sequence.
    pub fn run_with_parallelism(
        self,
        parallelism: usize,
    ) -> Result<HashMap<K, Vec<Emission<C, F::Output>>>> {
        debug!(job = %self.name, parallelism, "executing keyed barrier job");
        coordinator::run_keyed_barrier(
            self.function,
            self.context,
            self.key_fn,
            self.traversers,
            parallelism,
        )
    }
}
