//! Ordered accumulation: global sort and stable top-k.
//!
//! Both barriers keep `(sort key, arrival ordinal, value)` triples so the
//! total order is re-derived at flush time. Ties on the sort key break by
//! arrival ordinal, which makes the result stable and independent of how
//! partial accumulators were merged.

use std::marker::PhantomData;

use super::{BarrierDrain, BarrierFunction};
use crate::error::BarrierError;
use crate::types::{Ordinal, Traverser, TraverserData};

/// Sorts the entire stream by an extracted key, then re-injects every
/// value back into the pipeline as a successor traverser.
pub struct OrderBarrier<K, KF> {
    key_fn: KF,
    descending: bool,
    _phantom: PhantomData<fn() -> K>,
}

impl<K, KF> OrderBarrier<K, KF> {
    /// Sort ascending by the extracted key.
    pub fn by(key_fn: KF) -> Self {
        Self {
            key_fn,
            descending: false,
            _phantom: PhantomData,
        }
    }

    /// Sort descending by the extracted key.
    pub fn by_desc(key_fn: KF) -> Self {
        Self {
            key_fn,
            descending: true,
            _phantom: PhantomData,
        }
    }
}

impl<C, S, K, KF> BarrierFunction<C, S> for OrderBarrier<K, KF>
where
    C: Send,
    S: TraverserData,
    K: Ord + Send + 'static,
    KF: Fn(&S) -> K + Send + Sync,
{
    type Barrier = Vec<(K, Ordinal, S)>;
    type Output = S;

    fn initial(&self) -> Self::Barrier {
        Vec::new()
    }

    fn fold(
        &self,
        traverser: Traverser<C, S>,
        barrier: &mut Self::Barrier,
    ) -> Result<(), BarrierError> {
        let key = (self.key_fn)(traverser.value());
        let (_, value, ordinal) = traverser.into_parts();
        barrier.push((key, ordinal, value));
        Ok(())
    }

    fn merge(&self, into: &mut Self::Barrier, other: Self::Barrier) {
        into.extend(other);
    }

    fn flush(&self, mut barrier: Self::Barrier) -> BarrierDrain<S> {
        sort_entries(&mut barrier, self.descending);
        BarrierDrain::new(barrier.into_iter().map(|(_, _, value)| value))
    }

    fn emits_traversers(&self) -> bool {
        true
    }
}

/// Keeps the k smallest values by an extracted key, stable by arrival.
///
/// The accumulator is pruned back to k entries whenever it grows past
/// twice that, so per-unit state stays bounded even for long streams.
pub struct TopKBarrier<K, KF> {
    k: usize,
    key_fn: KF,
    _phantom: PhantomData<fn() -> K>,
}

impl<K, KF> TopKBarrier<K, KF> {
    /// Keep the `k` smallest values by the extracted key.
    pub fn by(k: usize, key_fn: KF) -> Self {
        Self {
            k,
            key_fn,
            _phantom: PhantomData,
        }
    }
}

impl<C, S, K, KF> BarrierFunction<C, S> for TopKBarrier<K, KF>
where
    C: Send,
    S: TraverserData,
    K: Ord + Send + 'static,
    KF: Fn(&S) -> K + Send + Sync,
{
    type Barrier = Vec<(K, Ordinal, S)>;
    type Output = S;

    fn initial(&self) -> Self::Barrier {
        Vec::new()
    }

    fn fold(
        &self,
        traverser: Traverser<C, S>,
        barrier: &mut Self::Barrier,
    ) -> Result<(), BarrierError> {
        let key = (self.key_fn)(traverser.value());
        let (_, value, ordinal) = traverser.into_parts();
        barrier.push((key, ordinal, value));
        if barrier.len() > self.k.saturating_mul(2) {
            sort_entries(barrier, false);
            barrier.truncate(self.k);
        }
        Ok(())
    }

    fn merge(&self, into: &mut Self::Barrier, other: Self::Barrier) {
        into.extend(other);
        sort_entries(into, false);
        into.truncate(self.k);
    }

    fn flush(&self, mut barrier: Self::Barrier) -> BarrierDrain<S> {
        sort_entries(&mut barrier, false);
        barrier.truncate(self.k);
        BarrierDrain::new(barrier.into_iter().map(|(_, _, value)| value))
    }

    fn emits_traversers(&self) -> bool {
        true
    }
}

fn sort_entries<K: Ord, S>(entries: &mut Vec<(K, Ordinal, S)>, descending: bool) {
    if descending {
        entries.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    } else {
        entries.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));
    }
}
