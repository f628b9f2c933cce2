//! Group-by-key bag accumulation.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::Hash;
use std::marker::PhantomData;

use super::{BarrierDrain, BarrierFunction};
use crate::error::BarrierError;
use crate::types::{Ordinal, Traverser, TraverserData};

/// One group's accumulated values, with arrival provenance.
#[derive(Debug, Clone)]
pub struct GroupEntry<S> {
    /// Ordinal of the group's first-arriving member; fixes the flush
    /// order of groups deterministically under any partitioning.
    first: Ordinal,
    values: Vec<(Ordinal, S)>,
}

/// Collects traversers into per-key bags; merge is key-wise union.
///
/// Flush emits `(key, values)` pairs ordered by each group's first
/// arrival, with values inside a group in arrival order. Both orders are
/// re-derived from ordinals, so they hold regardless of how the input was
/// split across execution units or in which order partials were merged.
pub struct GroupBarrier<K, KF> {
    key_fn: KF,
    _phantom: PhantomData<fn() -> K>,
}

impl<K, KF> GroupBarrier<K, KF> {
    /// Group by the key extracted from each value.
    pub fn by(key_fn: KF) -> Self {
        Self {
            key_fn,
            _phantom: PhantomData,
        }
    }
}

impl<C, S, K, KF> BarrierFunction<C, S> for GroupBarrier<K, KF>
where
    C: Send,
    S: TraverserData,
    K: TraverserData + Hash + Eq,
    KF: Fn(&S) -> K + Send + Sync,
{
    type Barrier = HashMap<K, GroupEntry<S>>;
    type Output = (K, Vec<S>);

    fn initial(&self) -> Self::Barrier {
        HashMap::new()
    }

    fn fold(
        &self,
        traverser: Traverser<C, S>,
        barrier: &mut Self::Barrier,
    ) -> Result<(), BarrierError> {
        let key = (self.key_fn)(traverser.value());
        let (_, value, ordinal) = traverser.into_parts();
        match barrier.entry(key) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                entry.first = entry.first.min(ordinal);
                entry.values.push((ordinal, value));
            }
            Entry::Vacant(vacant) => {
                vacant.insert(GroupEntry {
                    first: ordinal,
                    values: vec![(ordinal, value)],
                });
            }
        }
        Ok(())
    }

    fn merge(&self, into: &mut Self::Barrier, other: Self::Barrier) {
        for (key, other_entry) in other {
            match into.entry(key) {
                Entry::Occupied(mut occupied) => {
                    let entry = occupied.get_mut();
                    entry.first = entry.first.min(other_entry.first);
                    entry.values.extend(other_entry.values);
                }
                Entry::Vacant(vacant) => {
                    vacant.insert(other_entry);
                }
            }
        }
    }

    fn flush(&self, barrier: Self::Barrier) -> BarrierDrain<Self::Output> {
        let mut groups: Vec<(K, GroupEntry<S>)> = barrier.into_iter().collect();
        groups.sort_by_key(|(_, entry)| entry.first);
        BarrierDrain::new(groups.into_iter().map(|(key, mut entry)| {
            entry.values.sort_by_key(|(ordinal, _)| *ordinal);
            let values = entry.values.into_iter().map(|(_, v)| v).collect();
            (key, values)
        }))
    }
}
