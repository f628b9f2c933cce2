//! Stream-wide deduplication by structural identity.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use super::{BarrierDrain, BarrierFunction};
use crate::error::BarrierError;
use crate::types::{Ordinal, Traverser, TraverserData};

/// Keeps the first-arriving occurrence of each distinct value.
///
/// Identity is the value's `bincode` encoding, so any [`TraverserData`]
/// works without an extra `Hash + Eq` bound. Merge keeps the occurrence
/// with the smaller arrival ordinal, so the survivor is the same no
/// matter how the stream was split; flush emits survivors in arrival
/// order as successor traversers.
#[derive(Debug, Clone, Copy, Default)]
pub struct DedupBarrier;

impl<C, S> BarrierFunction<C, S> for DedupBarrier
where
    C: Send,
    S: TraverserData,
{
    type Barrier = HashMap<Vec<u8>, (Ordinal, S)>;
    type Output = S;

    fn initial(&self) -> Self::Barrier {
        HashMap::new()
    }

    fn fold(
        &self,
        traverser: Traverser<C, S>,
        barrier: &mut Self::Barrier,
    ) -> Result<(), BarrierError> {
        let identity = bincode::serialize(traverser.value())?;
        let (_, value, ordinal) = traverser.into_parts();
        match barrier.entry(identity) {
            Entry::Occupied(mut occupied) => {
                if ordinal < occupied.get().0 {
                    occupied.insert((ordinal, value));
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert((ordinal, value));
            }
        }
        Ok(())
    }

    fn merge(&self, into: &mut Self::Barrier, other: Self::Barrier) {
        for (identity, (ordinal, value)) in other {
            match into.entry(identity) {
                Entry::Occupied(mut occupied) => {
                    if ordinal < occupied.get().0 {
                        occupied.insert((ordinal, value));
                    }
                }
                Entry::Vacant(vacant) => {
                    vacant.insert((ordinal, value));
                }
            }
        }
    }

    fn flush(&self, barrier: Self::Barrier) -> BarrierDrain<S> {
        let mut survivors: Vec<(Ordinal, S)> = barrier.into_values().collect();
        survivors.sort_by_key(|(ordinal, _)| *ordinal);
        BarrierDrain::new(survivors.into_iter().map(|(_, value)| value))
    }

    fn emits_traversers(&self) -> bool {
        true
    }
}
