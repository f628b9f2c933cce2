//! Routing traversers across parallel execution units.

use std::hash::{Hash, Hasher};

use ahash::AHasher;

use crate::types::Traverser;

/// Decides which execution unit (`0..num_units`) a traverser folds on.
pub trait Partitioner<C, S>: Send + Sync {
    fn partition(&self, traverser: &Traverser<C, S>, num_units: usize) -> usize;
}

/// Routes by hashing a key extracted from the traverser's value.
///
/// All traversers of a key land on the same unit. Keyed barriers depend
/// on this: it is what keeps every per-key accumulator folded by a
/// single unit, with no merge step across units for that key.
pub struct HashPartitioner<KF> {
    key_fn: KF,
}

impl<KF> HashPartitioner<KF> {
    pub fn new(key_fn: KF) -> Self {
        Self { key_fn }
    }
}

impl<C, S, K, KF> Partitioner<C, S> for HashPartitioner<KF>
where
    K: Hash,
    KF: Fn(&S) -> K + Send + Sync,
{
    fn partition(&self, traverser: &Traverser<C, S>, num_units: usize) -> usize {
        let mut hasher = AHasher::default();
        (self.key_fn)(traverser.value()).hash(&mut hasher);
        (hasher.finish() as usize) % num_units
    }
}

/// Spreads a global barrier's stream evenly by arrival ordinal.
///
/// Any split of the stream is legal for a global barrier, so the only
/// job here is an even spread. Deriving the unit from the ordinal keeps
/// the routing stateless and deterministic: the same traverser always
/// lands on the same unit, however many times the stream is replayed.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundRobinPartitioner;

impl<C, S> Partitioner<C, S> for RoundRobinPartitioner {
    fn partition(&self, traverser: &Traverser<C, S>, num_units: usize) -> usize {
        (traverser.ordinal() % num_units as u64) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trav(value: &str, ordinal: u64) -> Traverser<(), String> {
        Traverser::new((), value.to_string(), ordinal)
    }

    #[test]
    fn test_hash_routes_key_to_one_unit() {
        let partitioner = HashPartitioner::new(|v: &String| v.clone());
        let first = partitioner.partition(&trav("alpha", 0), 4);
        let later = partitioner.partition(&trav("alpha", 9), 4);
        assert_eq!(first, later);
        assert!(first < 4);
    }

    #[test]
    fn test_hash_spreads_distinct_keys() {
        let partitioner = HashPartitioner::new(|v: &String| v.clone());
        let mut seen = std::collections::HashSet::new();
        for i in 0..64 {
            seen.insert(partitioner.partition(&trav(&format!("key-{i}"), i), 8));
        }
        // 64 distinct keys over 8 units should hit more than one unit.
        assert!(seen.len() > 1);
    }

    #[test]
    fn test_round_robin_follows_ordinals() {
        let partitioner = RoundRobinPartitioner;
        let picks: Vec<usize> = (0..6)
            .map(|i| partitioner.partition(&trav("x", i), 3))
            .collect();
        assert_eq!(picks, vec![0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn test_round_robin_is_stateless() {
        // Routing the same traverser twice picks the same unit; there is
        // no hidden counter to advance.
        let partitioner = RoundRobinPartitioner;
        let t = trav("x", 4);
        assert_eq!(partitioner.partition(&t, 3), partitioner.partition(&t, 3));
        assert_eq!(partitioner.partition(&t, 3), 1);
    }
}
