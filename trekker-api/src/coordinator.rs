//! Reference barrier coordinator.
//!
//! The coordinator owns everything the barrier contract leaves external:
//! the traverser stream and its completion signal, partitioning across
//! execution units, the reduction that collapses partial accumulators
//! before the single flush, and tagging flushed elements as terminal
//! values or successor traversers.
//!
//! # Execution model
//!
//! ```text
//! traversers ──► round-robin ──► worker threads, one Partial each
//!                                     │
//!                                     ▼ (channel disconnect = end of scope)
//!                            absorb partials, flush once
//! ```
//!
//! Keyed barriers hash-partition by key instead, so every traverser of a
//! key folds on the same unit and each per-key activation stays
//! single-unit. On any fold failure the activation is discarded without
//! flushing; partial results never reach downstream.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::thread;

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::bounded;
use tracing::{debug, warn};

use trekker_core::activation::BarrierActivation;
use trekker_core::barrier::BarrierFunction;
use trekker_core::error::BarrierError;
use trekker_core::partitioner::{HashPartitioner, Partitioner, RoundRobinPartitioner};
use trekker_core::types::{Emission, Traverser};

/// Bounded for backpressure: a slow worker stalls the feed instead of
/// buffering without limit.
const CHANNEL_CAPACITY: usize = 1024;

/// Run one global barrier activation over the whole stream.
pub fn run_barrier<C, S, F>(
    function: Arc<F>,
    context: C,
    traversers: Vec<Traverser<C, S>>,
    parallelism: usize,
) -> Result<Vec<Emission<C, F::Output>>>
where
    C: Clone + Send + 'static,
    S: Send + 'static,
    F: BarrierFunction<C, S> + 'static,
{
    let parallelism = parallelism.max(1);
    debug!(
        parallelism,
        traversers = traversers.len(),
        "running barrier activation"
    );

    let mut activation = BarrierActivation::new(Arc::clone(&function));

    if parallelism == 1 {
        for traverser in traversers {
            activation.fold(traverser).with_context(|| {
                format!("barrier fold failed in {}", activation.id())
            })?;
        }
        return Ok(drain_emissions(activation, &context));
    }

    let mut senders = Vec::with_capacity(parallelism);
    let mut handles = Vec::with_capacity(parallelism);
    for _ in 0..parallelism {
        let (tx, rx) = bounded::<Traverser<C, S>>(CHANNEL_CAPACITY);
        let mut partial = activation.open_partial();
        handles.push(thread::spawn(move || {
            for traverser in rx.iter() {
                partial.fold(traverser)?;
            }
            Ok::<_, BarrierError>(partial)
        }));
        senders.push(tx);
    }

    // Any split of the stream is legal for a global barrier; round-robin
    // keeps the units evenly loaded. A failed send means the worker has
    // already exited with an error, which the join below surfaces.
    let router = RoundRobinPartitioner;
    let mut feed_broken = false;
    for traverser in traversers {
        let unit = router.partition(&traverser, parallelism);
        if senders[unit].send(traverser).is_err() {
            feed_broken = true;
            break;
        }
    }
    drop(senders);

    let mut partials = Vec::with_capacity(parallelism);
    let mut failure: Option<anyhow::Error> = None;
    for handle in handles {
        match handle.join() {
            Ok(Ok(partial)) => partials.push(partial),
            Ok(Err(err)) => failure = Some(err.into()),
            Err(_) => failure = Some(anyhow!("barrier worker panicked")),
        }
    }
    if let Some(err) = failure {
        warn!(id = %activation.id(), "discarding failed barrier activation");
        return Err(err.context("barrier fold failed"));
    }
    if feed_broken {
        return Err(anyhow!("barrier worker exited before end of stream"));
    }

    for partial in partials {
        activation.absorb(partial)?;
    }
    Ok(drain_emissions(activation, &context))
}

/// Run one barrier activation per distinct key.
///
/// Each key's traversers are routed to a single unit by hashing, so the
/// per-key accumulator is only ever folded by one unit (the exclusivity
/// invariant) and no state is shared across keys.
pub fn run_keyed_barrier<C, S, K, KF, F>(
    function: Arc<F>,
    context: C,
    key_fn: Arc<KF>,
    traversers: Vec<Traverser<C, S>>,
    parallelism: usize,
) -> Result<HashMap<K, Vec<Emission<C, F::Output>>>>
where
    C: Clone + Send + 'static,
    S: Send + 'static,
    K: Hash + Eq + Clone + Send + Sync + 'static,
    KF: Fn(&S) -> K + Send + Sync + 'static,
    F: BarrierFunction<C, S> + 'static,
{
    let parallelism = parallelism.max(1);
    debug!(
        parallelism,
        traversers = traversers.len(),
        "running keyed barrier"
    );

    let mut activations: HashMap<K, BarrierActivation<C, S, F>> = HashMap::new();

    if parallelism == 1 {
        for traverser in traversers {
            let key = key_fn(traverser.value());
            let activation = activations
                .entry(key)
                .or_insert_with(|| BarrierActivation::new(Arc::clone(&function)));
            activation.fold(traverser).context("keyed barrier fold failed")?;
        }
    } else {
        let mut senders = Vec::with_capacity(parallelism);
        let mut handles = Vec::with_capacity(parallelism);
        for _ in 0..parallelism {
            let (tx, rx) = bounded::<Traverser<C, S>>(CHANNEL_CAPACITY);
            let worker_fn = Arc::clone(&function);
            let worker_keys = Arc::clone(&key_fn);
            handles.push(thread::spawn(move || {
                let mut local: HashMap<K, BarrierActivation<C, S, F>> = HashMap::new();
                for traverser in rx.iter() {
                    let key = worker_keys(traverser.value());
                    let activation = local
                        .entry(key)
                        .or_insert_with(|| BarrierActivation::new(Arc::clone(&worker_fn)));
                    activation.fold(traverser)?;
                }
                Ok::<_, BarrierError>(local)
            }));
            senders.push(tx);
        }

        let selector = Arc::clone(&key_fn);
        let router = HashPartitioner::new(move |value: &S| selector(value));
        let mut feed_broken = false;
        for traverser in traversers {
            let unit = router.partition(&traverser, parallelism);
            if senders[unit].send(traverser).is_err() {
                feed_broken = true;
                break;
            }
        }
        drop(senders);

        let mut failure: Option<anyhow::Error> = None;
        for handle in handles {
            match handle.join() {
                // Keys are disjoint across units by construction.
                Ok(Ok(local)) => activations.extend(local),
                Ok(Err(err)) => failure = Some(err.into()),
                Err(_) => failure = Some(anyhow!("barrier worker panicked")),
            }
        }
        if let Some(err) = failure {
            warn!("discarding failed keyed barrier activations");
            return Err(err.context("keyed barrier fold failed"));
        }
        if feed_broken {
            return Err(anyhow!("barrier worker exited before end of stream"));
        }
    }

    let mut results = HashMap::with_capacity(activations.len());
    for (key, activation) in activations {
        results.insert(key, drain_emissions(activation, &context));
    }
    Ok(results)
}

/// Flush exactly once and tag every element per the barrier's capability
/// flag. Successor traversers carry the scope's context and fresh
/// ordinals in emission order.
fn drain_emissions<C, S, F>(
    activation: BarrierActivation<C, S, F>,
    context: &C,
) -> Vec<Emission<C, F::Output>>
where
    C: Clone,
    F: BarrierFunction<C, S>,
{
    let emits = activation.emits_traversers();
    activation
        .flush()
        .enumerate()
        .map(|(i, element)| {
            if emits {
                Emission::Traverser(Traverser::new(context.clone(), element, i as u64))
            } else {
                Emission::Value(element)
            }
        })
        .collect()
}
