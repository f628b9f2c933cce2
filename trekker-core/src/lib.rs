//! # Trekker Core
//!
//! Barrier stage of the Trekker traversal-execution machine.
//!
//! Most pipeline stages are local: one traverser in, zero or more out.
//! This crate specifies and implements the stages that cannot work that
//! way, because they must observe an entire logical group of traversers
//! before emitting anything (aggregation, global ordering, counting,
//! stream-wide deduplication, grouping).
//!
//! - [`types`] — [`Traverser`](types::Traverser), the dynamic
//!   [`Value`](types::Value) model, [`Emission`](types::Emission), and the
//!   [`TraverserData`](types::TraverserData) trait bound.
//! - [`barrier`] — the [`BarrierFunction`](barrier::BarrierFunction)
//!   contract, [`BarrierDrain`](barrier::BarrierDrain), and the reference
//!   barriers (count/sum/min/max, group, order, top-k, dedup).
//! - [`activation`] — the
//!   [`BarrierActivation`](activation::BarrierActivation) lifecycle and
//!   per-unit [`Partial`](activation::Partial) accumulators.
//! - [`partitioner`] — routing traversers across parallel units.
//! - [`error`] — the [`BarrierError`](error::BarrierError) taxonomy.

pub mod activation;
pub mod barrier;
pub mod error;
pub mod partitioner;
pub mod types;
