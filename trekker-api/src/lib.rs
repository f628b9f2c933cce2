//! # Trekker API
//!
//! Fluent surface for running barrier stages of the Trekker traversal
//! machine, plus the reference coordinator that drives them.
//!
//! ```no_run
//! use trekker_api::TraversalEnvironment;
//! use trekker_core::barrier::SumBarrier;
//! use trekker_core::types::Value;
//!
//! # fn main() -> anyhow::Result<()> {
//! let env = TraversalEnvironment::new("sum");
//! let out = env
//!     .from_iter([3i64, 1, 4, 1, 5].map(Value::from))
//!     .barrier(SumBarrier)
//!     .run_with_parallelism(2)?;
//! assert_eq!(out.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod coordinator;
pub mod environment;
pub mod traversal;

pub use environment::TraversalEnvironment;
pub use traversal::{BarrierJob, KeyedBarrierJob, KeyedTraverserStream, TraverserStream};
