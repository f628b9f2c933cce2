//! Error taxonomy for barrier execution.
//!
//! A barrier's result is only meaningful over its entire input set, so no
//! error is recoverable mid-activation: every variant propagates to the
//! pipeline caller and terminates the traversal.

use crate::activation::ActivationId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BarrierError {
    /// A traverser's value is outside the fold domain of this barrier,
    /// e.g. non-numeric input to a numeric aggregate. Never coerced or
    /// silently dropped.
    #[error("{barrier} barrier cannot fold a {kind} value")]
    Domain {
        barrier: &'static str,
        kind: &'static str,
    },

    /// A partial accumulator was absorbed into a different activation than
    /// the one that opened it. This is a coordinator programming error.
    #[error("partial opened by {found} absorbed into {expected}")]
    ActivationMismatch {
        expected: ActivationId,
        found: ActivationId,
    },

    /// A value's structural identity could not be encoded.
    #[error("failed to encode value identity: {0}")]
    ValueEncoding(#[from] bincode::Error),
}
