//! Scalar running aggregates: count, sum, min, max.
//!
//! Count is structurally generic. Sum/min/max fold the machine's dynamic
//! [`Value`] type and reject non-numeric kinds with a domain error.

use super::{BarrierDrain, BarrierFunction};
use crate::error::BarrierError;
use crate::types::{Number, Traverser, Value};

/// Counts traversers. The merge is addition; the identity is zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountBarrier;

impl<C, S> BarrierFunction<C, S> for CountBarrier
where
    C: Send,
    S: Send,
{
    type Barrier = u64;
    type Output = u64;

    fn initial(&self) -> u64 {
        0
    }

    fn fold(&self, _traverser: Traverser<C, S>, barrier: &mut u64) -> Result<(), BarrierError> {
        *barrier += 1;
        Ok(())
    }

    fn merge(&self, into: &mut u64, other: u64) {
        *into += other;
    }

    fn flush(&self, barrier: u64) -> BarrierDrain<u64> {
        BarrierDrain::once(barrier)
    }
}

/// Sums numeric values. `Int + Int` stays exact; mixing in a float
/// promotes the running sum to float.
///
/// Flushing an accumulator that never saw a value emits nothing: the sum
/// of an empty group is undefined, not zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct SumBarrier;

impl<C: Send> BarrierFunction<C, Value> for SumBarrier {
    type Barrier = Option<Number>;
    type Output = Value;

    fn initial(&self) -> Option<Number> {
        None
    }

    fn fold(
        &self,
        traverser: Traverser<C, Value>,
        barrier: &mut Option<Number>,
    ) -> Result<(), BarrierError> {
        let number = require_number("sum", traverser.value())?;
        *barrier = Some(match barrier.take() {
            None => number,
            Some(acc) => acc.add(number),
        });
        Ok(())
    }

    fn merge(&self, into: &mut Option<Number>, other: Option<Number>) {
        *into = match (into.take(), other) {
            (Some(a), Some(b)) => Some(a.add(b)),
            (a, b) => a.or(b),
        };
    }

    fn flush(&self, barrier: Option<Number>) -> BarrierDrain<Value> {
        match barrier {
            Some(n) => BarrierDrain::once(n.into_value()),
            None => BarrierDrain::empty(),
        }
    }
}

/// Running minimum over numeric values.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinBarrier;

impl<C: Send> BarrierFunction<C, Value> for MinBarrier {
    type Barrier = Option<Number>;
    type Output = Value;

    fn initial(&self) -> Option<Number> {
        None
    }

    fn fold(
        &self,
        traverser: Traverser<C, Value>,
        barrier: &mut Option<Number>,
    ) -> Result<(), BarrierError> {
        let number = require_number("min", traverser.value())?;
        *barrier = Some(match barrier.take() {
            None => number,
            Some(acc) => acc.min(number),
        });
        Ok(())
    }

    fn merge(&self, into: &mut Option<Number>, other: Option<Number>) {
        *into = match (into.take(), other) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
    }

    fn flush(&self, barrier: Option<Number>) -> BarrierDrain<Value> {
        match barrier {
            Some(n) => BarrierDrain::once(n.into_value()),
            None => BarrierDrain::empty(),
        }
    }
}

/// Running maximum over numeric values.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxBarrier;

impl<C: Send> BarrierFunction<C, Value> for MaxBarrier {
    type Barrier = Option<Number>;
    type Output = Value;

    fn initial(&self) -> Option<Number> {
        None
    }

    fn fold(
        &self,
        traverser: Traverser<C, Value>,
        barrier: &mut Option<Number>,
    ) -> Result<(), BarrierError> {
        let number = require_number("max", traverser.value())?;
        *barrier = Some(match barrier.take() {
            None => number,
            Some(acc) => acc.max(number),
        });
        Ok(())
    }

    fn merge(&self, into: &mut Option<Number>, other: Option<Number>) {
        *into = match (into.take(), other) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
    }

    fn flush(&self, barrier: Option<Number>) -> BarrierDrain<Value> {
        match barrier {
            Some(n) => BarrierDrain::once(n.into_value()),
            None => BarrierDrain::empty(),
        }
    }
}

fn require_number(barrier: &'static str, value: &Value) -> Result<Number, BarrierError> {
    value.as_number().ok_or(BarrierError::Domain {
        barrier,
        kind: value.kind(),
    })
}
