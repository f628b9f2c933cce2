use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Arrival index assigned by the machine when a traverser is admitted
/// into a barrier scope. Order-sensitive barriers record it as provenance
/// so merging partial accumulators in any order re-derives the same
/// total order.
pub type Ordinal = u64;

/// Trait bound for values and keys that can flow through the machine.
/// All user data types must satisfy this.
pub trait TraverserData:
    Send + Clone + Serialize + for<'de> Deserialize<'de> + 'static
{
}

// Blanket implementation: any type satisfying the bounds is TraverserData.
impl<T> TraverserData for T where
    T: Send + Clone + Serialize + for<'de> Deserialize<'de> + 'static
{
}

/// One in-flight computation token moving through the pipeline.
///
/// Carries a current value of type `S` within an execution context `C`,
/// plus the machine-assigned arrival [`Ordinal`]. Ownership passes into
/// [`BarrierFunction::fold`](crate::barrier::BarrierFunction::fold) and is
/// retained only if the fold captures the traverser into its accumulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Traverser<C, S> {
    context: C,
    value: S,
    ordinal: Ordinal,
}

impl<C, S> Traverser<C, S> {
    /// Admit a value into the pipeline under the given context.
    pub fn new(context: C, value: S, ordinal: Ordinal) -> Self {
        Self {
            context,
            value,
            ordinal,
        }
    }

    /// The current value.
    pub fn value(&self) -> &S {
        &self.value
    }

    /// The execution context.
    pub fn context(&self) -> &C {
        &self.context
    }

    /// The arrival index within the enclosing barrier scope.
    pub fn ordinal(&self) -> Ordinal {
        self.ordinal
    }

    /// Give up the token, keeping only its value.
    pub fn into_value(self) -> S {
        self.value
    }

    /// Decompose into (context, value, ordinal).
    pub fn into_parts(self) -> (C, S, Ordinal) {
        (self.context, self.value, self.ordinal)
    }
}

/// One element of a flushed barrier's output, as seen by the pipeline.
///
/// Barriers whose `emits_traversers` flag is set produce successor
/// traversers that re-enter the downstream pipeline; all other barriers
/// produce terminal result values.
#[derive(Debug, Clone, PartialEq)]
pub enum Emission<C, E> {
    /// Terminal result with no further traversal context attached.
    Value(E),
    /// Successor state re-admitted into the pipeline, carrying context.
    Traverser(Traverser<C, E>),
}

impl<C, E> Emission<C, E> {
    /// The payload, regardless of emission kind.
    pub fn into_value(self) -> E {
        match self {
            Emission::Value(v) => v,
            Emission::Traverser(t) => t.into_value(),
        }
    }

    /// True if this emission re-enters the pipeline as a traverser.
    pub fn is_traverser(&self) -> bool {
        matches!(self, Emission::Traverser(_))
    }
}

// --- Dynamic value model ---

/// A dynamically-typed machine value.
///
/// The traversal machine is dynamically typed: a single query may move
/// booleans, numbers, text, and lists through the same pipeline. Numeric
/// barriers (sum/min/max) fold [`Value`]s and reject non-numeric kinds
/// with a domain error instead of coercing or dropping them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Value>),
}

impl Value {
    /// Short kind name, used in error reporting.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::List(_) => "list",
        }
    }

    /// View this value as a number, if it is one.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Int(i) => Some(Number::Int(*i)),
            Value::Float(f) => Some(Number::Float(*f)),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// The machine's numeric tower: integers stay exact, mixed arithmetic
/// promotes to float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    /// Add; `Int + Int` stays `Int`, any float promotes. Integer
    /// addition wraps on overflow, matching the machine's two's-complement
    /// integer arithmetic, so a legal stream can never panic a fold.
    pub fn add(self, other: Number) -> Number {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Number::Int(a.wrapping_add(b)),
            (a, b) => Number::Float(a.as_f64() + b.as_f64()),
        }
    }

    /// Deterministic total ordering; mixed and float comparisons use
    /// `f64::total_cmp`, so NaN is ordered rather than poisonous.
    pub fn total_cmp(self, other: Number) -> Ordering {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a.cmp(&b),
            (a, b) => a.as_f64().total_cmp(&b.as_f64()),
        }
    }

    pub fn min(self, other: Number) -> Number {
        match self.total_cmp(other) {
            Ordering::Greater => other,
            _ => self,
        }
    }

    pub fn max(self, other: Number) -> Number {
        match self.total_cmp(other) {
            Ordering::Less => other,
            _ => self,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Number::Int(i) => Value::Int(i),
            Number::Float(f) => Value::Float(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_traverser_carries_context_and_ordinal() {
        let t = Traverser::new("ctx", 42i32, 7);
        assert_eq!(*t.value(), 42);
        assert_eq!(*t.context(), "ctx");
        assert_eq!(t.ordinal(), 7);
    }

    #[test]
    fn test_emission_kinds() {
        let value: Emission<(), i32> = Emission::Value(3);
        assert!(!value.is_traverser());
        assert_eq!(value.into_value(), 3);

        let trav: Emission<(), i32> = Emission::Traverser(Traverser::new((), 4, 0));
        assert!(trav.is_traverser());
        assert_eq!(trav.into_value(), 4);
    }

    #[test]
    fn test_value_kinds() {
        assert_eq!(Value::from(1i64).kind(), "int");
        assert_eq!(Value::from(1.5f64).kind(), "float");
        assert_eq!(Value::from("x").kind(), "text");
        assert_eq!(Value::from(true).kind(), "bool");
        assert_eq!(Value::List(vec![]).kind(), "list");
    }

    #[test]
    fn test_number_promotion() {
        assert_eq!(Number::Int(3).add(Number::Int(4)), Number::Int(7));
        assert_eq!(Number::Int(3).add(Number::Float(0.5)), Number::Float(3.5));
    }

    #[test]
    fn test_number_add_wraps_on_overflow() {
        let sum = Number::Int(i64::MAX).add(Number::Int(1));
        assert_eq!(sum, Number::Int(i64::MIN));
    }

    #[test]
    fn test_number_ordering() {
        assert_eq!(Number::Int(2).min(Number::Float(1.5)), Number::Float(1.5));
        assert_eq!(Number::Int(2).max(Number::Float(1.5)), Number::Int(2));
        assert_eq!(
            Number::Int(2).total_cmp(Number::Int(2)),
            Ordering::Equal
        );
    }

    #[test]
    fn test_non_numeric_values_have_no_number() {
        assert!(Value::from("text").as_number().is_none());
        assert!(Value::from(true).as_number().is_none());
        assert!(Value::List(vec![]).as_number().is_none());
    }

    #[test]
    fn test_traverser_data_trait() {
        // Verify common types satisfy TraverserData.
        fn assert_traverser_data<T: TraverserData>() {}
        assert_traverser_data::<i32>();
        assert_traverser_data::<String>();
        assert_traverser_data::<(String, i32)>();
        assert_traverser_data::<Value>();
    }
}
