use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use trekker_api::TraversalEnvironment;
use trekker_core::barrier::{CountBarrier, OrderBarrier, SumBarrier};
use trekker_core::types::{Emission, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Transaction {
    user: String,
    amount: i64,
}

impl Transaction {
    fn new(user: &str, amount: i64) -> Self {
        Self {
            user: user.to_string(),
            amount,
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn words() -> Vec<String> {
    "the quick fox jumps over the lazy fox the"
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_keyed_count() {
    init_tracing();
    let env = TraversalEnvironment::new("wordcount");

    let counts = env
        .from_iter(words())
        .key_by(|word: &String| word.clone())
        .barrier(CountBarrier)
        .run_with_parallelism(4)
        .unwrap();

    assert_eq!(counts.len(), 6);
    assert_eq!(counts["the"], vec![Emission::Value(3u64)]);
    assert_eq!(counts["fox"], vec![Emission::Value(2u64)]);
    for word in ["quick", "jumps", "over", "lazy"] {
        assert_eq!(counts[word], vec![Emission::Value(1u64)]);
    }
}

#[test]
fn test_keyed_count_parity_across_parallelism() {
    let env = TraversalEnvironment::new("wordcount-parity");

    let sequential = env
        .from_iter(words())
        .key_by(|word: &String| word.clone())
        .barrier(CountBarrier)
        .run_with_parallelism(1)
        .unwrap();
    let parallel = env
        .from_iter(words())
        .key_by(|word: &String| word.clone())
        .barrier(CountBarrier)
        .run_with_parallelism(4)
        .unwrap();

    assert_eq!(sequential, parallel);
}

#[test]
fn test_keyed_order_sorts_within_each_key() {
    let env = TraversalEnvironment::new("keyed-order");

    let transactions = vec![
        Transaction::new("alice", 30),
        Transaction::new("bob", 5),
        Transaction::new("alice", 10),
        Transaction::new("bob", 50),
        Transaction::new("alice", 20),
    ];

    let ordered = env
        .from_iter(transactions)
        .key_by(|t: &Transaction| t.user.clone())
        .barrier(OrderBarrier::by(|t: &Transaction| t.amount))
        .run_with_parallelism(2)
        .unwrap();

    let amounts = |user: &str| -> Vec<i64> {
        ordered[user]
            .iter()
            .cloned()
            .map(|e| {
                assert!(e.is_traverser());
                e.into_value().amount
            })
            .collect()
    };
    assert_eq!(amounts("alice"), vec![10, 20, 30]);
    assert_eq!(amounts("bob"), vec![5, 50]);
}

#[test]
fn test_keyed_domain_error_fails_job() {
    init_tracing();
    let env = TraversalEnvironment::new("keyed-sum-domain");

    let values = vec![
        Value::Int(1),
        Value::Int(2),
        Value::from("not a number"),
        Value::Float(0.5),
    ];

    let result = env
        .from_iter(values)
        .key_by(|v: &Value| v.kind().to_string())
        .barrier(SumBarrier)
        .run_with_parallelism(2);

    assert!(result.is_err());
}

#[test]
fn test_keyed_sum_per_kind() {
    let env = TraversalEnvironment::new("keyed-sum");

    let values = vec![
        Value::Int(1),
        Value::Float(0.5),
        Value::Int(2),
        Value::Float(1.5),
    ];

    let sums: HashMap<String, _> = env
        .from_iter(values)
        .key_by(|v: &Value| v.kind().to_string())
        .barrier(SumBarrier)
        .run_with_parallelism(3)
        .unwrap();

    assert_eq!(sums["int"], vec![Emission::Value(Value::Int(3))]);
    assert_eq!(sums["float"], vec![Emission::Value(Value::Float(2.0))]);
}

#[test]
fn test_keyed_empty_stream_has_no_groups() {
    let env = TraversalEnvironment::new("keyed-empty");

    let counts = env
        .from_iter(std::iter::empty::<String>())
        .key_by(|word: &String| word.clone())
        .barrier(CountBarrier)
        .run_with_parallelism(2)
        .unwrap();

    assert!(counts.is_empty());
}
