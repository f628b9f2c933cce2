use trekker_api::TraversalEnvironment;
use trekker_core::barrier::{CountBarrier, DedupBarrier, GroupBarrier, OrderBarrier, SumBarrier};
use trekker_core::types::{Emission, Value};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[test]
fn test_sum_single_unit() {
    init_tracing();
    let env = TraversalEnvironment::new("sum-single");

    let out = env
        .from_iter([3i64, 1, 4, 1, 5].map(Value::from))
        .barrier(SumBarrier)
        .run_with_parallelism(1)
        .unwrap();

    assert_eq!(out, vec![Emission::Value(Value::Int(14))]);
}

#[test]
fn test_sum_split_across_units() {
    init_tracing();
    let env = TraversalEnvironment::new("sum-split");

    let out = env
        .from_iter([3i64, 1, 4, 1, 5].map(Value::from))
        .barrier(SumBarrier)
        .run_with_parallelism(2)
        .unwrap();

    // Same result as the single-unit run: split-invariance.
    assert_eq!(out, vec![Emission::Value(Value::Int(14))]);
}

#[test]
fn test_count_parallel() {
    let env = TraversalEnvironment::new("count");

    let out = env
        .from_iter(0i64..100)
        .barrier(CountBarrier)
        .run_with_parallelism(4)
        .unwrap();

    assert_eq!(out, vec![Emission::Value(100u64)]);
}

#[test]
fn test_count_of_empty_stream() {
    let env = TraversalEnvironment::new("count-empty");

    let out = env
        .from_iter(std::iter::empty::<i64>())
        .barrier(CountBarrier)
        .run_with_parallelism(2)
        .unwrap();

    assert_eq!(out, vec![Emission::Value(0u64)]);
}

#[test]
fn test_group_collects_per_key() {
    let env = TraversalEnvironment::new("group");

    let pairs = vec![
        ("a".to_string(), 1i32),
        ("b".to_string(), 2),
        ("a".to_string(), 3),
    ];

    let out = env
        .from_iter(pairs)
        .barrier(GroupBarrier::by(|(k, _): &(String, i32)| k.clone()))
        .run_with_parallelism(3)
        .unwrap();

    let groups: Vec<(String, Vec<(String, i32)>)> =
        out.into_iter().map(Emission::into_value).collect();
    assert_eq!(
        groups,
        vec![
            (
                "a".to_string(),
                vec![("a".to_string(), 1), ("a".to_string(), 3)]
            ),
            ("b".to_string(), vec![("b".to_string(), 2)]),
        ]
    );
}

#[test]
fn test_order_reinjects_traversers_with_context() {
    init_tracing();
    let env = TraversalEnvironment::new("order");

    let out = env
        .from_iter_with_context("query-7".to_string(), vec![3i32, 1, 2])
        .barrier(OrderBarrier::by(|v: &i32| *v))
        .run_with_parallelism(2)
        .unwrap();

    // Every emission of an ordering barrier re-enters the pipeline.
    assert!(out.iter().all(Emission::is_traverser));
    for (i, emission) in out.iter().enumerate() {
        match emission {
            Emission::Traverser(t) => {
                assert_eq!(t.context(), "query-7");
                assert_eq!(t.ordinal(), i as u64);
            }
            Emission::Value(_) => unreachable!(),
        }
    }
    let values: Vec<i32> = out.into_iter().map(Emission::into_value).collect();
    assert_eq!(values, vec![1, 2, 3]);
}

#[test]
fn test_dedup_keeps_first_occurrences() {
    let env = TraversalEnvironment::new("dedup");

    let out = env
        .from_iter(vec![
            "b".to_string(),
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
        ])
        .barrier(DedupBarrier)
        .run_with_parallelism(2)
        .unwrap();

    assert!(out.iter().all(Emission::is_traverser));
    let values: Vec<String> = out.into_iter().map(Emission::into_value).collect();
    assert_eq!(values, vec!["b", "a", "c"]);
}

#[test]
fn test_domain_error_fails_whole_traversal() {
    init_tracing();
    let env = TraversalEnvironment::new("sum-domain");

    let result = env
        .from_iter(vec![Value::Int(3), Value::from("oops"), Value::Int(4)])
        .barrier(SumBarrier)
        .run_with_parallelism(2)
        .unwrap_err();

    // The fold error surfaces; no partial sum leaks out.
    assert!(result.to_string().contains("barrier fold failed"));
}

#[test]
fn test_domain_error_single_unit() {
    let env = TraversalEnvironment::new("sum-domain-single");

    let result = env
        .from_iter(vec![Value::from(true)])
        .barrier(SumBarrier)
        .run_with_parallelism(1);

    assert!(result.is_err());
}

#[test]
fn test_sum_of_empty_stream_emits_nothing() {
    let env = TraversalEnvironment::new("sum-empty");

    let out = env
        .from_iter(std::iter::empty::<Value>())
        .barrier(SumBarrier)
        .run_with_parallelism(2)
        .unwrap();

    assert!(out.is_empty());
}
