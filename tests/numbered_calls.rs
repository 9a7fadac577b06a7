//! Overriding specific calls by number

mod common;

use betray::{intercept, Value};
use common::{add, math};

#[test]
fn test_convenience_functions_for_numbered_calls() {
    let math = math();
    intercept(&math, "add", ())
        .expect("intercept")
        .on_first_call(|| Ok(Value::from(1i64)))
        .on_second_call(|| Ok(Value::from(2i64)))
        .on_third_call(|| Ok(Value::from(3i64)))
        .on_call(4, || Ok(Value::from(4i64)));

    assert_eq!(add(&math, 2, 3), Value::S64(1));
    assert_eq!(add(&math, 2, 3), Value::S64(2));
    assert_eq!(add(&math, 2, 3), Value::S64(3));
    assert_eq!(add(&math, 2, 3), Value::S64(4));
    assert_eq!(add(&math, 2, 3), Value::S64(5));
}

#[test]
fn test_on_call_affects_only_its_call() {
    let math = math();
    let handle = intercept(&math, "add", ()).expect("intercept");
    handle.on_call(3, || Ok(Value::from("third")));

    let results: Vec<Value> = (0..5).map(|_| add(&math, 1, 1)).collect();
    assert_eq!(
        results,
        vec![
            Value::S64(2),
            Value::S64(2),
            Value::from("third"),
            Value::S64(2),
            Value::S64(2),
        ]
    );
    assert_eq!(handle.invocation_count(), 5);
}

#[test]
fn test_numbering_counts_from_interception_not_from_configuration() {
    let math = math();
    let handle = intercept(&math, "add", ()).expect("intercept");
    add(&math, 1, 1);
    add(&math, 1, 1);

    // Call 2 has already happened, so this never fires.
    handle.on_second_call(|| Ok(Value::from("late")));
    assert_eq!(add(&math, 1, 1), Value::S64(2));

    handle.on_call(4, || Ok(Value::from("fourth")));
    assert_eq!(add(&math, 1, 1), Value::from("fourth"));
}

#[test]
fn test_earlier_strategy_preempts_numbered_call() {
    let math = math();
    let handle = intercept(&math, "add", ()).expect("intercept");
    handle
        .when(
            |call| call.arg::<i64>(0).is_ok_and(|x| x == 0),
            |_| Ok(Value::from("zero")),
        )
        .on_first_call(|| Ok(Value::from("first")));

    assert_eq!(add(&math, 0, 1), Value::from("zero"));
    assert_eq!(add(&math, 1, 1), Value::S64(2));
}

#[test]
fn test_numbered_call_ignores_arguments() {
    let math = math();
    intercept(&math, "add", ())
        .expect("intercept")
        .on_first_call(|| Ok(Value::from("first")));

    // Arguments that the original would reject are never inspected.
    let result = math.call("add", &[Value::from("not a number")]).unwrap();
    assert_eq!(result, Value::from("first"));
}

#[test]
fn test_numbered_calls_stack_with_constructor_strategies() {
    let math = math();
    let handle = intercept(&math, "add", Value::from(0i64)).expect("intercept");
    handle.on_first_call(|| Ok(Value::from("unreachable")));

    assert_eq!(add(&math, 1, 1), Value::S64(0));
}
