//! Shared fixtures for integration tests.
#![allow(dead_code)]

use betray::{Function, Object, Value};
use betray_value::arg;
use thiserror::Error;

/// Error thrown by fixture functions, so tests can check it survives the proxy.
#[derive(Error, Debug, PartialEq)]
#[error("{0}")]
pub struct Thrown(pub String);

/// `{ add: (x, y) => x + y, throwError: () => throw "Restored" }`
pub fn math() -> Object {
    let math = Object::new();
    math.set(
        "add",
        Function::named("add", |_, args| {
            let x: i64 = arg(args, 0)?;
            let y: i64 = arg(args, 1)?;
            Ok(Value::from(x + y))
        }),
    );
    math.set(
        "throwError",
        Function::named("throwError", |_, _| Err(Thrown("Restored".into()).into())),
    );
    math
}

pub fn add(math: &Object, x: i64, y: i64) -> Value {
    math.call("add", &[Value::from(x), Value::from(y)])
        .expect("add should not fail")
}

pub fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().copied().map(Value::from).collect()
}

/// Route `tracing` output to the test harness. Set `RUST_LOG=betray=trace` to see it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
