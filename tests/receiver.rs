//! Receiver binding through the proxy

mod common;

use betray::{intercept, Function, Object, Value};
use betray_value::arg;

/// `Num.prototype.add = function(y) { return this.x + y }`
fn num_prototype() -> Object {
    let proto = Object::new();
    proto.set(
        "add",
        Function::named("add", |this, args| {
            let this: Object = this.clone().try_into()?;
            let x: i64 = this.get("x").unwrap_or_default().try_into()?;
            let y: i64 = arg(args, 0)?;
            Ok(Value::from(x + y))
        }),
    );
    proto
}

fn num(proto: &Object, x: i64) -> Object {
    let num = Object::with_prototype(proto);
    num.set("x", x);
    num
}

#[test]
fn test_prototype_method_keeps_instance_receiver() {
    let proto = num_prototype();
    let one = num(&proto, 1);

    let handle = intercept(&proto, "add", ()).expect("intercept");

    assert_eq!(one.call("add", &[Value::from(2i64)]).unwrap(), Value::S64(3));
    assert_eq!(handle.invocation_count(), 1);
}

#[test]
fn test_every_instance_goes_through_the_prototype_proxy() {
    let proto = num_prototype();
    let one = num(&proto, 1);
    let ten = num(&proto, 10);

    let handle = intercept(&proto, "add", ()).expect("intercept");
    handle.when(
        |call| {
            call.this()
                .as_object()
                .and_then(|o| o.get("x"))
                .is_some_and(|x| x == Value::S64(10))
        },
        |_| Ok(Value::from("ten")),
    );

    assert_eq!(one.call("add", &[Value::from(1i64)]).unwrap(), Value::S64(2));
    assert_eq!(ten.call("add", &[Value::from(1i64)]).unwrap(), Value::from("ten"));
    assert_eq!(handle.invocation_count(), 2);

    handle.restore();
    assert_eq!(ten.call("add", &[Value::from(1i64)]).unwrap(), Value::S64(11));
}

#[test]
fn test_callable_substitute_sees_receiver() {
    let proto = num_prototype();
    let five = num(&proto, 5);

    let double_x = Function::new(|this, _| {
        let this: Object = this.clone().try_into()?;
        let x: i64 = this.get("x").unwrap_or_default().try_into()?;
        Ok(Value::from(x * 2))
    });
    intercept(&proto, "add", double_x).expect("intercept");

    assert_eq!(five.call("add", &[Value::from(100i64)]).unwrap(), Value::S64(10));
}

#[test]
fn test_instance_slot_shadows_prototype_interception() {
    let proto = num_prototype();
    let one = num(&proto, 1);
    let handle = intercept(&proto, "add", Value::from(0i64)).expect("intercept");

    one.set("add", Function::new(|_, _| Ok(Value::from("own"))));

    assert_eq!(one.call("add", &[]).unwrap(), Value::from("own"));
    assert_eq!(handle.invocation_count(), 0);
}

#[test]
fn test_unbound_call_through_proxy() {
    let proto = num_prototype();
    let handle = intercept(&proto, "add", ()).expect("intercept");

    let err = handle.proxy().call_unbound(&[Value::from(1i64)]).unwrap_err();
    assert!(err.downcast_ref::<betray_value::ConversionError>().is_some());
    assert_eq!(handle.invocation_count(), 1);
}
