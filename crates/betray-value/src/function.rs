//! Shareable callables

use std::fmt;
use std::sync::Arc;

use crate::Value;

type Body = dyn Fn(&Value, &[Value]) -> anyhow::Result<Value> + Send + Sync;

/// A callable that can live in an object slot.
///
/// Cloning a `Function` shares the same body, so two clones compare equal and
/// [`Function::ptr_eq`] holds. Two separately constructed functions are never
/// equal, even if their bodies are the same.
///
/// The first parameter of the body is the receiver (the value the call was
/// dispatched on, usually `Value::Object`), the second the argument list.
#[derive(Clone)]
pub struct Function {
    name: Option<Arc<str>>,
    body: Arc<Body>,
}

impl Function {
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: None,
            body: Arc::new(body),
        }
    }

    /// Create a function carrying a name, used only for `Debug` output and serialization.
    pub fn named<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: Some(Arc::from(name.into())),
            body: Arc::new(body),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Invoke the body with an explicit receiver.
    ///
    /// Errors raised by the body are returned as-is.
    pub fn call(&self, this: &Value, args: &[Value]) -> anyhow::Result<Value> {
        (self.body)(this, args)
    }

    /// Invoke the body with `Value::Unit` as receiver.
    pub fn call_unbound(&self, args: &[Value]) -> anyhow::Result<Value> {
        self.call(&Value::Unit, args)
    }

    /// Whether both handles point at the same body.
    pub fn ptr_eq(&self, other: &Function) -> bool {
        Arc::ptr_eq(&self.body, &other.body)
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "Function({})", name),
            None => write!(f, "Function(<anonymous>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_identity() {
        let f = Function::new(|_, _| Ok(Value::Unit));
        let g = f.clone();
        assert!(f.ptr_eq(&g));
        assert_eq!(f, g);
    }

    #[test]
    fn identical_bodies_are_distinct_functions() {
        let f = Function::new(|_, _| Ok(Value::Unit));
        let g = Function::new(|_, _| Ok(Value::Unit));
        assert_ne!(f, g);
    }

    #[test]
    fn receiver_is_passed_through() {
        let f = Function::new(|this, _| Ok(this.clone()));
        let out = f.call(&Value::from("me"), &[]).unwrap();
        assert_eq!(out, Value::String("me".into()));
        assert_eq!(f.call_unbound(&[]).unwrap(), Value::Unit);
    }
}
