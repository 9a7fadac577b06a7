//! Shared objects with named slots

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use crate::{Function, Value};

/// Errors raised when calling a slot by name.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SlotError {
    #[error("no slot named '{0}'")]
    Missing(String),

    #[error("slot '{name}' holds {found}, not a function")]
    NotCallable { name: String, found: &'static str },
}

/// Read/write access to named, replaceable slots.
///
/// This is all an interceptor needs from its target: read the current value
/// of a slot and overwrite it. [`Object`] implements it; anything else that
/// keeps callables in a table can too.
pub trait SlotTarget: Send + Sync {
    /// Current value of the slot, or `None` if it does not exist.
    fn get_slot(&self, name: &str) -> Option<Value>;

    /// Overwrite (or create) the slot.
    fn set_slot(&self, name: &str, value: Value);
}

struct ObjectInner {
    slots: RwLock<HashMap<String, Value>>,
    prototype: Option<Object>,
}

/// A shared table of named slots.
///
/// `Object` is a handle: clones refer to the same table and compare equal.
/// Reads fall back to the prototype chain, writes always land on the object
/// itself.
///
/// With the `serde` feature an object serializes as a map of its own slots;
/// objects nested in those slots are written as their key list only.
#[derive(Clone)]
pub struct Object {
    inner: Arc<ObjectInner>,
}

impl Object {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ObjectInner {
                slots: RwLock::new(HashMap::new()),
                prototype: None,
            }),
        }
    }

    /// Create an empty object whose reads fall back to `prototype`.
    pub fn with_prototype(prototype: &Object) -> Self {
        Self {
            inner: Arc::new(ObjectInner {
                slots: RwLock::new(HashMap::new()),
                prototype: Some(prototype.clone()),
            }),
        }
    }

    pub fn prototype(&self) -> Option<&Object> {
        self.inner.prototype.as_ref()
    }

    /// Look up a slot on this object, then along the prototype chain.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.get_own(name) {
            return Some(value);
        }
        self.inner.prototype.as_ref().and_then(|proto| proto.get(name))
    }

    /// Look up a slot on this object only.
    pub fn get_own(&self, name: &str) -> Option<Value> {
        self.inner.slots.read().get(name).cloned()
    }

    /// Set a slot on this object, returning the previous own value.
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.inner.slots.write().insert(name.into(), value.into())
    }

    pub fn remove(&self, name: &str) -> Option<Value> {
        self.inner.slots.write().remove(name)
    }

    /// Names of the object's own slots, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.slots.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Resolve `name` to a function.
    pub fn method(&self, name: &str) -> Result<Function, SlotError> {
        match self.get(name) {
            Some(Value::Function(f)) => Ok(f),
            Some(other) => Err(SlotError::NotCallable {
                name: name.to_string(),
                found: other.kind(),
            }),
            None => Err(SlotError::Missing(name.to_string())),
        }
    }

    /// Call the function in slot `name` with this object as receiver.
    ///
    /// The slot is read fresh on every call and the table lock is released
    /// before the body runs, so the body may freely read or rewrite slots.
    pub fn call(&self, name: &str, args: &[Value]) -> anyhow::Result<Value> {
        let function = self.method(name)?;
        function.call(&Value::Object(self.clone()), args)
    }

    pub fn ptr_eq(&self, other: &Object) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Slot values are not printed: an object may reach itself through them.
        f.debug_struct("Object")
            .field("slots", &self.keys())
            .field("has_prototype", &self.inner.prototype.is_some())
            .finish()
    }
}

impl SlotTarget for Object {
    fn get_slot(&self, name: &str) -> Option<Value> {
        self.get(name)
    }

    fn set_slot(&self, name: &str, value: Value) {
        self.set(name, value);
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Object {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let slots = self.inner.slots.read();
        let mut keys: Vec<&String> = slots.keys().collect();
        keys.sort();
        let mut map = serializer.serialize_map(Some(keys.len()))?;
        for key in keys {
            map.serialize_entry(key, &crate::value::Nested(&slots[key]))?;
        }
        map.end()
    }
}
