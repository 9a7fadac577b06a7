//! Runtime values

use thiserror::Error;

use crate::{Function, Object};

/// Errors converting a [`Value`] into a Rust type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: &'static str, got: &'static str },

    #[error("at index {0}: {1}")]
    IndexError(usize, Box<ConversionError>),

    #[error("expected list, got {0}")]
    ExpectedList(&'static str),

    #[error("expected tuple of {expected}, got {got}")]
    ExpectedTuple { expected: usize, got: String },
}

/// A dynamic value passed into and out of intercepted functions.
///
/// Scalars, strings, lists and tuples are plain data and are cloned deeply.
/// `Object` and `Function` are handles: a clone refers to the same object or
/// body, and equality on them is identity.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// No value (an absent argument, a function without a result)
    #[default]
    Unit,
    Bool(bool),
    S32(i32),
    S64(i64),
    U64(u64),
    F64(f64),
    Char(char),
    String(String),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Object(Object),
    Function(Function),
}

impl Value {
    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Unit => "unit",
            Value::Bool(_) => "bool",
            Value::S32(_) => "s32",
            Value::S64(_) => "s64",
            Value::U64(_) => "u64",
            Value::F64(_) => "f64",
            Value::Char(_) => "char",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }

    /// Whether this is the absent value.
    pub fn is_unit(&self) -> bool {
        matches!(self, Value::Unit)
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Integer view across the signed and unsigned variants.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::S32(x) => Some(i64::from(*x)),
            Value::S64(x) => Some(*x),
            Value::U64(x) => i64::try_from(*x).ok(),
            _ => None,
        }
    }

    /// Whether both values are the same object or function, or equal data otherwise.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (a, b) => a == b,
        }
    }
}

/// Read the positional argument `index`, converting it to `T`.
///
/// A position past the end of `args` reads as `Value::Unit`, so optional
/// trailing arguments can be taken as `Option<T>`.
pub fn arg<T: FromValue>(args: &[Value], index: usize) -> Result<T, ConversionError> {
    let value = args.get(index).cloned().unwrap_or(Value::Unit);
    T::from_value(value).map_err(|e| ConversionError::IndexError(index, Box::new(e)))
}

// ============================================================================
// From implementations
// ============================================================================

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Unit
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::S32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::S64(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::U64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Char(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Object> for Value {
    fn from(v: Object) -> Self {
        Value::Object(v)
    }
}

impl From<Function> for Value {
    fn from(v: Function) -> Self {
        Value::Function(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Unit)
    }
}

impl<A: Into<Value>, B: Into<Value>> From<(A, B)> for Value {
    fn from((a, b): (A, B)) -> Self {
        Value::Tuple(vec![a.into(), b.into()])
    }
}

impl<A: Into<Value>, B: Into<Value>, C: Into<Value>> From<(A, B, C)> for Value {
    fn from((a, b, c): (A, B, C)) -> Self {
        Value::Tuple(vec![a.into(), b.into(), c.into()])
    }
}

// ============================================================================
// TryFrom implementations
// ============================================================================

impl TryFrom<Value> for bool {
    type Error = ConversionError;
    fn try_from(v: Value) -> Result<Self, Self::Error> {
        match v {
            Value::Bool(x) => Ok(x),
            other => Err(ConversionError::TypeMismatch {
                expected: "bool",
                got: other.kind(),
            }),
        }
    }
}

impl TryFrom<Value> for i32 {
    type Error = ConversionError;
    fn try_from(v: Value) -> Result<Self, Self::Error> {
        match v {
            Value::S32(x) => Ok(x),
            other => Err(ConversionError::TypeMismatch {
                expected: "s32",
                got: other.kind(),
            }),
        }
    }
}

/// Widens `S32` and accepts `U64` values that fit.
impl TryFrom<Value> for i64 {
    type Error = ConversionError;
    fn try_from(v: Value) -> Result<Self, Self::Error> {
        v.as_i64().ok_or(ConversionError::TypeMismatch {
            expected: "s64",
            got: v.kind(),
        })
    }
}

impl TryFrom<Value> for u64 {
    type Error = ConversionError;
    fn try_from(v: Value) -> Result<Self, Self::Error> {
        match v {
            Value::U64(x) => Ok(x),
            other => Err(ConversionError::TypeMismatch {
                expected: "u64",
                got: other.kind(),
            }),
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = ConversionError;
    fn try_from(v: Value) -> Result<Self, Self::Error> {
        match v {
            Value::F64(x) => Ok(x),
            other => Err(ConversionError::TypeMismatch {
                expected: "f64",
                got: other.kind(),
            }),
        }
    }
}

impl TryFrom<Value> for char {
    type Error = ConversionError;
    fn try_from(v: Value) -> Result<Self, Self::Error> {
        match v {
            Value::Char(x) => Ok(x),
            other => Err(ConversionError::TypeMismatch {
                expected: "char",
                got: other.kind(),
            }),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = ConversionError;
    fn try_from(v: Value) -> Result<Self, Self::Error> {
        match v {
            Value::String(x) => Ok(x),
            other => Err(ConversionError::TypeMismatch {
                expected: "string",
                got: other.kind(),
            }),
        }
    }
}

impl TryFrom<Value> for Object {
    type Error = ConversionError;
    fn try_from(v: Value) -> Result<Self, Self::Error> {
        match v {
            Value::Object(x) => Ok(x),
            other => Err(ConversionError::TypeMismatch {
                expected: "object",
                got: other.kind(),
            }),
        }
    }
}

impl TryFrom<Value> for Function {
    type Error = ConversionError;
    fn try_from(v: Value) -> Result<Self, Self::Error> {
        match v {
            Value::Function(x) => Ok(x),
            other => Err(ConversionError::TypeMismatch {
                expected: "function",
                got: other.kind(),
            }),
        }
    }
}

impl<T: FromValue> TryFrom<Value> for Vec<T> {
    type Error = ConversionError;
    fn try_from(v: Value) -> Result<Self, Self::Error> {
        match v {
            Value::List(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| {
                    T::from_value(item).map_err(|e| ConversionError::IndexError(i, Box::new(e)))
                })
                .collect(),
            other => Err(ConversionError::ExpectedList(other.kind())),
        }
    }
}

impl<A: FromValue, B: FromValue> TryFrom<Value> for (A, B) {
    type Error = ConversionError;
    fn try_from(v: Value) -> Result<Self, Self::Error> {
        match v {
            Value::Tuple(items) if items.len() == 2 => {
                let mut items = items.into_iter();
                let a = A::from_value(items.next().unwrap_or_default())
                    .map_err(|e| ConversionError::IndexError(0, Box::new(e)))?;
                let b = B::from_value(items.next().unwrap_or_default())
                    .map_err(|e| ConversionError::IndexError(1, Box::new(e)))?;
                Ok((a, b))
            }
            other => Err(ConversionError::ExpectedTuple {
                expected: 2,
                got: other.kind().to_string(),
            }),
        }
    }
}

// ============================================================================
// FromValue trait - avoids coherence issues with TryFrom for Option<T>
// ============================================================================

/// Conversion out of a [`Value`].
///
/// Exists alongside `TryFrom<Value>` because a blanket `TryFrom` impl for
/// `Option<T>` would overlap with the standard library's reflexive impls.
pub trait FromValue: Sized {
    fn from_value(v: Value) -> Result<Self, ConversionError>;
}

impl<T: TryFrom<Value, Error = ConversionError>> FromValue for T {
    fn from_value(v: Value) -> Result<Self, ConversionError> {
        T::try_from(v)
    }
}

/// `Value::Unit` maps to `None`.
impl<T: FromValue> FromValue for Option<T> {
    fn from_value(v: Value) -> Result<Self, ConversionError> {
        match v {
            Value::Unit => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

// ============================================================================
// Serialization
// ============================================================================

#[cfg(feature = "serde")]
impl serde::Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Unit => serializer.serialize_unit(),
            Value::Bool(x) => serializer.serialize_bool(*x),
            Value::S32(x) => serializer.serialize_i32(*x),
            Value::S64(x) => serializer.serialize_i64(*x),
            Value::U64(x) => serializer.serialize_u64(*x),
            Value::F64(x) => serializer.serialize_f64(*x),
            Value::Char(x) => serializer.serialize_char(*x),
            Value::String(x) => serializer.serialize_str(x),
            Value::List(items) | Value::Tuple(items) => serializer.collect_seq(items),
            Value::Object(obj) => serde::Serialize::serialize(obj, serializer),
            Value::Function(f) => serializer.collect_str(&format_args!(
                "[function {}]",
                f.name().unwrap_or("<anonymous>")
            )),
        }
    }
}

/// A value held in an object slot.
///
/// Objects reached through a slot serialize as their sorted key list, so an
/// object that refers back to itself still produces finite output.
#[cfg(feature = "serde")]
pub(crate) struct Nested<'a>(pub(crate) &'a Value);

#[cfg(feature = "serde")]
impl serde::Serialize for Nested<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Value::Object(obj) => serializer.collect_seq(obj.keys()),
            Value::List(items) | Value::Tuple(items) => {
                serializer.collect_seq(items.iter().map(Nested))
            }
            other => serde::Serialize::serialize(other, serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arg_reads_positions_and_pads_with_unit() {
        let args = vec![Value::from(1i64), Value::from("two")];
        assert_eq!(arg::<i64>(&args, 0), Ok(1));
        assert_eq!(arg::<String>(&args, 1), Ok("two".to_string()));
        assert_eq!(arg::<Option<i64>>(&args, 2), Ok(None));
        assert_eq!(arg::<Option<String>>(&args, 5), Ok(None));
    }

    #[test]
    fn arg_reports_index_of_bad_argument() {
        let args = vec![Value::from(true)];
        let err = arg::<i64>(&args, 0).unwrap_err();
        assert_eq!(
            err,
            ConversionError::IndexError(
                0,
                Box::new(ConversionError::TypeMismatch {
                    expected: "s64",
                    got: "bool"
                })
            )
        );
    }

    #[test]
    fn i64_widens_smaller_integers() {
        assert_eq!(i64::try_from(Value::S32(-3)), Ok(-3));
        assert_eq!(i64::try_from(Value::U64(7)), Ok(7));
        assert!(i64::try_from(Value::U64(u64::MAX)).is_err());
    }

    #[test]
    fn handles_compare_by_identity() {
        let obj = Object::new();
        assert!(Value::from(obj.clone()).same(&Value::from(obj.clone())));
        assert!(!Value::from(obj).same(&Value::from(Object::new())));
        assert!(Value::from(vec![1i64, 2]).same(&Value::from(vec![1i64, 2])));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_objects_and_functions() {
        let obj = Object::new();
        obj.set("n", 1i64);
        obj.set("f", Function::named("f", |_, _| Ok(Value::Unit)));
        let json = serde_json::to_string(&Value::from(vec![Value::from(obj)])).unwrap();
        assert_eq!(json, r#"[{"f":"[function f]","n":1}]"#);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn self_referencing_object_serializes_finitely() {
        let obj = Object::new();
        obj.set("n", 1i64);
        obj.set("me", obj.clone());
        obj.set("peers", vec![Value::from(obj.clone())]);
        let json = serde_json::to_string(&Value::from(obj.clone())).unwrap();
        assert_eq!(json, r#"{"me":["me","n","peers"],"n":1,"peers":[["me","n","peers"]]}"#);

        // Break the cycle so the test does not leak.
        obj.remove("me");
        obj.remove("peers");
    }
}
