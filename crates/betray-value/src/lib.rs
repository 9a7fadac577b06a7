//! Dynamic values for the betray interceptor.
//!
//! Rust has no object model where a method is just a named, overwritable
//! property. This crate supplies a small one:
//!
//! - [`Value`] - a dynamic value, passed as arguments and returned from calls
//! - [`Function`] - a shareable callable taking a receiver and an argument list
//! - [`Object`] - a shared table of named slots with an optional prototype
//! - [`SlotTarget`] - the read/write capability an interceptor needs on a target
//!
//! ```
//! use betray_value::{arg, Function, Object, Value};
//!
//! let math = Object::new();
//! math.set(
//!     "add",
//!     Function::named("add", |_this, args| {
//!         let x: i64 = arg(args, 0)?;
//!         let y: i64 = arg(args, 1)?;
//!         Ok(Value::from(x + y))
//!     }),
//! );
//!
//! let sum = math.call("add", &[Value::from(1i64), Value::from(2i64)]).unwrap();
//! assert_eq!(sum, Value::S64(3));
//! ```

mod function;
mod object;
mod value;

pub use function::Function;
pub use object::{Object, SlotError, SlotTarget};
pub use value::{arg, ConversionError, FromValue, Value};
