//! Betray: intercept named functions for test doubles
//!
//! Replaces a function slot on an object with a proxy that records every call
//! and can short-circuit to caller-supplied behavior, until the original is
//! put back.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │                 betray                  │
//! │                                         │
//! │  interceptor - proxy, ledger, restore   │
//! │  strategy    - match/handle pairs       │
//! │  tracker     - bulk restore             │
//! │                                         │
//! ├─────────────────────────────────────────┤
//! │   betray-value (Value, Object, slots)   │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use betray::intercept;
//! use betray_value::{Function, Object, Value};
//!
//! let math = Object::new();
//! math.set("add", Function::new(|_, args| {
//!     let x: i64 = betray_value::arg(args, 0)?;
//!     let y: i64 = betray_value::arg(args, 1)?;
//!     Ok(Value::from(x + y))
//! }));
//!
//! let add = intercept(&math, "add", ()).unwrap();
//! add.on_first_call(|| Ok(Value::from(1i64)))
//!     .on_second_call(|| Ok(Value::from(2i64)));
//!
//! let args = [Value::from(2i64), Value::from(3i64)];
//! assert_eq!(math.call("add", &args).unwrap(), Value::S64(1));
//! assert_eq!(math.call("add", &args).unwrap(), Value::S64(2));
//! assert_eq!(math.call("add", &args).unwrap(), Value::S64(5));
//! assert_eq!(add.invocation_count(), 3);
//!
//! add.restore();
//! assert!(!add.is_installed());
//! ```

pub mod error;
pub mod interceptor;
pub mod strategy;
pub mod tracker;

pub use betray_value::{Function, Object, SlotTarget, Value};
pub use error::InterceptError;
pub use interceptor::{intercept, Interceptor, LedgerSnapshot};
pub use strategy::{Invocation, Strategies, Strategy};
pub use tracker::{create_tracker, Tracker};
