//! Strategies: when to override a call, and with what.
//!
//! A [`Strategy`] pairs a match predicate with a handler. An interceptor keeps
//! its strategies in insertion order and, for each call, runs the handler of
//! the first strategy whose predicate holds. When none holds, the original
//! function runs.

use std::fmt;
use std::sync::Arc;

use betray_value::{Function, Value};

type Matcher = dyn Fn(&Invocation<'_>) -> bool + Send + Sync;
type Handler = dyn Fn(&Invocation<'_>) -> anyhow::Result<Value> + Send + Sync;

/// The call currently being dispatched by a proxy.
///
/// Handed to both predicates and handlers.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    this: &'a Value,
    args: &'a [Value],
    number: usize,
}

impl<'a> Invocation<'a> {
    pub(crate) fn new(this: &'a Value, args: &'a [Value], number: usize) -> Self {
        Self { this, args, number }
    }

    /// The receiver the call was dispatched with.
    pub fn this(&self) -> &'a Value {
        self.this
    }

    pub fn args(&self) -> &'a [Value] {
        self.args
    }

    /// 1-based position of this call since interception started.
    ///
    /// Equals the interceptor's invocation count, which is updated before any
    /// predicate runs.
    pub fn number(&self) -> usize {
        self.number
    }

    /// Positional argument `index` converted to `T`. See [`betray_value::arg`].
    pub fn arg<T: betray_value::FromValue>(
        &self,
        index: usize,
    ) -> Result<T, betray_value::ConversionError> {
        betray_value::arg(self.args, index)
    }
}

/// A match predicate paired with a handler.
///
/// Strategies are immutable; cloning shares the same predicate and handler.
#[derive(Clone)]
pub struct Strategy {
    matcher: Arc<Matcher>,
    handler: Arc<Handler>,
}

impl Strategy {
    pub fn new<M, H>(matcher: M, handler: H) -> Self
    where
        M: Fn(&Invocation<'_>) -> bool + Send + Sync + 'static,
        H: Fn(&Invocation<'_>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            matcher: Arc::new(matcher),
            handler: Arc::new(handler),
        }
    }

    /// A strategy that matches every call.
    pub fn catch_all<H>(handler: H) -> Self
    where
        H: Fn(&Invocation<'_>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self::new(|_| true, handler)
    }

    /// A catch-all that forwards to `function` with the same receiver and arguments.
    pub fn calling(function: Function) -> Self {
        Self::catch_all(move |call| function.call(call.this(), call.args()))
    }

    /// A catch-all that returns `value` for every call.
    ///
    /// Each call gets a clone of `value`. Only `Object` and `Function` are
    /// handles, so only they come back as the very same instance every time.
    /// `List` and `Tuple` are value types: every call returns a fresh, equal
    /// deep copy, and mutating one result does not affect the next.
    pub fn returning(value: impl Into<Value>) -> Self {
        let value = value.into();
        Self::catch_all(move |_| Ok(value.clone()))
    }

    /// A strategy matching only the `n`th call (1-based), running `f` without arguments.
    pub fn on_call<F>(n: usize, f: F) -> Self
    where
        F: Fn() -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self::new(move |call| call.number() == n, move |_| f())
    }

    pub fn matches(&self, call: &Invocation<'_>) -> bool {
        (self.matcher)(call)
    }

    pub fn handle(&self, call: &Invocation<'_>) -> anyhow::Result<Value> {
        (self.handler)(call)
    }
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Strategy").finish_non_exhaustive()
    }
}

/// What to install when intercepting a slot.
///
/// Every variant is resolved once, at interception time, into an ordered
/// list of strategies.
#[derive(Debug, Clone, Default)]
pub enum Strategies {
    /// Always fall through to the original function.
    #[default]
    None,
    /// Route every call to this function.
    Callable(Function),
    /// Return this value from every call.
    Value(Value),
    /// Use these strategies, in order.
    List(Vec<Strategy>),
}

impl Strategies {
    pub fn into_vec(self) -> Vec<Strategy> {
        match self {
            Strategies::None => Vec::new(),
            Strategies::Callable(f) => vec![Strategy::calling(f)],
            Strategies::Value(v) => vec![Strategy::returning(v)],
            Strategies::List(list) => list,
        }
    }
}

impl From<()> for Strategies {
    fn from(_: ()) -> Self {
        Strategies::None
    }
}

impl From<Function> for Strategies {
    fn from(f: Function) -> Self {
        Strategies::Callable(f)
    }
}

/// A `Value::Function` is treated as a callable and `Value::Unit` as no
/// strategy at all. Anything else is a substitute result.
impl From<Value> for Strategies {
    fn from(v: Value) -> Self {
        match v {
            Value::Function(f) => Strategies::Callable(f),
            v if v.is_unit() => Strategies::None,
            other => Strategies::Value(other),
        }
    }
}

impl From<Vec<Strategy>> for Strategies {
    fn from(list: Vec<Strategy>) -> Self {
        Strategies::List(list)
    }
}

impl From<Strategy> for Strategies {
    fn from(strategy: Strategy) -> Self {
        Strategies::List(vec![strategy])
    }
}

/// Index and strategy of the first entry whose predicate holds for `call`.
pub fn resolve<'s>(
    strategies: &'s [Strategy],
    call: &Invocation<'_>,
) -> Option<(usize, &'s Strategy)> {
    strategies
        .iter()
        .enumerate()
        .find(|(_, strategy)| strategy.matches(call))
}
