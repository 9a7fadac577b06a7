//! Call Interceptor
//!
//! Replaces a named function slot on a target with a proxy that records every
//! call and dispatches it through an ordered list of [`Strategy`] values.
//!
//! # Dispatch
//!
//! For each call the proxy:
//!
//! 1. bumps the invocation count and appends the arguments to the log,
//! 2. runs the handler of the first strategy whose predicate holds,
//! 3. otherwise calls the original function.
//!
//! The ledger is updated before any predicate runs, so [`Invocation::number`]
//! (and [`Interceptor::invocation_count`]) already include the call being
//! dispatched.
//!
//! # Nesting
//!
//! Intercepting a slot that is already intercepted wraps the existing proxy:
//! the new interceptor's original is the previous proxy, and calls pass
//! through both ledgers when they fall through.

use std::fmt;
use std::sync::Arc;

use betray_value::{Function, SlotTarget, Value};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace};

use crate::error::InterceptError;
use crate::strategy::{resolve, Invocation, Strategies, Strategy};

#[derive(Default)]
struct Ledger {
    count: usize,
    log: Vec<Vec<Value>>,
}

/// State shared between a handle and its installed proxy.
struct State {
    ledger: Mutex<Ledger>,
    strategies: RwLock<Vec<Strategy>>,
}

impl State {
    /// Count the call and log its arguments. Returns the call's number.
    fn record(&self, args: &[Value]) -> usize {
        let mut ledger = self.ledger.lock();
        ledger.count += 1;
        ledger.log.push(args.to_vec());
        ledger.count
    }

    /// The proxy body.
    ///
    /// Strategies are cloned out of the lock before any predicate runs, so a
    /// predicate or handler may reconfigure the interceptor; additions apply
    /// from the next call on.
    fn dispatch(
        &self,
        name: &str,
        original: &Function,
        this: &Value,
        args: &[Value],
    ) -> anyhow::Result<Value> {
        let number = self.record(args);
        let call = Invocation::new(this, args, number);
        let strategies = self.strategies.read().clone();

        match resolve(&strategies, &call) {
            Some((index, strategy)) => {
                trace!(slot = name, call = number, strategy = index, "strategy matched");
                strategy.handle(&call)
            }
            None => {
                trace!(slot = name, call = number, "falling through to original");
                original.call(this, args)
            }
        }
    }
}

/// Handle to one intercepted slot.
///
/// Clones share the same ledger and strategy list. Configuration methods take
/// `&self` and return `&Self`, so they can be chained and used between calls.
///
/// Dropping the handle does not restore the slot; call [`Interceptor::restore`].
#[derive(Clone)]
pub struct Interceptor {
    target: Arc<dyn SlotTarget>,
    name: Arc<str>,
    original: Function,
    proxy: Function,
    state: Arc<State>,
}

/// Replace the function in `target`'s slot `name` with a recording proxy.
///
/// `strategies` may be `()` (always call the original), a [`Function`] or
/// `Value::Function` (call it instead), any other [`Value`] (return it from
/// every call), or a list of [`Strategy`] (first match wins).
///
/// # Errors
///
/// [`InterceptError::MissingFunction`] if the slot does not exist,
/// [`InterceptError::NotAFunction`] if it holds something other than a function.
///
/// # Example
///
/// ```
/// use betray::intercept;
/// use betray_value::{Function, Object, Value};
///
/// let math = Object::new();
/// math.set("add", Function::new(|_, args| {
///     let x: i64 = betray_value::arg(args, 0)?;
///     let y: i64 = betray_value::arg(args, 1)?;
///     Ok(Value::from(x + y))
/// }));
///
/// let add = intercept(&math, "add", ()).unwrap();
/// add.when(|call| call.arg::<i64>(0).is_ok_and(|x| x < 0), |_| Ok(Value::from(0i64)));
///
/// assert_eq!(math.call("add", &[Value::from(1i64), Value::from(2i64)]).unwrap(), Value::S64(3));
/// assert_eq!(math.call("add", &[Value::from(-1i64), Value::from(2i64)]).unwrap(), Value::S64(0));
/// assert_eq!(add.invocation_count(), 2);
///
/// add.restore();
/// ```
pub fn intercept<T>(
    target: &T,
    name: &str,
    strategies: impl Into<Strategies>,
) -> Result<Interceptor, InterceptError>
where
    T: SlotTarget + Clone + 'static,
{
    let original = match target.get_slot(name) {
        Some(Value::Function(f)) => f,
        // A slot holding unit is absent, not a non-function.
        Some(Value::Unit) | None => {
            return Err(InterceptError::MissingFunction {
                name: name.to_string(),
            })
        }
        Some(other) => {
            return Err(InterceptError::NotAFunction {
                name: name.to_string(),
                found: other.kind(),
            })
        }
    };

    let strategies = strategies.into().into_vec();
    let state = Arc::new(State {
        ledger: Mutex::new(Ledger::default()),
        strategies: RwLock::new(strategies),
    });
    let name: Arc<str> = Arc::from(name);

    let proxy = {
        let state = Arc::clone(&state);
        let name = Arc::clone(&name);
        let original = original.clone();
        let label = name.to_string();
        Function::named(label, move |this, args| {
            state.dispatch(&name, &original, this, args)
        })
    };

    target.set_slot(&name, Value::Function(proxy.clone()));
    debug!(
        slot = %name,
        strategies = state.strategies.read().len(),
        "installed interceptor"
    );

    Ok(Interceptor {
        target: Arc::new(target.clone()),
        name,
        original,
        proxy,
        state,
    })
}

impl Interceptor {
    /// Append a strategy built from `matcher` and `handler`.
    pub fn when<M, H>(&self, matcher: M, handler: H) -> &Self
    where
        M: Fn(&Invocation<'_>) -> bool + Send + Sync + 'static,
        H: Fn(&Invocation<'_>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.push(Strategy::new(matcher, handler))
    }

    /// Append a prebuilt strategy.
    pub fn push(&self, strategy: Strategy) -> &Self {
        self.state.strategies.write().push(strategy);
        self
    }

    /// Override the `n`th call (1-based, counted from interception).
    ///
    /// This is an ordinary strategy: one appended earlier that also matches
    /// the `n`th call still wins.
    pub fn on_call<F>(&self, n: usize, f: F) -> &Self
    where
        F: Fn() -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.push(Strategy::on_call(n, f))
    }

    pub fn on_first_call<F>(&self, f: F) -> &Self
    where
        F: Fn() -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.on_call(1, f)
    }

    pub fn on_second_call<F>(&self, f: F) -> &Self
    where
        F: Fn() -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.on_call(2, f)
    }

    pub fn on_third_call<F>(&self, f: F) -> &Self
    where
        F: Fn() -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.on_call(3, f)
    }

    /// Append a strategy that matches every call.
    ///
    /// Strategies appended afterwards are never reached: first match wins.
    pub fn for_all<H>(&self, handler: H)
    where
        H: Fn(&Invocation<'_>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.push(Strategy::catch_all(handler));
    }

    /// Write the original function back into the slot.
    ///
    /// Safe to call repeatedly. The ledger stays readable afterwards.
    pub fn restore(&self) {
        self.target
            .set_slot(&self.name, Value::Function(self.original.clone()));
        debug!(
            slot = %self.name,
            invocations = self.invocation_count(),
            "restored original function"
        );
    }

    /// Number of calls that reached the proxy.
    pub fn invocation_count(&self) -> usize {
        self.state.ledger.lock().count
    }

    pub fn was_invoked(&self) -> bool {
        self.invocation_count() > 0
    }

    /// Argument lists of every call, in call order.
    pub fn invocation_log(&self) -> Vec<Vec<Value>> {
        self.state.ledger.lock().log.clone()
    }

    /// Arguments of the `index`th call (0-based).
    pub fn invocation(&self, index: usize) -> Option<Vec<Value>> {
        self.state.ledger.lock().log.get(index).cloned()
    }

    pub fn strategy_count(&self) -> usize {
        self.state.strategies.read().len()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The function captured at interception time.
    pub fn original(&self) -> &Function {
        &self.original
    }

    /// The proxy installed in the slot.
    pub fn proxy(&self) -> &Function {
        &self.proxy
    }

    /// Whether the slot currently holds this interceptor's proxy.
    pub fn is_installed(&self) -> bool {
        matches!(
            self.target.get_slot(&self.name),
            Some(Value::Function(f)) if f.ptr_eq(&self.proxy)
        )
    }

    /// Copy of the ledger.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let ledger = self.state.ledger.lock();
        LedgerSnapshot {
            name: self.name.to_string(),
            invocation_count: ledger.count,
            invocations: ledger.log.clone(),
        }
    }

    /// Ledger as JSON, handy in assertion messages.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.snapshot())
    }
}

impl fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interceptor")
            .field("name", &self.name)
            .field("invocation_count", &self.invocation_count())
            .field("strategies", &self.strategy_count())
            .finish()
    }
}

/// Point-in-time copy of an interceptor's ledger.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LedgerSnapshot {
    pub name: String,
    pub invocation_count: usize,
    pub invocations: Vec<Vec<Value>>,
}
