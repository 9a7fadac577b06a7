//! Group restore.

use std::sync::Arc;

use betray_value::SlotTarget;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::InterceptError;
use crate::interceptor::{intercept, Interceptor};
use crate::strategy::Strategies;

/// Creates interceptors and remembers them so they can be restored together.
///
/// Clones share the same list of handles.
#[derive(Clone, Default)]
pub struct Tracker {
    handles: Arc<Mutex<Vec<Interceptor>>>,
}

/// Start a new, empty tracker.
pub fn create_tracker() -> Tracker {
    Tracker::new()
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same as [`intercept`], and the handle is remembered on success.
    pub fn intercept<T>(
        &self,
        target: &T,
        name: &str,
        strategies: impl Into<Strategies>,
    ) -> Result<Interceptor, InterceptError>
    where
        T: SlotTarget + Clone + 'static,
    {
        let handle = intercept(target, name, strategies)?;
        self.handles.lock().push(handle.clone());
        Ok(handle)
    }

    /// Restore every remembered handle, oldest first.
    ///
    /// The handles stay remembered, so calling this again is harmless.
    pub fn restore_all(&self) {
        let handles = self.handles.lock().clone();
        debug!(count = handles.len(), "restoring all tracked interceptors");
        for handle in &handles {
            handle.restore();
        }
    }

    pub fn len(&self) -> usize {
        self.handles.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.lock().is_empty()
    }

    /// The remembered handles, in creation order.
    pub fn handles(&self) -> Vec<Interceptor> {
        self.handles.lock().clone()
    }
}

impl std::fmt::Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("handles", &*self.handles.lock())
            .finish()
    }
}
