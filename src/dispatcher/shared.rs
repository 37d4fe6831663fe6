use arc_swap::ArcSwap;
use http::Method;
use std::sync::Arc;
use tracing::info;

use super::core::{DispatchOutcome, Dispatcher};
use crate::error::DispatchError;

/// A [`Dispatcher`] slot that can be replaced atomically.
///
/// Reads are lock-free. `store` swaps in a freshly built dispatcher; requests
/// already running keep the table they started with. Tables themselves are
/// never mutated.
pub struct SharedDispatcher {
    current: ArcSwap<Dispatcher>,
}

impl SharedDispatcher {
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            current: ArcSwap::from_pointee(dispatcher),
        }
    }

    /// Snapshot of the current dispatcher.
    #[must_use]
    pub fn load(&self) -> Arc<Dispatcher> {
        self.current.load_full()
    }

    /// Replace the dispatcher, returning the previous one.
    pub fn store(&self, dispatcher: Dispatcher) -> Arc<Dispatcher> {
        let routes_count = dispatcher.len();
        let previous = self.current.swap(Arc::new(dispatcher));
        info!(
            routes_count = routes_count,
            previous_routes_count = previous.len(),
            "Dispatcher replaced"
        );
        previous
    }

    /// Dispatch against the current dispatcher.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::dispatch`].
    pub fn dispatch(&self, method: &Method, raw_path: &str) -> Result<DispatchOutcome, DispatchError> {
        self.current.load().dispatch(method, raw_path)
    }
}
