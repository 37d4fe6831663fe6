use std::sync::Arc;

use super::core::{Middleware, MiddlewareRegistry, Next};
use crate::dispatcher::{HandlerRequest, HandlerResult};

/// A zero-argument step of a composed chain.
pub type Continuation<'a> = Box<dyn Fn() -> HandlerResult + 'a>;

/// A route's resolved middleware, outermost first.
///
/// Built once per route when the dispatcher is frozen; composing it with a
/// terminal step is a right fold, so the first layer wraps everything after it.
#[derive(Clone, Default)]
pub struct Pipeline {
    layers: Vec<Arc<dyn Middleware>>,
    names: Vec<String>,
    skipped: Vec<String>,
}

impl Pipeline {
    /// Resolve `names` against `registry`.
    ///
    /// Names with no registered behavior are left out (they act as
    /// pass-throughs) and reported by [`Pipeline::skipped`].
    #[must_use]
    pub fn build(names: &[String], registry: &MiddlewareRegistry) -> Self {
        let mut pipeline = Self::default();
        for name in names {
            match registry.get(name) {
                Some(mw) => {
                    pipeline.layers.push(Arc::clone(mw));
                    pipeline.names.push(name.clone());
                }
                None => pipeline.skipped.push(name.clone()),
            }
        }
        pipeline
    }

    /// Compose the layers around `terminal` into one continuation.
    ///
    /// Folds from the last layer to the first, each step wrapping the
    /// continuation built so far.
    pub fn compose<'a>(
        &'a self,
        req: &'a HandlerRequest,
        terminal: &'a (dyn Fn() -> HandlerResult + 'a),
    ) -> Continuation<'a> {
        let innermost: Continuation<'a> = Box::new(move || terminal());
        self.layers
            .iter()
            .rev()
            .fold(innermost, |next: Continuation<'a>, layer| -> Continuation<'a> {
                Box::new(move || layer.handle(req, &Next::new(next.as_ref())))
            })
    }

    /// Compose and run in one go.
    ///
    /// # Errors
    ///
    /// Whatever the layers or the terminal step return.
    pub fn run(&self, req: &HandlerRequest, terminal: &dyn Fn() -> HandlerResult) -> HandlerResult {
        (self.compose(req, terminal))()
    }

    /// Names of the resolved layers, outermost first.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Names that had no registered behavior.
    #[must_use]
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    /// Number of resolved layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
