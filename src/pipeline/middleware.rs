//! Handler and guard composition.
//!
//! # Data Flow
//! ```text
//! compose(handler, [g1, g2, g3])
//!     → Chain { guards: [g1, g2, g3], endpoint: handler }
//!
//! Chain::call(req)
//!     → g1.handle(req, Next[g2, g3])
//!         → next.run(req) → g2.handle(req, Next[g3]) → ... → handler.call(req)
//! ```
//!
//! # Design Decisions
//! - The chain is an ordered slice walked by a cursor, not a nest of closures
//! - `Next::run` consumes `self`, so a guard can delegate at most once
//! - A chain is immutable; recomposing builds a new one

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::pipeline::request::NormalizedRequest;
use crate::pipeline::response::HandlerResult;

/// Terminal request handler.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, req: NormalizedRequest) -> HandlerResult;
}

/// A cross-cutting precondition wrapped around a handler.
#[async_trait]
pub trait Guard: Send + Sync {
    /// Short-circuit by returning without calling `next`, or delegate.
    async fn handle(&self, req: NormalizedRequest, next: Next<'_>) -> HandlerResult;

    fn name(&self) -> &'static str;
}

/// The remainder of a chain.
pub struct Next<'a> {
    guards: &'a [Arc<dyn Guard>],
    endpoint: &'a dyn Handler,
}

impl<'a> Next<'a> {
    pub fn new(guards: &'a [Arc<dyn Guard>], endpoint: &'a dyn Handler) -> Self {
        Self { guards, endpoint }
    }

    /// Run the next guard, or the terminal handler once guards are exhausted.
    pub async fn run(self, req: NormalizedRequest) -> HandlerResult {
        match self.guards.split_first() {
            Some((guard, rest)) => {
                tracing::trace!(guard = guard.name(), "Entering guard");
                guard.handle(req, Next::new(rest, self.endpoint)).await
            }
            None => self.endpoint.call(req).await,
        }
    }
}

/// A terminal handler together with its ordered guards.
#[derive(Clone)]
pub struct Chain {
    guards: Arc<[Arc<dyn Guard>]>,
    endpoint: Arc<dyn Handler>,
}

impl Chain {
    pub fn guard_names(&self) -> Vec<&'static str> {
        self.guards.iter().map(|g| g.name()).collect()
    }
}

#[async_trait]
impl Handler for Chain {
    async fn call(&self, req: NormalizedRequest) -> HandlerResult {
        Next::new(&self.guards, self.endpoint.as_ref()).run(req).await
    }
}

/// Wrap `endpoint` so that `guards[0]` runs first and `endpoint` last.
pub fn compose(endpoint: Arc<dyn Handler>, guards: Vec<Arc<dyn Guard>>) -> Arc<dyn Handler> {
    Arc::new(Chain {
        guards: guards.into(),
        endpoint,
    })
}

/// Adapter turning an async function into a [`Handler`].
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(NormalizedRequest) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send,
{
    async fn call(&self, req: NormalizedRequest) -> HandlerResult {
        (self.f)(req).await
    }
}

pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn Handler>
where
    F: Fn(NormalizedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(HandlerFn { f })
}
