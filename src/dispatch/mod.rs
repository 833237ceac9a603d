//! # Dispatch strategies: which execution context runs a matched action.
//!
//! Selected per subscription via [`Dispatch`]:
//!
//! - [`Dispatch::Publisher`] — synchronously, inline on whatever thread
//!   called publish. Panics inside the action surface to the publisher (see
//!   [`EventChannel::publish`](crate::EventChannel::publish) for the exact
//!   policy).
//! - [`Dispatch::Ui`] — fire-and-forget marshal onto the channel's injected
//!   [`Dispatcher`], a single UI-affine context that serializes callbacks in
//!   submission order. The publisher returns immediately; panics are caught
//!   in the dispatcher worker and never reach the publisher.
//! - [`Dispatch::Background`] — fire-and-forget submission to the tokio
//!   blocking pool; unordered, panics isolated the same way.
//!
//! Per-strategy behavior lives in one tagged variant matched at invocation
//! time rather than in a subclass hierarchy.

mod ui;

pub use ui::UiDispatcher;

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use crate::events::delegate::Callable;

/// A queued unit of work handed to a [`Dispatcher`].
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Execution context for UI-affine callbacks.
///
/// The seam between the bus and the host's interactive surface: the provided
/// [`UiDispatcher`] serializes jobs on a dedicated tokio task, and hosts or
/// tests can inject their own implementation (an immediate dispatcher, a
/// real GUI event loop adapter, a recording fake).
pub trait Dispatcher: Send + Sync {
    /// Queues `job` for asynchronous execution on this dispatcher's context
    /// and returns immediately.
    ///
    /// Jobs submitted from one caller run in submission order relative to
    /// each other. Jobs must not be dropped silently while the dispatcher is
    /// running; after shutdown they may be discarded.
    fn begin_invoke(&self, job: Job);
}

/// Thread option for a subscription, chosen at subscribe time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Dispatch {
    /// Invoke the action inline on the publishing thread.
    #[default]
    Publisher,
    /// Marshal the action to the channel's UI dispatcher.
    Ui,
    /// Queue the action to the tokio blocking pool.
    Background,
}

/// Resolved invocation policy carried by a subscription.
///
/// [`Dispatch::Ui`] resolves to the channel's dispatcher and
/// [`Dispatch::Background`] to a runtime handle at subscribe time, so a
/// missing context fails there and not mid-publish.
#[derive(Clone)]
pub(crate) enum DispatchStrategy {
    Publisher,
    Ui(Arc<dyn Dispatcher>),
    Background(tokio::runtime::Handle),
}

impl DispatchStrategy {
    /// Invokes `action` with `payload` under this policy.
    ///
    /// Called only from an execution strategy that has already resolved the
    /// action, never with a dead delegate. `Ui` and `Background` clone the
    /// payload into the detached job; `Background` submits through the
    /// runtime handle captured at subscribe time, so publishing works from
    /// any native thread.
    pub(crate) fn invoke<P>(&self, action: &Callable<P>, payload: &P)
    where
        P: Clone + Send + Sync + 'static,
    {
        match self {
            DispatchStrategy::Publisher => action(payload),
            DispatchStrategy::Ui(dispatcher) => {
                let action = Arc::clone(action);
                let payload = payload.clone();
                dispatcher.begin_invoke(Box::new(move || action(&payload)));
            }
            DispatchStrategy::Background(runtime) => {
                let action = Arc::clone(action);
                let payload = payload.clone();
                drop(runtime.spawn_blocking(move || {
                    let run = AssertUnwindSafe(|| action(&payload));
                    if let Err(panic) = catch_unwind(run) {
                        eprintln!("[typedbus] background subscriber panicked: {panic:?}");
                    }
                }));
            }
        }
    }
}
