//! Error types used by the event bus.
//!
//! All subscription-time failures are surfaced synchronously through
//! [`BusError`]; nothing is deferred to publish time. A weak subscriber whose
//! owner has been dropped is *not* an error — it is the expected end of life
//! for a non-keep-alive subscription and is pruned silently during the next
//! publish.

use thiserror::Error;

/// # Errors produced by the event bus.
///
/// These represent misuse of the subscription API. Publishing itself never
/// fails: dead subscriptions are pruned, filtered-out subscribers are
/// skipped, and panics in asynchronously-dispatched actions are isolated in
/// their workers.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    /// A delegate reference did not resolve to a live callable at
    /// subscription-construction time.
    ///
    /// This happens when a weak reference is created from an `Arc` whose last
    /// strong count dropped before `subscribe_with` ran. The `param` names
    /// the offending reference (`"action"` or `"filter"`).
    #[error("{param} reference does not resolve to a live callable")]
    InvalidArgument {
        /// Name of the malformed parameter.
        param: &'static str,
    },

    /// A subscription token was assigned more than once.
    ///
    /// Tokens are assigned exactly once, by the owning channel, at
    /// registration time. This cannot be reached through the public API and
    /// exists to guard the registration path itself.
    #[error("subscription token already assigned")]
    TokenAlreadyAssigned,

    /// A subscription requested [`Dispatch::Ui`](crate::Dispatch::Ui) on a
    /// channel whose aggregator was built without a UI dispatcher.
    ///
    /// Construct the aggregator with
    /// [`EventAggregator::with_ui_dispatcher`](crate::EventAggregator::with_ui_dispatcher)
    /// to enable UI-thread dispatch.
    #[error("no UI dispatcher configured for this channel")]
    NoUiDispatcher,

    /// A subscription requested
    /// [`Dispatch::Background`](crate::Dispatch::Background) from outside a
    /// tokio runtime.
    ///
    /// The worker-pool handle is captured at subscribe time so that later
    /// publishes can come from any native thread; subscribing itself must
    /// therefore happen inside a runtime.
    #[error("no tokio runtime available for background dispatch")]
    NoRuntime,
}

impl BusError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use typedbus::BusError;
    ///
    /// let err = BusError::InvalidArgument { param: "action" };
    /// assert_eq!(err.as_label(), "invalid_argument");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            BusError::InvalidArgument { .. } => "invalid_argument",
            BusError::TokenAlreadyAssigned => "token_already_assigned",
            BusError::NoUiDispatcher => "no_ui_dispatcher",
            BusError::NoRuntime => "no_runtime",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            BusError::InvalidArgument { param } => {
                format!("dead delegate reference: {param}")
            }
            BusError::TokenAlreadyAssigned => "token already assigned".to_string(),
            BusError::NoUiDispatcher => "no UI dispatcher configured".to_string(),
            BusError::NoRuntime => "no tokio runtime for background dispatch".to_string(),
        }
    }
}
