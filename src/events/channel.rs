//! # EventChannel: publish/subscribe for one payload type.
//!
//! An [`EventChannel`] owns the subscription list for a single payload type
//! and offers subscribe/unsubscribe/publish. Channels are usually obtained
//! from an [`EventAggregator`](crate::EventAggregator), which guarantees one
//! channel per payload type.
//!
//! ## What it guarantees
//! - All list mutation and snapshotting happens under one per-channel lock;
//!   publishers never observe a half-mutated list.
//! - Actions run **outside** the lock; a subscriber may freely subscribe or
//!   unsubscribe from within its own callback.
//! - Every live subscription whose filter matches is invoked exactly once
//!   per publish.
//! - Dead weak subscriptions are pruned lazily during publish — a silent
//!   maintenance action, never an error.
//!
//! ## What it does **not** guarantee
//! - No ordering across distinct channels, and none between background
//!   subscribers of the same publish.
//! - No queueing or back-pressure: publish is a fire-once notification.
//!
//! ## Example
//! ```
//! use typedbus::EventChannel;
//!
//! let channel = EventChannel::<u32>::new();
//! let token = channel.subscribe(|n| println!("got {n}"))?;
//!
//! channel.publish(41);
//! channel.unsubscribe(token);
//! # Ok::<(), typedbus::BusError>(())
//! ```

use std::panic::{AssertUnwindSafe, catch_unwind, resume_unwind};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::BusError;
use crate::dispatch::{Dispatch, DispatchStrategy, Dispatcher};
use crate::events::delegate::DelegateRef;
use crate::events::subscription::{EventSubscription, ExecutionStrategy};
use crate::events::token::SubscriptionToken;

/// Publish/subscribe channel for payloads of type `P`.
pub struct EventChannel<P> {
    subscriptions: Mutex<Vec<EventSubscription<P>>>,
    ui: Option<Arc<dyn Dispatcher>>,
}

impl<P> EventChannel<P>
where
    P: Clone + Send + Sync + 'static,
{
    /// Creates a standalone channel without a UI dispatcher.
    ///
    /// Subscriptions requesting [`Dispatch::Ui`] will fail with
    /// [`BusError::NoUiDispatcher`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_ui(None)
    }

    /// Creates a standalone channel with a UI dispatcher for
    /// [`Dispatch::Ui`] subscriptions.
    #[must_use]
    pub fn with_ui_dispatcher(dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self::with_ui(Some(dispatcher))
    }

    pub(crate) fn with_ui(ui: Option<Arc<dyn Dispatcher>>) -> Self {
        Self {
            subscriptions: Mutex::new(Vec::new()),
            ui,
        }
    }

    /// Subscribes `action` with no filter, strongly held, invoked on the
    /// publishing thread.
    pub fn subscribe<F>(&self, action: F) -> Result<SubscriptionToken, BusError>
    where
        F: Fn(&P) + Send + Sync + 'static,
    {
        self.subscribe_with(
            DelegateRef::strong(action),
            DelegateRef::accept_all(),
            Dispatch::Publisher,
        )
    }

    /// Subscribes `action` with no filter, strongly held, invoked under the
    /// given dispatch option.
    pub fn subscribe_on<F>(&self, action: F, dispatch: Dispatch) -> Result<SubscriptionToken, BusError>
    where
        F: Fn(&P) + Send + Sync + 'static,
    {
        self.subscribe_with(DelegateRef::strong(action), DelegateRef::accept_all(), dispatch)
    }

    /// Subscribes `method` on `owner` weakly: the channel does not keep
    /// `owner` alive, and the subscription is pruned silently once the last
    /// external `Arc` drops.
    pub fn subscribe_weak<S>(
        &self,
        owner: &Arc<S>,
        method: fn(&S, &P),
    ) -> Result<SubscriptionToken, BusError>
    where
        S: Send + Sync + 'static,
    {
        self.subscribe_with(
            DelegateRef::weak(owner, method),
            DelegateRef::accept_all(),
            Dispatch::Publisher,
        )
    }

    /// Full-control subscribe: explicit action and filter references plus a
    /// dispatch option. Keep-alive is expressed by the reference kind
    /// ([`DelegateRef::strong`] vs [`DelegateRef::weak`]).
    ///
    /// Fails with [`BusError::InvalidArgument`] if either reference is
    /// already dead, with [`BusError::NoUiDispatcher`] if [`Dispatch::Ui`]
    /// is requested on a channel without one, and with
    /// [`BusError::NoRuntime`] if [`Dispatch::Background`] is requested from
    /// outside a tokio runtime. The background handle is captured here so
    /// later publishes may come from any native thread.
    pub fn subscribe_with(
        &self,
        action: DelegateRef<P>,
        filter: DelegateRef<P, bool>,
        dispatch: Dispatch,
    ) -> Result<SubscriptionToken, BusError> {
        let strategy = match dispatch {
            Dispatch::Publisher => DispatchStrategy::Publisher,
            Dispatch::Ui => {
                let dispatcher = self.ui.clone().ok_or(BusError::NoUiDispatcher)?;
                DispatchStrategy::Ui(dispatcher)
            }
            Dispatch::Background => {
                let runtime =
                    tokio::runtime::Handle::try_current().map_err(|_| BusError::NoRuntime)?;
                DispatchStrategy::Background(runtime)
            }
        };

        let subscription = EventSubscription::new(action, filter, strategy)?;
        let token = SubscriptionToken::new();
        subscription.assign_token(token)?;
        self.lock().push(subscription);
        Ok(token)
    }

    /// Removes the registration matching `token`. Idempotent: unsubscribing
    /// twice, or with an unknown token, is a no-op.
    pub fn unsubscribe(&self, token: SubscriptionToken) {
        self.lock()
            .retain(|subscription| subscription.token() != Some(token));
    }

    /// True if a registration with `token` is present.
    ///
    /// This checks only that the token has not been unsubscribed or pruned;
    /// it does not check whether the underlying delegate is still alive.
    #[must_use]
    pub fn contains(&self, token: SubscriptionToken) -> bool {
        self.lock()
            .iter()
            .any(|subscription| subscription.token() == Some(token))
    }

    /// Number of registrations currently present (live or not-yet-pruned).
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True if no registrations are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Publishes `payload` to every live, matching subscriber.
    ///
    /// Under the channel lock, subscriptions are walked from last-registered
    /// to first-registered: dead ones are pruned in place, live ones yield
    /// their execution strategies. The lock is then released and the
    /// strategies run in collected order.
    ///
    /// Panic policy for [`Dispatch::Publisher`] subscribers:
    /// run-all-then-resume-first. Every strategy in the batch is attempted;
    /// the first captured panic is re-raised to the caller afterwards, so one
    /// faulty subscriber cannot starve its peers. `Ui` and `Background`
    /// subscribers never panic into the publisher.
    pub fn publish(&self, payload: P) {
        let strategies = self.prune_and_collect();

        let mut first_panic = None;
        for strategy in strategies {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| strategy(&payload))) {
                first_panic.get_or_insert(panic);
            }
        }
        if let Some(panic) = first_panic {
            resume_unwind(panic);
        }
    }

    /// Snapshots live strategies and prunes dead subscriptions, under the
    /// lock. Iterating from the end keeps in-place removal safe.
    fn prune_and_collect(&self) -> Vec<ExecutionStrategy<P>> {
        let mut subscriptions = self.lock();
        let mut strategies = Vec::with_capacity(subscriptions.len());

        for index in (0..subscriptions.len()).rev() {
            match subscriptions[index].execution_strategy() {
                Some(strategy) => strategies.push(strategy),
                None => {
                    subscriptions.remove(index);
                }
            }
        }

        strategies
    }

    fn lock(&self) -> MutexGuard<'_, Vec<EventSubscription<P>>> {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<P> Default for EventChannel<P>
where
    P: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
