//! A single registration on a channel: action + filter + dispatch policy.
//!
//! [`EventSubscription`] validates both delegate references at construction
//! time and, at publish time, produces an execution strategy — a closure that
//! evaluates the filter and, on a match, hands the action to the subscription's
//! dispatch strategy. A subscription whose delegates have died produces no
//! strategy, which is the owning channel's signal to prune it.

use std::sync::OnceLock;

use crate::BusError;
use crate::dispatch::DispatchStrategy;
use crate::events::delegate::DelegateRef;
use crate::events::token::SubscriptionToken;

/// Ready-to-invoke closure produced by [`EventSubscription::execution_strategy`].
///
/// Holds strong handles to the resolved action and filter: as long as a
/// collected strategy exists, its delegates stay alive even if the subscriber
/// is dropped mid-publish.
pub(crate) type ExecutionStrategy<P> = Box<dyn Fn(&P) + Send + Sync>;

/// One subscriber registration owned by an
/// [`EventChannel`](crate::EventChannel).
pub(crate) struct EventSubscription<P> {
    action: DelegateRef<P>,
    filter: DelegateRef<P, bool>,
    strategy: DispatchStrategy,
    token: OnceLock<SubscriptionToken>,
}

impl<P> EventSubscription<P>
where
    P: Clone + Send + Sync + 'static,
{
    /// Builds a subscription, validating that both references resolve right
    /// now.
    ///
    /// A reference that is already dead (a weak delegate whose owner was
    /// dropped before subscribing) fails with
    /// [`BusError::InvalidArgument`] naming the offending parameter.
    pub(crate) fn new(
        action: DelegateRef<P>,
        filter: DelegateRef<P, bool>,
        strategy: DispatchStrategy,
    ) -> Result<Self, BusError> {
        if !action.is_alive() {
            return Err(BusError::InvalidArgument { param: "action" });
        }
        if !filter.is_alive() {
            return Err(BusError::InvalidArgument { param: "filter" });
        }
        Ok(Self {
            action,
            filter,
            strategy,
            token: OnceLock::new(),
        })
    }

    /// The token assigned at registration, if any.
    pub(crate) fn token(&self) -> Option<SubscriptionToken> {
        self.token.get().copied()
    }

    /// Assigns the registration token. Exactly-once: a second assignment is a
    /// programming error in the registration path and is reported rather
    /// than silently overwritten.
    pub(crate) fn assign_token(&self, token: SubscriptionToken) -> Result<(), BusError> {
        self.token
            .set(token)
            .map_err(|_| BusError::TokenAlreadyAssigned)
    }

    /// Resolves both delegates and returns the execution strategy, or `None`
    /// if either has died (prune me).
    ///
    /// Side-effect-free with respect to subscription state; pruning is the
    /// channel's job.
    pub(crate) fn execution_strategy(&self) -> Option<ExecutionStrategy<P>> {
        let action = self.action.resolve()?;
        let filter = self.filter.resolve()?;
        let strategy = self.strategy.clone();

        Some(Box::new(move |payload: &P| {
            if filter(payload) {
                strategy.invoke(&action, payload);
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct Owner;

    impl Owner {
        fn on_value(&self, _value: &u32) {}
    }

    fn strong_subscription(hits: Arc<AtomicUsize>) -> EventSubscription<u32> {
        EventSubscription::new(
            DelegateRef::strong(move |_: &u32| {
                hits.fetch_add(1, Ordering::SeqCst);
            }),
            DelegateRef::accept_all(),
            DispatchStrategy::Publisher,
        )
        .unwrap()
    }

    #[test]
    fn test_dead_action_fails_construction() {
        let owner = Arc::new(Owner);
        let action = DelegateRef::weak(&owner, Owner::on_value);
        drop(owner);

        let err = EventSubscription::new(
            action,
            DelegateRef::accept_all(),
            DispatchStrategy::Publisher,
        )
        .err()
        .unwrap();
        assert_eq!(err, BusError::InvalidArgument { param: "action" });
    }

    #[test]
    fn test_dead_filter_fails_construction() {
        let owner = Arc::new(Owner);
        let filter: DelegateRef<u32, bool> = DelegateRef::weak(&owner, |_: &Owner, _| true);
        drop(owner);

        let err = EventSubscription::new(
            DelegateRef::strong(|_: &u32| {}),
            filter,
            DispatchStrategy::Publisher,
        )
        .err()
        .unwrap();
        assert_eq!(err, BusError::InvalidArgument { param: "filter" });
    }

    #[test]
    fn test_token_is_assigned_exactly_once() {
        let subscription = strong_subscription(Arc::new(AtomicUsize::new(0)));
        assert!(subscription.token().is_none());

        let token = SubscriptionToken::new();
        subscription.assign_token(token).unwrap();
        assert_eq!(subscription.token(), Some(token));

        let err = subscription
            .assign_token(SubscriptionToken::new())
            .unwrap_err();
        assert_eq!(err, BusError::TokenAlreadyAssigned);
        assert_eq!(subscription.token(), Some(token));
    }

    #[test]
    fn test_strategy_applies_the_filter() {
        let hits = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&hits);
        let subscription = EventSubscription::new(
            DelegateRef::strong(move |_: &u32| {
                sink.fetch_add(1, Ordering::SeqCst);
            }),
            DelegateRef::strong(|value: &u32| *value > 10),
            DispatchStrategy::Publisher,
        )
        .unwrap();

        let strategy = subscription.execution_strategy().unwrap();
        strategy(&5);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        strategy(&15);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_strategy_is_none_once_the_subscriber_dies() {
        let owner = Arc::new(Owner);
        let subscription = EventSubscription::new(
            DelegateRef::weak(&owner, Owner::on_value),
            DelegateRef::accept_all(),
            DispatchStrategy::Publisher,
        )
        .unwrap();

        assert!(subscription.execution_strategy().is_some());
        drop(owner);
        assert!(subscription.execution_strategy().is_none());
    }

    #[test]
    fn test_strategy_does_not_mutate_subscription_state() {
        let subscription = strong_subscription(Arc::new(AtomicUsize::new(0)));
        let _ = subscription.execution_strategy();
        let _ = subscription.execution_strategy();
        assert!(subscription.token().is_none());
    }
}
