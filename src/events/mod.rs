//! Typed events: tokens, delegate references, subscriptions, channels, and
//! the aggregator.
//!
//! ## Contents
//! - [`SubscriptionToken`] — opaque unsubscribe handle
//! - [`DelegateRef`] — strong or weak reference to a subscriber callable
//! - [`EventChannel`] — publish/subscribe for one payload type
//! - [`EventAggregator`] — singleton channel per payload type
//!
//! Subscriptions themselves are internal; they are created by
//! [`EventChannel::subscribe_with`] and owned by the channel.

pub mod aggregator;
pub mod channel;
pub mod delegate;
pub(crate) mod subscription;
pub mod token;

pub use aggregator::EventAggregator;
pub use channel::EventChannel;
pub use delegate::{Callable, DelegateRef};
pub use token::SubscriptionToken;
