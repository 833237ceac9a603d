//! # typedbus
//!
//! **typedbus** is an in-process, typed publish/subscribe event bus. It
//! decouples background work (data fetching, model building) from UI-affine
//! rendering without leaking subscribers: callbacks can be held weakly and
//! are pruned silently once their owner is dropped.
//!
//! ## Architecture
//! ```text
//!  ┌─────────────┐  channel::<T>()   ┌───────────────────────────────┐
//!  │  publisher  │ ────────────────► │  EventAggregator              │
//!  │ (any thread)│                   │  TypeId → Arc<EventChannel<T>>│
//!  └──────┬──────┘                   └───────────────────────────────┘
//!         │ publish(payload)
//!         ▼
//!  ┌───────────────────────────────────────────────────────────┐
//!  │ EventChannel<T>                                           │
//!  │  lock ─► walk subscriptions (last-registered first)       │
//!  │          ├─ delegate dead ─► prune (silent)               │
//!  │          └─ alive ─► collect execution strategy           │
//!  │  unlock ─► run strategies: filter(payload)? ─► dispatch   │
//!  └──────┬──────────────────┬──────────────────┬──────────────┘
//!         ▼                  ▼                  ▼
//!     Publisher          Ui (queued to      Background
//!     (inline, sync)     UiDispatcher       (tokio blocking
//!                        worker, FIFO)      pool, unordered)
//! ```
//!
//! ## Features
//! | Area              | Description                                                      | Key types                                |
//! |-------------------|------------------------------------------------------------------|-------------------------------------------|
//! | **Channels**      | One independent channel per payload type, created lazily.         | [`EventAggregator`], [`EventChannel`]     |
//! | **Subscriptions** | Action + optional filter, strong or weak, token-based removal.    | [`DelegateRef`], [`SubscriptionToken`]    |
//! | **Dispatch**      | Inline, UI-serialized, or thread-pool invocation per subscription.| [`Dispatch`], [`Dispatcher`], [`UiDispatcher`] |
//! | **Errors**        | Synchronous, typed subscription-time failures.                    | [`BusError`]                              |
//!
//! ## Guarantees
//! - One channel instance per payload type for the aggregator's lifetime.
//! - Each publish invokes every live, matching subscriber exactly once.
//! - Channel state is never observed half-mutated; actions run outside the
//!   channel lock.
//! - A dead weak subscriber is never an error: it is pruned, silently,
//!   during the next publish.
//!
//! ## Non-goals
//! No persistence, no cross-process transport, no ordering across distinct
//! payload types, no back-pressure, no retries: publish is a fire-once
//! notification primitive.
//!
//! ## Example
//! ```
//! use typedbus::{Dispatch, EventAggregator};
//!
//! #[derive(Clone)]
//! struct ModelBuilt {
//!     releases: Vec<String>,
//! }
//!
//! fn main() -> Result<(), typedbus::BusError> {
//!     let bus = EventAggregator::new();
//!     let channel = bus.channel::<ModelBuilt>();
//!
//!     let token = channel.subscribe_with(
//!         typedbus::DelegateRef::strong(|m: &ModelBuilt| {
//!             println!("rendering {} releases", m.releases.len());
//!         }),
//!         typedbus::DelegateRef::strong(|m: &ModelBuilt| !m.releases.is_empty()),
//!         Dispatch::Publisher,
//!     )?;
//!
//!     channel.publish(ModelBuilt {
//!         releases: vec!["1.0.2".into()],
//!     });
//!
//!     channel.unsubscribe(token);
//!     Ok(())
//! }
//! ```

mod dispatch;
mod error;
mod events;

pub use dispatch::{Dispatch, Dispatcher, Job, UiDispatcher};
pub use error::BusError;
pub use events::{Callable, DelegateRef, EventAggregator, EventChannel, SubscriptionToken};
