//! # EventAggregator: one channel per payload type.
//!
//! The aggregator is the entry point of the bus: it maps payload-type
//! identity to a singleton [`EventChannel`], created lazily on first request
//! and never removed. It is ordinary, explicitly constructed state — build
//! one and hand it (or clones of the `Arc` you wrap it in) to every component
//! that publishes or subscribes, rather than reaching for a process-wide
//! global.
//!
//! ## Example
//! ```
//! use typedbus::EventAggregator;
//!
//! #[derive(Clone)]
//! struct ModelBuilt {
//!     projects: usize,
//! }
//!
//! let aggregator = EventAggregator::new();
//! let channel = aggregator.channel::<ModelBuilt>();
//! let token = channel.subscribe(|m| println!("{} projects", m.projects))?;
//!
//! aggregator.channel::<ModelBuilt>().publish(ModelBuilt { projects: 3 });
//! channel.unsubscribe(token);
//! # Ok::<(), typedbus::BusError>(())
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::dispatch::Dispatcher;
use crate::events::channel::EventChannel;

type AnyChannel = Arc<dyn Any + Send + Sync>;

/// Registry of per-payload-type event channels.
pub struct EventAggregator {
    channels: RwLock<HashMap<TypeId, AnyChannel>>,
    ui: Option<Arc<dyn Dispatcher>>,
}

impl EventAggregator {
    /// Creates an aggregator without a UI dispatcher.
    ///
    /// Channels obtained from it support [`Dispatch::Publisher`](crate::Dispatch::Publisher)
    /// and [`Dispatch::Background`](crate::Dispatch::Background) subscriptions.
    #[must_use]
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            ui: None,
        }
    }

    /// Creates an aggregator whose channels marshal
    /// [`Dispatch::Ui`](crate::Dispatch::Ui) subscriptions onto `dispatcher`.
    #[must_use]
    pub fn with_ui_dispatcher(dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            ui: Some(dispatcher),
        }
    }

    /// Returns the channel for payload type `P`, creating it on first
    /// request.
    ///
    /// For a given `P` this always returns the same instance for the lifetime
    /// of the aggregator, and is safe to call concurrently: creation is
    /// atomic under the registry's write lock, so racing callers cannot
    /// produce duplicate channels. Channels are never removed.
    #[must_use]
    pub fn channel<P>(&self) -> Arc<EventChannel<P>>
    where
        P: Clone + Send + Sync + 'static,
    {
        let key = TypeId::of::<P>();

        let existing = self
            .channels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();
        if let Some(entry) = existing {
            return Self::concrete(entry);
        }

        let mut channels = self
            .channels
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let entry = channels
            .entry(key)
            .or_insert_with(|| Arc::new(EventChannel::<P>::with_ui(self.ui.clone())) as AnyChannel);
        Self::concrete(Arc::clone(entry))
    }

    fn concrete<P>(entry: AnyChannel) -> Arc<EventChannel<P>>
    where
        P: Clone + Send + Sync + 'static,
    {
        entry
            .downcast::<EventChannel<P>>()
            .unwrap_or_else(|_| unreachable!("registry stores EventChannel<P> under TypeId of P"))
    }
}

impl Default for EventAggregator {
    fn default() -> Self {
        Self::new()
    }
}
