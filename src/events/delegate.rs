//! # Delegate references: strong or weak handles to subscriber callables.
//!
//! [`DelegateRef`] is how the bus holds a subscriber's action or filter
//! without necessarily keeping the subscriber alive:
//!
//! - **Strong** — the callable is held directly and lives as long as the
//!   reference does (`keep_alive` semantics). Free functions and closures
//!   have no owning object, so this is also their natural form.
//! - **Weak** — only a [`Weak`] handle to the owning object is held, together
//!   with the method to call on it. A live callable is reconstituted on
//!   demand; once the last external [`Arc`] to the owner drops, the reference
//!   is permanently dead and [`resolve`](DelegateRef::resolve) returns
//!   `None`. That is a normal end-of-life state, never an error.
//!
//! ## Example
//! ```
//! use std::sync::Arc;
//! use typedbus::DelegateRef;
//!
//! struct Counter;
//! impl Counter {
//!     fn on_value(&self, _n: &u32) {}
//! }
//!
//! let owner = Arc::new(Counter);
//! let weak = DelegateRef::weak(&owner, Counter::on_value);
//! assert!(weak.is_alive());
//!
//! drop(owner);
//! assert!(!weak.is_alive());
//! assert!(weak.resolve().is_none());
//! ```

use std::sync::{Arc, Weak};

/// A resolved, ready-to-invoke callable taking `&P` and returning `R`.
pub type Callable<P, R = ()> = Arc<dyn Fn(&P) -> R + Send + Sync>;

/// Reference to a subscriber callable, held strongly or weakly.
///
/// `R` defaults to `()` (an action); filters use `DelegateRef<P, bool>`.
pub struct DelegateRef<P, R = ()> {
    inner: Inner<P, R>,
}

enum Inner<P, R> {
    Strong(Callable<P, R>),
    /// Rebuilds a live callable from the weakly-held owner, or `None` once
    /// the owner has been dropped.
    Weak(Arc<dyn Fn() -> Option<Callable<P, R>> + Send + Sync>),
}

impl<P: 'static, R: 'static> DelegateRef<P, R> {
    /// Creates a strong reference that keeps the callable alive for the
    /// lifetime of this reference.
    pub fn strong<F>(callable: F) -> Self
    where
        F: Fn(&P) -> R + Send + Sync + 'static,
    {
        Self {
            inner: Inner::Strong(Arc::new(callable)),
        }
    }

    /// Creates a weak reference to `method` on `owner`.
    ///
    /// Only a [`Weak`] handle to `owner` is retained, so this reference does
    /// not keep the subscriber alive. `method` is a plain function pointer on
    /// purpose: it cannot smuggle in a strong capture of the owner.
    pub fn weak<S>(owner: &Arc<S>, method: fn(&S, &P) -> R) -> Self
    where
        S: Send + Sync + 'static,
    {
        let owner: Weak<S> = Arc::downgrade(owner);
        let rebuild = move || -> Option<Callable<P, R>> {
            let target = owner.upgrade()?;
            Some(Arc::new(move |payload: &P| method(&target, payload)))
        };
        Self {
            inner: Inner::Weak(Arc::new(rebuild)),
        }
    }

    /// Returns the callable if it is still alive.
    ///
    /// Strong references always resolve. Weak references resolve to a fresh
    /// callable holding a strong handle to the owner — the owner cannot be
    /// dropped while the resolved callable exists — or to `None` once the
    /// owner is gone. Never fails; "not alive" is a normal result.
    #[must_use]
    pub fn resolve(&self) -> Option<Callable<P, R>> {
        match &self.inner {
            Inner::Strong(callable) => Some(Arc::clone(callable)),
            Inner::Weak(rebuild) => rebuild(),
        }
    }

    /// True if [`resolve`](Self::resolve) would currently succeed.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        match &self.inner {
            Inner::Strong(_) => true,
            Inner::Weak(rebuild) => rebuild().is_some(),
        }
    }
}

impl<P: 'static> DelegateRef<P, bool> {
    /// A filter that matches every payload.
    #[must_use]
    pub fn accept_all() -> Self {
        Self::strong(|_| true)
    }
}

impl<P, R> Clone for DelegateRef<P, R> {
    fn clone(&self) -> Self {
        let inner = match &self.inner {
            Inner::Strong(callable) => Inner::Strong(Arc::clone(callable)),
            Inner::Weak(rebuild) => Inner::Weak(Arc::clone(rebuild)),
        };
        Self { inner }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct Receiver {
        hits: AtomicUsize,
    }

    impl Receiver {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                hits: AtomicUsize::new(0),
            })
        }

        fn on_value(&self, _value: &u32) {
            self.hits.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_strong_reference_always_resolves() {
        let delegate: DelegateRef<u32> = DelegateRef::strong(|_| {});
        assert!(delegate.is_alive());
        let callable = delegate.resolve().unwrap();
        callable(&7);
    }

    #[test]
    fn test_weak_reference_resolves_while_owner_lives() {
        let owner = Receiver::new();
        let delegate = DelegateRef::weak(&owner, Receiver::on_value);

        let callable = delegate.resolve().unwrap();
        callable(&1);
        callable(&2);
        assert_eq!(owner.hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_weak_reference_dies_with_owner() {
        let owner = Receiver::new();
        let delegate = DelegateRef::weak(&owner, Receiver::on_value);
        assert!(delegate.is_alive());

        drop(owner);
        assert!(!delegate.is_alive());
        assert!(delegate.resolve().is_none());
    }

    #[test]
    fn test_resolved_callable_pins_the_owner() {
        let owner = Receiver::new();
        let delegate = DelegateRef::weak(&owner, Receiver::on_value);

        let callable = delegate.resolve().unwrap();
        drop(owner);

        // The resolved callable holds a strong handle, so the target is
        // still invocable and new resolves still succeed.
        callable(&3);
        assert!(delegate.is_alive());

        drop(callable);
        assert!(!delegate.is_alive());
    }

    #[test]
    fn test_free_function_is_effectively_always_alive() {
        fn check(value: &u32) -> bool {
            *value > 10
        }

        let filter: DelegateRef<u32, bool> = DelegateRef::strong(check);
        let callable = filter.resolve().unwrap();
        assert!(callable(&11));
        assert!(!callable(&9));
    }
}
