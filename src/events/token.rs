//! Subscription tokens returned by a channel on subscribe.
//!
//! A [`SubscriptionToken`] is the opaque handle used to unsubscribe or to ask
//! a channel whether a registration is still present. Equality and hashing
//! are structural over the underlying identifier, so a token can be stored,
//! copied around, and compared freely.

use std::fmt;

use rand::Rng;

/// Opaque, value-equatable identifier for a single subscription.
///
/// Tokens are 128-bit random values, unique per subscription for the lifetime
/// of the process. Generation never fails and has no side effects.
///
/// # Example
/// ```
/// use typedbus::SubscriptionToken;
///
/// let a = SubscriptionToken::new();
/// let b = SubscriptionToken::new();
/// assert_ne!(a, b);
/// assert_eq!(a, a);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(u128);

impl SubscriptionToken {
    /// Returns a fresh, globally-unique token.
    #[must_use]
    pub fn new() -> Self {
        Self(rand::rng().random())
    }
}

impl Default for SubscriptionToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{:032x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_tokens_are_unique() {
        let tokens: HashSet<SubscriptionToken> =
            (0..10_000).map(|_| SubscriptionToken::new()).collect();
        assert_eq!(tokens.len(), 10_000);
    }

    #[test]
    fn test_equality_is_structural() {
        let token = SubscriptionToken::new();
        let copy = token;
        assert_eq!(token, copy);
    }

    #[test]
    fn test_display_is_prefixed_hex() {
        let token = SubscriptionToken::new();
        let text = token.to_string();
        assert!(text.starts_with("sub-"));
        assert_eq!(text.len(), "sub-".len() + 32);
    }
}
