//! Subscription handles returned by the broadcaster.

use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// Unique identifier for a single registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(pub(crate) u64);

impl SubscriberId {
    /// Returns the raw numeric identifier.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Removal side of a registry, erased over the message type.
pub(crate) trait Detach: Send + Sync {
    fn detach(&self, topic: &str, id: SubscriberId);
}

/// Handle to one registration on a [`ChangeBroadcaster`](crate::ChangeBroadcaster).
///
/// The subscriber owns this handle. [`unsubscribe`](Self::unsubscribe) removes
/// exactly this registration and may be called any number of times; dropping
/// the handle does the same.
///
/// The handle holds only a weak reference to the broadcaster, so it never keeps
/// the broadcaster alive, and the broadcaster never keeps the subscriber alive
/// beyond the callback it was given.
#[must_use = "dropping a Subscription unsubscribes it immediately"]
pub struct Subscription {
    id: SubscriberId,
    topic: String,
    name: String,
    active: Arc<AtomicBool>,
    registry: Weak<dyn Detach>,
}

impl Subscription {
    pub(crate) fn new(
        id: SubscriberId,
        topic: String,
        name: String,
        active: Arc<AtomicBool>,
        registry: Weak<dyn Detach>,
    ) -> Self {
        Self {
            id,
            topic,
            name,
            active,
            registry,
        }
    }

    /// Removes this registration. Calling it again is a no-op.
    pub fn unsubscribe(&self) {
        // The flag flips first so a publish already in progress skips us.
        if !self.active.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.detach(&self.topic, self.id);
        }
        tracing::debug!(topic = %self.topic, subscriber = %self.name, "subscriber detached");
    }

    /// Returns `true` while the registration can still receive messages.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire) && self.registry.strong_count() > 0
    }

    /// Returns the registration's identifier.
    #[must_use]
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Returns the topic this registration listens on.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Returns the subscriber name used in logs and duplicate checks.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("topic", &self.topic)
            .field("name", &self.name)
            .field("active", &self.active.load(Ordering::Acquire))
            .finish()
    }
}
