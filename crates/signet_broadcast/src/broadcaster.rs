//! The topic registry and its synchronous delivery loop.

use core::any::Any;
use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Weak};

use hashbrown::HashMap;
use parking_lot::RwLock;

use crate::error::BroadcastError;
use crate::subscription::{Detach, SubscriberId, Subscription};

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

// ─────────────────────────────────────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────────────────────────────────────

/// One registration on a topic.
struct SubscriberEntry<T> {
    id: SubscriberId,
    /// Human-readable name for logging and duplicate checks.
    name: String,
    /// Cleared by [`Subscription::unsubscribe`] before the entry is removed.
    active: Arc<AtomicBool>,
    callback: Callback<T>,
}

impl<T> Clone for SubscriberEntry<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            active: Arc::clone(&self.active),
            callback: Arc::clone(&self.callback),
        }
    }
}

struct Registry<T> {
    topics: RwLock<HashMap<String, Vec<SubscriberEntry<T>>>>,
    next_id: AtomicU64,
}

impl<T: 'static> Detach for Registry<T> {
    fn detach(&self, topic: &str, id: SubscriberId) {
        let mut topics = self.topics.write();
        if let Some(entries) = topics.get_mut(topic) {
            entries.retain(|entry| entry.id != id);
            if entries.is_empty() {
                topics.remove(topic);
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Delivery
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of a single [`publish`](ChangeBroadcaster::publish).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Subscribers whose callback returned normally.
    pub delivered: usize,
    /// Subscribers whose callback panicked.
    pub failed: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// ChangeBroadcaster
// ─────────────────────────────────────────────────────────────────────────────

/// Publish/subscribe channel keyed by topic name.
///
/// Clones are cheap and share one registry, so a broadcaster can be handed to
/// every part of an application that needs to observe or announce changes.
///
/// # Thread Safety
///
/// The registry sits behind an [`RwLock`], but no lock is held while callbacks
/// run. Callbacks may therefore subscribe, unsubscribe, or publish again.
///
/// # Ordering
///
/// Subscribers of one topic are invoked in registration order. Callers should
/// not rely on this; it is not part of the contract.
pub struct ChangeBroadcaster<T> {
    registry: Arc<Registry<T>>,
}

impl<T> Clone for ChangeBroadcaster<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<T: 'static> Default for ChangeBroadcaster<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> ChangeBroadcaster<T> {
    /// Creates a broadcaster with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Registry {
                topics: RwLock::new(HashMap::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Registers an anonymous subscriber on `topic`.
    ///
    /// The subscriber is named `subscriber-<id>` in logs.
    pub fn subscribe<F>(&self, topic: impl Into<String>, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let topic = topic.into();
        let id = self.next_id();
        let name = format!("subscriber-{}", id.get());

        let mut topics = self.registry.topics.write();
        self.attach(&mut topics, id, topic, name, Arc::new(callback))
    }

    /// Registers a named subscriber on `topic`.
    ///
    /// # Errors
    ///
    /// Returns [`BroadcastError::DuplicateName`] if `name` is already
    /// subscribed to `topic`. The same name on a different topic is fine.
    pub fn subscribe_named<F>(
        &self,
        topic: impl Into<String>,
        name: impl Into<String>,
        callback: F,
    ) -> Result<Subscription, BroadcastError>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let topic = topic.into();
        let name = name.into();

        let mut topics = self.registry.topics.write();
        let taken = topics
            .get(&topic)
            .is_some_and(|entries| entries.iter().any(|entry| entry.name == name));
        if taken {
            return Err(BroadcastError::DuplicateName { topic, name });
        }

        let id = self.next_id();
        Ok(self.attach(&mut topics, id, topic, name, Arc::new(callback)))
    }

    /// Delivers `message` to every active subscriber of `topic`.
    ///
    /// All subscribers receive a reference to the same `message`. A callback
    /// that panics is reported as [`BroadcastError::SubscriberCallbackFailed`]
    /// in the log and counted in [`Delivery::failed`]; delivery continues with
    /// the next subscriber.
    ///
    /// Subscribers added while this call runs are not invoked by it.
    pub fn publish(&self, topic: &str, message: T) -> Delivery {
        let subscribers: Vec<SubscriberEntry<T>> = {
            let topics = self.registry.topics.read();
            topics.get(topic).map(|entries| entries.to_vec()).unwrap_or_default()
        };

        let mut delivery = Delivery::default();
        for subscriber in &subscribers {
            if !subscriber.active.load(Ordering::Acquire) {
                continue;
            }

            let callback = &subscriber.callback;
            match catch_unwind(AssertUnwindSafe(|| callback(&message))) {
                Ok(()) => delivery.delivered += 1,
                Err(payload) => {
                    delivery.failed += 1;
                    let error = BroadcastError::SubscriberCallbackFailed {
                        topic: topic.to_owned(),
                        subscriber: subscriber.name.clone(),
                        reason: panic_message(payload.as_ref()),
                    };
                    tracing::error!(error = %error, "subscriber callback failed");
                }
            }
        }

        tracing::debug!(
            topic,
            delivered = delivery.delivered,
            failed = delivery.failed,
            "change published"
        );
        delivery
    }

    /// Returns the number of subscribers registered on `topic`.
    #[must_use]
    pub fn subscriber_count(&self, topic: &str) -> usize {
        let topics = self.registry.topics.read();
        topics.get(topic).map_or(0, Vec::len)
    }

    /// Checks if a subscriber with the given name exists on `topic`.
    #[must_use]
    pub fn contains_subscriber(&self, topic: &str, name: &str) -> bool {
        let topics = self.registry.topics.read();
        topics
            .get(topic)
            .is_some_and(|entries| entries.iter().any(|entry| entry.name == name))
    }

    /// Lists topics that currently have at least one subscriber.
    #[must_use]
    pub fn topics(&self) -> Vec<String> {
        let topics = self.registry.topics.read();
        topics.keys().cloned().collect()
    }

    fn next_id(&self) -> SubscriberId {
        SubscriberId(self.registry.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn attach(
        &self,
        topics: &mut HashMap<String, Vec<SubscriberEntry<T>>>,
        id: SubscriberId,
        topic: String,
        name: String,
        callback: Callback<T>,
    ) -> Subscription {
        let active = Arc::new(AtomicBool::new(true));
        topics
            .entry(topic.clone())
            .or_default()
            .push(SubscriberEntry {
                id,
                name: name.clone(),
                active: Arc::clone(&active),
                callback,
            });
        tracing::debug!(topic = %topic, subscriber = %name, "subscriber attached");

        let registry: Weak<dyn Detach> = Arc::downgrade(&self.registry) as Weak<dyn Detach>;
        Subscription::new(id, topic, name, active, registry)
    }
}

impl<T> fmt::Debug for ChangeBroadcaster<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let topics = self.registry.topics.read();
        let mut map = f.debug_map();
        for (topic, entries) in topics.iter() {
            map.entry(topic, &entries.len());
        }
        map.finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "callback panicked".to_string()
    }
}
