//! Error types for change broadcasting.

/// Errors raised by the broadcaster.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BroadcastError {
    /// A subscriber with this name already exists on the topic.
    #[error("subscriber '{name}' already registered for topic '{topic}'")]
    DuplicateName {
        /// The topic where the duplicate was found.
        topic: String,
        /// The duplicate subscriber name.
        name: String,
    },

    /// A subscriber's callback panicked while handling a published message.
    ///
    /// This is logged and counted by [`publish`](crate::ChangeBroadcaster::publish);
    /// it never reaches the publisher.
    #[error("subscriber '{subscriber}' on topic '{topic}' failed: {reason}")]
    SubscriberCallbackFailed {
        /// The topic being published.
        topic: String,
        /// Name of the failing subscriber.
        subscriber: String,
        /// The panic message, if one could be recovered.
        reason: String,
    },
}
