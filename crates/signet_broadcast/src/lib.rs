//! Topic-keyed change broadcasting.
//!
//! A [`ChangeBroadcaster`] lets the write side of a resource tell every
//! interested reader that the value changed, without the two sharing anything
//! but a topic name.
//!
//! # Design Principles
//!
//! - Topics are plain resource names; there is no wildcard matching.
//! - Delivery is synchronous: [`publish`](ChangeBroadcaster::publish) returns
//!   after every current subscriber has been invoked.
//! - Subscribers receive no history. A late subscriber reads current state
//!   from wherever the value lives (usually a cache) instead.
//! - A panicking subscriber is isolated: it is logged and counted, and the
//!   remaining subscribers still receive the message.
//!
//! # Example
//!
//! ```
//! use signet_broadcast::ChangeBroadcaster;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let broadcaster = ChangeBroadcaster::<String>::new();
//! let seen = Arc::new(AtomicUsize::new(0));
//! let seen_clone = Arc::clone(&seen);
//!
//! let subscription = broadcaster.subscribe("logo", move |_url: &String| {
//!     seen_clone.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! let delivery = broadcaster.publish("logo", "b.png".to_string());
//! assert_eq!(delivery.delivered, 1);
//!
//! subscription.unsubscribe();
//! broadcaster.publish("logo", "c.png".to_string());
//! assert_eq!(seen.load(Ordering::SeqCst), 1);
//! ```

mod broadcaster;
pub mod error;
mod subscription;

pub use broadcaster::{ChangeBroadcaster, Delivery};
pub use error::BroadcastError;
pub use subscription::{SubscriberId, Subscription};
