//! The singleton resource cache.

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use core::time::Duration;
use std::sync::{Arc, Weak};

use futures::future::{BoxFuture, FutureExt, Shared};
use hashbrown::HashMap;
use parking_lot::Mutex;
use signet_broadcast::{BroadcastError, ChangeBroadcaster, Subscription};

use crate::client::RemoteResourceClient;
use crate::config::{CacheConfig, ErrorPolicy};
use crate::error::{CacheError, RemoteError};
use crate::state::{ResourceState, Revision, Snapshot};

type FetchOutcome<V> = Result<Revision<V>, CacheError>;

/// An in-flight fetch. Every concurrent `get` awaits a clone of the same future.
type PendingFetch<V> = Shared<BoxFuture<'static, FetchOutcome<V>>>;

// ─────────────────────────────────────────────────────────────────────────────
// Entry
// ─────────────────────────────────────────────────────────────────────────────

enum Slot<V> {
    Empty,
    Loading {
        /// Identifies the fetch so a late completion can tell it was superseded.
        fetch_id: u64,
        pending: PendingFetch<V>,
    },
    Ready(Arc<V>),
    Failed(CacheError),
}

struct Entry<V> {
    slot: Slot<V>,
    /// Version of the last accepted value. Survives `invalidate`.
    version: u64,
}

impl<V> Entry<V> {
    fn new() -> Self {
        Self {
            slot: Slot::Empty,
            version: 0,
        }
    }

    fn state(&self) -> ResourceState {
        match self.slot {
            Slot::Empty => ResourceState::Empty,
            Slot::Loading { .. } => ResourceState::Loading,
            Slot::Ready(_) => ResourceState::Ready,
            Slot::Failed(_) => ResourceState::Error,
        }
    }

    fn is_loading(&self, fetch_id: u64) -> bool {
        matches!(self.slot, Slot::Loading { fetch_id: id, .. } if id == fetch_id)
    }

    fn revision(&self) -> Option<Revision<V>> {
        match &self.slot {
            Slot::Ready(value) => Some(Revision {
                value: Arc::clone(value),
                version: self.version,
            }),
            _ => None,
        }
    }

    fn snapshot(&self) -> Snapshot<V> {
        Snapshot {
            state: self.state(),
            value: match &self.slot {
                Slot::Ready(value) => Some(Arc::clone(value)),
                _ => None,
            },
            version: self.version,
            error: match &self.slot {
                Slot::Failed(error) => Some(error.clone()),
                _ => None,
            },
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SingletonResourceCache
// ─────────────────────────────────────────────────────────────────────────────

struct CacheInner<C: RemoteResourceClient> {
    client: Arc<C>,
    config: CacheConfig,
    entries: Mutex<HashMap<String, Entry<C::Value>>>,
    broadcaster: ChangeBroadcaster<Revision<C::Value>>,
    /// Source of every version number handed out by this cache.
    versions: AtomicU64,
    fetches: AtomicU64,
    /// Bumped by every `reset`. Bindings drop what they show when it moves.
    epoch: Arc<AtomicU64>,
}

/// In-memory, write-through cache for a small number of named singleton
/// resources backed by a [`RemoteResourceClient`].
///
/// The cache is a cheap handle; clones share the same state. Construct one per
/// application session with [`init`](Self::init) and call [`reset`](Self::reset)
/// at logout.
///
/// # Guarantees
///
/// - Concurrent [`get`](Self::get) calls on a cold resource share a single
///   remote fetch and settle together with the same result.
/// - [`set`](Self::set) stores and broadcasts a value only after the remote
///   write succeeded. Subscribers run before `set` returns.
/// - Every accepted value receives a version larger than any before it.
///
/// # Known limitation
///
/// Concurrent `set` calls are not coalesced. The cache keeps whichever write
/// completes last (last-writer-wins, no conflict detection), and subscribers
/// may observe the two broadcasts out of order; [`Revision::version`] tells
/// them which one is newer.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use signet_cache::{RemoteError, RemoteResourceClient, SingletonResourceCache};
///
/// struct StaticLogo;
///
/// #[async_trait]
/// impl RemoteResourceClient for StaticLogo {
///     type Value = String;
///     type Payload = String;
///
///     async fn fetch(&self, _resource: &str) -> Result<String, RemoteError> {
///         Ok("a.png".to_string())
///     }
///
///     async fn write(&self, _resource: &str, payload: String) -> Result<String, RemoteError> {
///         Ok(payload)
///     }
/// }
///
/// # futures::executor::block_on(async {
/// let cache = SingletonResourceCache::new(StaticLogo);
/// assert!(cache.peek("logo").is_none());
///
/// let logo = cache.get("logo").await?;
/// assert_eq!(*logo, "a.png");
/// assert_eq!(cache.peek("logo").as_deref().map(String::as_str), Some("a.png"));
/// # Ok::<(), signet_cache::CacheError>(())
/// # }).unwrap();
/// ```
pub struct SingletonResourceCache<C: RemoteResourceClient> {
    inner: Arc<CacheInner<C>>,
}

impl<C: RemoteResourceClient> Clone for SingletonResourceCache<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: RemoteResourceClient> SingletonResourceCache<C> {
    /// Creates an empty cache with the default configuration.
    #[must_use]
    pub fn new(client: C) -> Self {
        Self::init(client, CacheConfig::default())
    }

    /// Creates an empty cache over `client`.
    #[must_use]
    pub fn init(client: C, config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                client: Arc::new(client),
                config,
                entries: Mutex::new(HashMap::new()),
                broadcaster: ChangeBroadcaster::new(),
                versions: AtomicU64::new(0),
                fetches: AtomicU64::new(0),
                epoch: Arc::new(AtomicU64::new(0)),
            }),
        }
    }

    /// Returns the value of `resource`, fetching it if nothing is cached.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::FetchFailed`] if the remote read fails. Under
    /// [`ErrorPolicy::Surface`] the stored failure is returned without a new
    /// fetch until the resource is invalidated.
    pub async fn get(&self, resource: &str) -> Result<Arc<C::Value>, CacheError> {
        self.get_revision(resource)
            .await
            .map(|revision| revision.value)
    }

    /// Like [`get`](Self::get), but also reports the version of the value.
    ///
    /// If the resource was written, invalidated or reset while the fetch was in
    /// flight, the fetched value is not stored. Callers then receive the value
    /// the cache holds now, or the fetched value with version `0` if it holds
    /// none.
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub async fn get_revision(&self, resource: &str) -> Result<Revision<C::Value>, CacheError> {
        let pending = {
            let mut entries = self.inner.entries.lock();
            let entry = entries.entry_ref(resource).or_insert_with(Entry::new);

            match &entry.slot {
                Slot::Ready(value) => {
                    tracing::debug!(resource, version = entry.version, "cache hit");
                    return Ok(Revision {
                        value: Arc::clone(value),
                        version: entry.version,
                    });
                }
                Slot::Loading { pending, .. } => {
                    tracing::debug!(resource, "joining in-flight fetch");
                    pending.clone()
                }
                Slot::Failed(error) if self.inner.config.error_policy == ErrorPolicy::Surface => {
                    return Err(error.clone());
                }
                Slot::Empty | Slot::Failed(_) => {
                    let fetch_id = self.inner.fetches.fetch_add(1, Ordering::Relaxed) + 1;
                    let pending = self.start_fetch(resource, fetch_id);
                    entry.slot = Slot::Loading {
                        fetch_id,
                        pending: pending.clone(),
                    };
                    pending
                }
            }
        };

        pending.await
    }

    /// Writes `payload` to the backend and, once it is accepted, caches and
    /// broadcasts the stored value.
    ///
    /// Every subscriber of `resource` has been invoked with the new value by
    /// the time this returns `Ok`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::WriteFailed`] if the remote write fails. The cache
    /// is left untouched and nothing is broadcast.
    pub async fn set(
        &self,
        resource: &str,
        payload: C::Payload,
    ) -> Result<Arc<C::Value>, CacheError> {
        let written = bounded(
            self.inner.config.remote_timeout,
            self.inner.client.write(resource, payload),
        )
        .await
        .map_err(|source| {
            let error = CacheError::WriteFailed {
                resource: resource.to_owned(),
                source,
            };
            tracing::warn!(resource, error = %error, "write rejected, cache unchanged");
            error
        })?;

        let revision = self.inner.accept(resource, Arc::new(written), "write");
        Ok(revision.value)
    }

    /// Stores a value learned outside this cache's write path and broadcasts it.
    ///
    /// Use this when another part of the application already performed the
    /// remote write and only the new value needs to reach the cache.
    pub fn apply_external(&self, resource: &str, value: C::Value) -> Revision<C::Value> {
        self.inner.accept(resource, Arc::new(value), "external")
    }

    /// Returns the cached value without fetching.
    ///
    /// `None` unless the resource is [`ResourceState::Ready`].
    #[must_use]
    pub fn peek(&self, resource: &str) -> Option<Arc<C::Value>> {
        let entries = self.inner.entries.lock();
        match &entries.get(resource)?.slot {
            Slot::Ready(value) => Some(Arc::clone(value)),
            _ => None,
        }
    }

    /// Returns the lifecycle state of `resource`.
    #[must_use]
    pub fn state(&self, resource: &str) -> ResourceState {
        let entries = self.inner.entries.lock();
        entries.get(resource).map_or(ResourceState::Empty, Entry::state)
    }

    /// Returns a point-in-time view of `resource` for external-store bindings.
    #[must_use]
    pub fn snapshot(&self, resource: &str) -> Snapshot<C::Value> {
        let entries = self.inner.entries.lock();
        entries
            .get(resource)
            .map_or_else(Snapshot::empty, Entry::snapshot)
    }

    /// Registers `callback` for every value accepted for `resource` through
    /// [`set`](Self::set) or [`apply_external`](Self::apply_external).
    ///
    /// Subscribers receive no history; read [`peek`](Self::peek) or
    /// [`snapshot`](Self::snapshot) after subscribing for the current value.
    pub fn subscribe<F>(&self, resource: &str, callback: F) -> Subscription
    where
        F: Fn(&Revision<C::Value>) + Send + Sync + 'static,
    {
        self.inner.broadcaster.subscribe(resource, callback)
    }

    /// Alias of [`subscribe`](Self::subscribe) for external-store bindings.
    pub fn on_change<F>(&self, resource: &str, handler: F) -> Subscription
    where
        F: Fn(&Revision<C::Value>) + Send + Sync + 'static,
    {
        self.subscribe(resource, handler)
    }

    /// Registers a named subscriber, e.g. one per UI region.
    ///
    /// # Errors
    ///
    /// Returns [`BroadcastError::DuplicateName`] if `name` already listens on
    /// `resource`.
    pub fn subscribe_named<F>(
        &self,
        resource: &str,
        name: impl Into<String>,
        callback: F,
    ) -> Result<Subscription, BroadcastError>
    where
        F: Fn(&Revision<C::Value>) + Send + Sync + 'static,
    {
        self.inner
            .broadcaster
            .subscribe_named(resource, name, callback)
    }

    /// Marks `resource` as stale without fetching or notifying anyone.
    ///
    /// An in-flight fetch keeps running for the callers already waiting on it,
    /// but its result is no longer stored.
    pub fn invalidate(&self, resource: &str) {
        let mut entries = self.inner.entries.lock();
        if let Some(entry) = entries.get_mut(resource) {
            let previous = entry.state();
            entry.slot = Slot::Empty;
            tracing::debug!(resource, from = %previous, "resource invalidated");
        }
    }

    /// Drops every cached resource. Subscriptions stay registered, and mounted
    /// [`ResourceBinding`](crate::ResourceBinding)s stop showing the values
    /// they held.
    pub fn reset(&self) {
        self.inner.reset();
    }

    /// Returns a handle that resets this cache without keeping it alive.
    ///
    /// Hand this to whatever ends the session; the cache is freed once every
    /// clone of it is dropped.
    #[must_use]
    pub fn downgrade(&self) -> Weak<dyn Resettable> {
        let inner: Weak<CacheInner<C>> = Arc::downgrade(&self.inner);
        inner
    }

    pub(crate) fn epoch(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.inner.epoch)
    }

    /// Returns the broadcaster used for change notifications.
    #[must_use]
    pub fn broadcaster(&self) -> &ChangeBroadcaster<Revision<C::Value>> {
        &self.inner.broadcaster
    }

    /// Returns the underlying client.
    #[must_use]
    pub fn client(&self) -> &C {
        &self.inner.client
    }

    /// Returns the cache configuration.
    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    fn start_fetch(&self, resource: &str, fetch_id: u64) -> PendingFetch<C::Value> {
        let cache: Weak<CacheInner<C>> = Arc::downgrade(&self.inner);
        let client = Arc::clone(&self.inner.client);
        let limit = self.inner.config.remote_timeout;
        let resource = resource.to_owned();
        tracing::debug!(resource = %resource, fetch_id, "starting fetch");

        async move {
            let outcome = bounded(limit, client.fetch(&resource)).await;
            match cache.upgrade() {
                Some(inner) => inner.complete_fetch(&resource, fetch_id, outcome),
                None => outcome
                    .map(|value| Revision {
                        value: Arc::new(value),
                        version: 0,
                    })
                    .map_err(|source| CacheError::FetchFailed { resource, source }),
            }
        }
        .boxed()
        .shared()
    }
}

impl<C: RemoteResourceClient> CacheInner<C> {
    fn next_version(&self) -> u64 {
        self.versions.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Applies a finished fetch, unless the entry moved on while it ran.
    fn complete_fetch(
        &self,
        resource: &str,
        fetch_id: u64,
        outcome: Result<C::Value, RemoteError>,
    ) -> FetchOutcome<C::Value> {
        let mut entries = self.entries.lock();
        let entry = match entries.get_mut(resource) {
            Some(entry) if entry.is_loading(fetch_id) => entry,
            other => {
                let current = other.and_then(|entry| entry.revision());
                tracing::warn!(resource, fetch_id, "fetch result discarded, resource changed while loading");
                return match (current, outcome) {
                    (Some(revision), _) => Ok(revision),
                    (None, Ok(value)) => Ok(Revision {
                        value: Arc::new(value),
                        version: 0,
                    }),
                    (None, Err(source)) => Err(CacheError::FetchFailed {
                        resource: resource.to_owned(),
                        source,
                    }),
                };
            }
        };

        match outcome {
            Ok(value) => {
                let revision = Revision {
                    value: Arc::new(value),
                    version: self.next_version(),
                };
                entry.version = revision.version;
                entry.slot = Slot::Ready(Arc::clone(&revision.value));
                tracing::info!(resource, version = revision.version, "resource loaded");
                Ok(revision)
            }
            Err(source) => {
                let error = CacheError::FetchFailed {
                    resource: resource.to_owned(),
                    source,
                };
                entry.slot = Slot::Failed(error.clone());
                tracing::warn!(resource, error = %error, "fetch failed");
                Err(error)
            }
        }
    }

    /// Stores `value` as the newest revision of `resource` and broadcasts it.
    fn accept(&self, resource: &str, value: Arc<C::Value>, origin: &'static str) -> Revision<C::Value> {
        let revision = {
            let mut entries = self.entries.lock();
            let entry = entries.entry_ref(resource).or_insert_with(Entry::new);
            let revision = Revision {
                value,
                version: self.next_version(),
            };
            entry.version = revision.version;
            entry.slot = Slot::Ready(Arc::clone(&revision.value));
            revision
        };

        tracing::info!(resource, version = revision.version, origin, "resource updated");
        self.broadcaster.publish(resource, revision.clone());
        revision
    }
}

impl<C: RemoteResourceClient> fmt::Debug for SingletonResourceCache<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.inner.entries.lock();
        let mut map = f.debug_map();
        for (resource, entry) in entries.iter() {
            map.entry(resource, &entry.state());
        }
        map.finish()
    }
}

/// Runs a remote call under the configured time limit.
async fn bounded<T>(
    limit: Option<Duration>,
    call: impl Future<Output = Result<T, RemoteError>>,
) -> Result<T, RemoteError> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .unwrap_or_else(|_| Err(RemoteError::Timeout(limit))),
        None => call.await,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Resettable
// ─────────────────────────────────────────────────────────────────────────────

/// Session-scoped state that must be cleared at logout.
pub trait Resettable: Send + Sync {
    /// Drops everything tied to the current session.
    fn reset(&self);
}

impl<C: RemoteResourceClient> Resettable for CacheInner<C> {
    fn reset(&self) {
        let mut entries = self.entries.lock();
        let cleared = entries.len();
        entries.clear();
        self.epoch.fetch_add(1, Ordering::Release);
        tracing::info!(cleared, "cache reset");
    }
}

impl<C: RemoteResourceClient> Resettable for SingletonResourceCache<C> {
    fn reset(&self) {
        SingletonResourceCache::reset(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::executor::block_on;

    struct Echo;

    #[async_trait]
    impl RemoteResourceClient for Echo {
        type Value = String;
        type Payload = String;

        async fn fetch(&self, resource: &str) -> Result<String, RemoteError> {
            Ok(format!("{resource}.png"))
        }

        async fn write(&self, _resource: &str, payload: String) -> Result<String, RemoteError> {
            Ok(payload)
        }
    }

    #[test]
    fn unknown_resource_is_empty() {
        let cache = SingletonResourceCache::new(Echo);
        assert_eq!(cache.state("logo"), ResourceState::Empty);
        assert!(cache.peek("logo").is_none());
        assert_eq!(cache.snapshot("logo").version, 0);
    }

    #[test]
    fn invalidate_unknown_resource_is_noop() {
        let cache = SingletonResourceCache::new(Echo);
        cache.invalidate("logo");
        assert_eq!(cache.state("logo"), ResourceState::Empty);
    }

    #[test]
    fn versions_are_shared_across_resources() {
        let cache = SingletonResourceCache::new(Echo);
        let logo = block_on(cache.get_revision("logo")).unwrap();
        let about = block_on(cache.get_revision("about")).unwrap();
        assert_eq!(logo.version, 1);
        assert_eq!(about.version, 2);
        assert_eq!(*about.value, "about.png");
    }

    #[test]
    fn invalidate_keeps_last_version() {
        let cache = SingletonResourceCache::new(Echo);
        block_on(cache.get("logo")).unwrap();
        cache.invalidate("logo");

        let snapshot = cache.snapshot("logo");
        assert_eq!(snapshot.state, ResourceState::Empty);
        assert_eq!(snapshot.version, 1);
        assert!(snapshot.value.is_none());
    }

    #[test]
    fn apply_external_does_not_touch_the_client() {
        let cache = SingletonResourceCache::new(Echo);
        let revision = cache.apply_external("logo", "pushed.png".to_string());

        assert!(revision.is_accepted());
        assert_eq!(cache.peek("logo").as_deref().map(String::as_str), Some("pushed.png"));
    }

    #[test]
    fn resettable_clears_through_trait_object() {
        let cache = SingletonResourceCache::new(Echo);
        block_on(cache.get("logo")).unwrap();

        let resettable: Arc<dyn Resettable> = Arc::new(cache.clone());
        resettable.reset();

        assert!(cache.peek("logo").is_none());
    }

    #[test]
    fn downgraded_handle_resets_without_owning() {
        let cache = SingletonResourceCache::new(Echo);
        block_on(cache.get("logo")).unwrap();

        let handle = cache.downgrade();
        handle.upgrade().unwrap().reset();
        assert!(cache.peek("logo").is_none());

        drop(cache);
        assert!(handle.upgrade().is_none());
    }
}
