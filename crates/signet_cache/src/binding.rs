//! Consumer glue that keeps one UI region in sync with a cached resource.

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use signet_broadcast::{BroadcastError, Subscription};

use crate::cache::SingletonResourceCache;
use crate::client::RemoteResourceClient;
use crate::error::CacheError;
use crate::state::Revision;

type Render<V> = Arc<dyn Fn(&V) + Send + Sync>;

struct Shown<V> {
    revision: Option<Revision<V>>,
    /// Cache epoch the revision was shown in.
    epoch: u64,
}

/// What a region currently shows.
struct View<V> {
    region: String,
    /// The cache's reset counter.
    epoch: Arc<AtomicU64>,
    shown: Mutex<Shown<V>>,
    render: Option<Render<V>>,
}

impl<V> View<V> {
    fn new(region: &str, epoch: Arc<AtomicU64>, render: Option<Render<V>>) -> Self {
        let current = epoch.load(Ordering::Acquire);
        Self {
            region: region.to_owned(),
            epoch,
            shown: Mutex::new(Shown {
                revision: None,
                epoch: current,
            }),
            render,
        }
    }

    /// Returns the shown slot, emptied first if the cache was reset since.
    fn slot(&self) -> MutexGuard<'_, Shown<V>> {
        let mut shown = self.shown.lock();
        let epoch = self.epoch.load(Ordering::Acquire);
        if shown.epoch != epoch {
            if shown.revision.take().is_some() {
                tracing::debug!(region = %self.region, "cache reset, view cleared");
            }
            shown.epoch = epoch;
        }
        shown
    }

    fn revision(&self) -> Option<Revision<V>> {
        self.slot().revision.clone()
    }

    /// Accepts `revision` unless the region already shows something newer.
    fn observe(&self, revision: &Revision<V>) -> bool {
        {
            let mut shown = self.slot();
            let newer = match shown.revision.as_ref() {
                None => true,
                Some(current) => revision.is_newer_than(current.version),
            };
            if !newer {
                tracing::debug!(
                    region = %self.region,
                    version = revision.version,
                    "stale update ignored"
                );
                return false;
            }
            shown.revision = Some(revision.clone());
        }

        if let Some(render) = &self.render {
            render(&revision.value);
        }
        true
    }
}

/// A mounted view of one resource, e.g. the logo in the sidebar.
///
/// Mounting subscribes under the region's name and immediately shows whatever
/// the cache already holds. Updates arriving out of order are dropped by
/// version, so a region never goes back to an older value.
///
/// A [`reset`](SingletonResourceCache::reset) of the cache empties every
/// binding on it, mounted or not, so a region never shows a value from a
/// previous session.
///
/// Dropping the binding unmounts it.
pub struct ResourceBinding<C: RemoteResourceClient> {
    cache: SingletonResourceCache<C>,
    resource: String,
    view: Arc<View<C::Value>>,
    subscription: Subscription,
}

impl<C: RemoteResourceClient> ResourceBinding<C> {
    /// Mounts `region` on `resource`.
    ///
    /// # Errors
    ///
    /// Returns [`BroadcastError::DuplicateName`] if a region with the same name
    /// is already mounted on `resource`.
    pub fn mount(
        cache: &SingletonResourceCache<C>,
        resource: &str,
        region: &str,
    ) -> Result<Self, BroadcastError> {
        Self::attach(cache, resource, region, None)
    }

    /// Mounts `region` and calls `render` each time it shows a newer value,
    /// including the value already cached at mount time.
    ///
    /// # Errors
    ///
    /// See [`mount`](Self::mount).
    pub fn mount_with<F>(
        cache: &SingletonResourceCache<C>,
        resource: &str,
        region: &str,
        render: F,
    ) -> Result<Self, BroadcastError>
    where
        F: Fn(&C::Value) + Send + Sync + 'static,
    {
        Self::attach(cache, resource, region, Some(Arc::new(render)))
    }

    fn attach(
        cache: &SingletonResourceCache<C>,
        resource: &str,
        region: &str,
        render: Option<Render<C::Value>>,
    ) -> Result<Self, BroadcastError> {
        let view = Arc::new(View::new(region, cache.epoch(), render));

        let listener = Arc::clone(&view);
        let subscription = cache.subscribe_named(resource, region, move |revision| {
            listener.observe(revision);
        })?;

        // Subscribe first so nothing published in between is missed.
        let snapshot = cache.snapshot(resource);
        if let Some(value) = snapshot.value {
            view.observe(&Revision {
                value,
                version: snapshot.version,
            });
        }

        tracing::debug!(resource, region, "region mounted");
        Ok(Self {
            cache: cache.clone(),
            resource: resource.to_owned(),
            view,
            subscription,
        })
    }

    /// Loads the resource through the cache and shows it.
    ///
    /// Concurrent loads from several regions share one fetch.
    ///
    /// # Errors
    ///
    /// Propagates the [`CacheError`] of the underlying `get`. The region keeps
    /// showing its previous value.
    pub async fn load(&self) -> Result<Arc<C::Value>, CacheError> {
        let revision = self.cache.get_revision(&self.resource).await?;
        self.view.observe(&revision);
        Ok(self.current().unwrap_or(revision.value))
    }

    /// Returns the value this region shows, `None` before the first value and
    /// after a cache reset.
    #[must_use]
    pub fn current(&self) -> Option<Arc<C::Value>> {
        self.view.revision().map(|revision| revision.value)
    }

    /// Returns the version of the value shown, `0` if none.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.view.revision().map_or(0, |revision| revision.version)
    }

    /// Returns the region name.
    #[must_use]
    pub fn region(&self) -> &str {
        &self.view.region
    }

    /// Returns the resource this region shows.
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Returns `true` until the binding is unmounted.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.subscription.is_active()
    }

    /// Stops receiving updates. The last shown value stays readable until the
    /// cache is reset.
    pub fn unmount(&self) {
        if self.subscription.is_active() {
            self.subscription.unsubscribe();
            tracing::debug!(resource = %self.resource, region = %self.view.region, "region unmounted");
        }
    }
}

impl<C: RemoteResourceClient> fmt::Debug for ResourceBinding<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceBinding")
            .field("resource", &self.resource)
            .field("region", &self.view.region)
            .field("version", &self.version())
            .field("mounted", &self.is_mounted())
            .finish()
    }
}
