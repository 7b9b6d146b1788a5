//! Observable state of a cached resource.

use core::fmt;
use std::sync::Arc;

use crate::error::CacheError;

/// Lifecycle state of one resource in the cache.
///
/// ```text
/// Empty ──get──▶ Loading ──ok──▶ Ready ◀──set / apply_external── (any)
///                   │
///                   └──err──▶ Error ──get (retry)──▶ Loading
/// invalidate / reset ──▶ Empty
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ResourceState {
    /// Nothing cached and no fetch in flight.
    #[default]
    Empty,
    /// A fetch is in flight.
    Loading,
    /// A value is cached.
    Ready,
    /// The last fetch failed.
    Error,
}

impl ResourceState {
    /// Returns the state name for logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceState::Empty => "empty",
            ResourceState::Loading => "loading",
            ResourceState::Ready => "ready",
            ResourceState::Error => "error",
        }
    }
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value together with the version it was accepted under.
///
/// This is what subscribers receive. Versions come from a single counter per
/// cache, so a larger version is always the newer value; consumers use this to
/// drop notifications that arrive after a fresher value.
///
/// A version of `0` marks a fetched value that lost a race (the resource was
/// written, invalidated or reset while the fetch ran) and was not stored.
pub struct Revision<V> {
    /// The accepted value.
    pub value: Arc<V>,
    /// Version under which the value was accepted.
    pub version: u64,
}

impl<V> Revision<V> {
    /// Returns `true` if this value was stored in the cache.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.version > 0
    }

    /// Returns `true` if this revision supersedes a value seen at `version`.
    #[must_use]
    pub fn is_newer_than(&self, version: u64) -> bool {
        self.version > version
    }
}

impl<V> Clone for Revision<V> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            version: self.version,
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Revision<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Revision")
            .field("value", &self.value)
            .field("version", &self.version)
            .finish()
    }
}

/// Point-in-time view of a resource, suitable for an external-store binding.
pub struct Snapshot<V> {
    /// Current lifecycle state.
    pub state: ResourceState,
    /// The cached value; `Some` exactly when `state` is [`ResourceState::Ready`].
    pub value: Option<Arc<V>>,
    /// Version of the last accepted value, `0` if none was ever accepted.
    pub version: u64,
    /// The failure behind [`ResourceState::Error`].
    pub error: Option<CacheError>,
}

impl<V> Snapshot<V> {
    /// Snapshot of a resource that has never been loaded.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            state: ResourceState::Empty,
            value: None,
            version: 0,
            error: None,
        }
    }
}

impl<V> Clone for Snapshot<V> {
    fn clone(&self) -> Self {
        Self {
            state: self.state,
            value: self.value.clone(),
            version: self.version,
            error: self.error.clone(),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Snapshot<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("state", &self.state)
            .field("value", &self.value)
            .field("version", &self.version)
            .field("error", &self.error)
            .finish()
    }
}
