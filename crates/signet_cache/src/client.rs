//! The [`RemoteResourceClient`] trait for backends that own singleton resources.

use crate::error::RemoteError;
use async_trait::async_trait;

/// Remote source of truth for named singleton resources.
///
/// The cache calls [`fetch`](Self::fetch) at most once per cold-to-ready
/// transition and [`write`](Self::write) once per `set`. Implementations do not
/// cache anything themselves.
#[async_trait]
pub trait RemoteResourceClient: Send + Sync + 'static {
    /// The value of a resource as returned by the backend.
    type Value: Send + Sync + 'static;

    /// What the backend accepts as a new value (for the logo, an image file).
    type Payload: Send + 'static;

    /// Reads the current value of `resource`.
    async fn fetch(&self, resource: &str) -> Result<Self::Value, RemoteError>;

    /// Replaces the value of `resource`, returning the value the backend stored.
    async fn write(
        &self,
        resource: &str,
        payload: Self::Payload,
    ) -> Result<Self::Value, RemoteError>;
}
