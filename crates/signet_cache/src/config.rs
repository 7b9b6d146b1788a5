//! Cache configuration.

use core::time::Duration;

/// What `get` does after a fetch has failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// The next `get` starts a fresh fetch (default).
    #[default]
    RetryOnDemand,
    /// `get` keeps returning the stored error until the resource is
    /// invalidated or the cache is reset.
    Surface,
}

/// Configuration for [`SingletonResourceCache`](crate::SingletonResourceCache).
///
/// # Example
///
/// ```
/// use signet_cache::{CacheConfig, ErrorPolicy};
/// use std::time::Duration;
///
/// let config = CacheConfig::default()
///     .with_error_policy(ErrorPolicy::Surface)
///     .with_remote_timeout(Duration::from_secs(10));
///
/// assert_eq!(config.error_policy, ErrorPolicy::Surface);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheConfig {
    /// Behavior of `get` after a failed fetch.
    pub error_policy: ErrorPolicy,
    /// Upper bound for a single remote fetch or write. `None` waits forever.
    ///
    /// Requires a Tokio runtime when set.
    pub remote_timeout: Option<Duration>,
}

impl CacheConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the error policy.
    #[must_use]
    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    /// Bounds every remote call by `timeout`.
    #[must_use]
    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_retries_and_never_times_out() {
        let config = CacheConfig::default();
        assert_eq!(config.error_policy, ErrorPolicy::RetryOnDemand);
        assert_eq!(config.remote_timeout, None);
    }

    #[test]
    fn builder_sets_fields() {
        let config = CacheConfig::new()
            .with_error_policy(ErrorPolicy::Surface)
            .with_remote_timeout(Duration::from_millis(250));
        assert_eq!(config.error_policy, ErrorPolicy::Surface);
        assert_eq!(config.remote_timeout, Some(Duration::from_millis(250)));
    }
}
