//! HTTP client configuration.

use core::time::Duration;
use hashbrown::HashMap;

use crate::logo::LOGO;

/// Default backend of the admin shell.
pub const DEFAULT_BASE_URL: &str = "https://codebyz.online";

/// Environment variable overriding [`HttpClientConfig::base_url`].
pub const API_URL_ENV: &str = "SIGNET_API_URL";

/// Environment variable setting [`HttpClientConfig::timeout`] in whole seconds.
pub const HTTP_TIMEOUT_ENV: &str = "SIGNET_HTTP_TIMEOUT_SECS";

/// Largest logo the backend accepts.
pub const MAX_LOGO_BYTES: u64 = 2 * 1024 * 1024;

/// Errors from reading the client configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The base URL is not an absolute `http(s)` URL.
    #[error("invalid base url '{value}': expected http:// or https://")]
    InvalidBaseUrl {
        /// The rejected value.
        value: String,
    },

    /// The timeout is not a positive whole number of seconds.
    #[error("invalid {name} '{value}': expected a positive number of seconds")]
    InvalidTimeout {
        /// The variable that held the value.
        name: &'static str,
        /// The rejected value.
        value: String,
    },
}

/// Where one resource is read from and written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRoute {
    /// Path of the `GET` endpoint.
    pub read: String,
    /// Path of the multipart `POST` endpoint.
    pub write: String,
    /// Accepted upload content type; a trailing `*` matches any suffix.
    pub accept: String,
    /// Largest accepted upload, if limited.
    pub max_bytes: Option<u64>,
}

impl ResourceRoute {
    /// Creates a route accepting any content type.
    #[must_use]
    pub fn new(read: impl Into<String>, write: impl Into<String>) -> Self {
        Self {
            read: read.into(),
            write: write.into(),
            accept: "*".to_string(),
            max_bytes: None,
        }
    }

    /// Restricts uploads to `accept`, e.g. `image/*`.
    #[must_use]
    pub fn accepting(mut self, accept: impl Into<String>) -> Self {
        self.accept = accept.into();
        self
    }

    /// Limits uploads to `max_bytes`.
    #[must_use]
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = Some(max_bytes);
        self
    }
}

/// Configuration for [`HttpResourceClient`](crate::HttpResourceClient).
///
/// # Example
///
/// ```
/// use signet_remote::{HttpClientConfig, ResourceRoute};
/// use std::time::Duration;
///
/// let config = HttpClientConfig::default()
///     .with_base_url("http://localhost:8080")
///     .unwrap()
///     .with_timeout(Duration::from_secs(5))
///     .with_route("about", ResourceRoute::new("/about", "/about"));
///
/// assert!(config.route("logo").is_some());
/// assert!(config.route("about").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpClientConfig {
    /// Backend origin without a trailing slash.
    pub base_url: String,
    /// Per-request timeout. `None` uses the HTTP client's default.
    pub timeout: Option<Duration>,
    routes: HashMap<String, ResourceRoute>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        let mut routes = HashMap::new();
        routes.insert(
            LOGO.to_string(),
            ResourceRoute::new("/logo", "/logo/upload")
                .accepting("image/*")
                .with_max_bytes(MAX_LOGO_BYTES),
        );
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            routes,
        }
    }
}

impl HttpClientConfig {
    /// Reads overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads overrides through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    ///
    /// See [`from_env`](Self::from_env).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = lookup(API_URL_ENV) {
            config = config.with_base_url(url)?;
        }

        if let Some(raw) = lookup(HTTP_TIMEOUT_ENV) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::InvalidTimeout {
                    name: HTTP_TIMEOUT_ENV,
                    value: raw.clone(),
                })?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Sets the backend origin.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] unless `url` starts with
    /// `http://` or `https://`.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let trimmed = url.trim().trim_end_matches('/');
        let has_host = ["http://", "https://"]
            .iter()
            .any(|scheme| trimmed.strip_prefix(scheme).is_some_and(|host| !host.is_empty()));
        if !has_host {
            return Err(ConfigError::InvalidBaseUrl { value: url });
        }

        self.base_url = trimmed.to_owned();
        Ok(self)
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Adds or replaces the route of `resource`.
    #[must_use]
    pub fn with_route(mut self, resource: impl Into<String>, route: ResourceRoute) -> Self {
        self.routes.insert(resource.into(), route);
        self
    }

    /// Returns the route of `resource`.
    #[must_use]
    pub fn route(&self, resource: &str) -> Option<&ResourceRoute> {
        self.routes.get(resource)
    }

    /// Joins `path` onto the base URL.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
