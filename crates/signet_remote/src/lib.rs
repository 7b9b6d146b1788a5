//! HTTP backend for signet caches.
//!
//! [`HttpResourceClient`] implements [`RemoteResourceClient`] for a REST
//! backend that serves each resource as JSON and replaces it through a
//! multipart file upload. Resource names map to endpoints through the route
//! table in [`HttpClientConfig`]; the default table routes [`LOGO`].
//!
//! # Example
//!
//! ```no_run
//! use signet_cache::SingletonResourceCache;
//! use signet_remote::{HttpClientConfig, HttpResourceClient, LOGO, Logo};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpResourceClient::<Logo>::new(HttpClientConfig::from_env()?)?;
//! let cache = SingletonResourceCache::new(client);
//!
//! let logo = cache.get(LOGO).await?;
//! println!("{}", logo.img_url);
//! # Ok(())
//! # }
//! ```
//!
//! [`RemoteResourceClient`]: signet_cache::RemoteResourceClient

mod client;
pub mod config;
mod logo;
mod upload;

pub use client::{FALLBACK_ERROR_MESSAGE, HttpResourceClient};
pub use config::{ConfigError, HttpClientConfig, ResourceRoute};
pub use logo::{LOGO, Logo};
pub use upload::Upload;
