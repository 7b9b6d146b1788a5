//! Write-through cache for named singleton resources.
//!
//! A handful of application-wide values (a company logo, a site title) are
//! owned by a remote backend and shown in several places at once. This crate
//! keeps exactly one in-memory copy of each, loads it at most once no matter
//! how many regions ask for it concurrently, and tells every region when it
//! changes.
//!
//! # Overview
//!
//! - [`SingletonResourceCache`] owns the cached values and drives the remote
//!   client. `get` de-duplicates in-flight fetches; `set` writes through and
//!   broadcasts only after the backend accepted the value.
//!
//! - [`RemoteResourceClient`] is the seam to the backend. The cache never
//!   performs I/O itself.
//!
//! - [`ResourceBinding`] is the consumer side: one per UI region, it shows the
//!   newest value it has seen and ignores updates that arrive out of order.
//!
//! - [`Resettable`] lets a session clear every cache at logout without knowing
//!   their value types.
//!
//! # Example
//!
//! ```
//! use async_trait::async_trait;
//! use signet_cache::{RemoteError, RemoteResourceClient, ResourceBinding, SingletonResourceCache};
//!
//! struct Backend;
//!
//! #[async_trait]
//! impl RemoteResourceClient for Backend {
//!     type Value = String;
//!     type Payload = String;
//!
//!     async fn fetch(&self, _resource: &str) -> Result<String, RemoteError> {
//!         Ok("a.png".to_string())
//!     }
//!
//!     async fn write(&self, _resource: &str, payload: String) -> Result<String, RemoteError> {
//!         Ok(payload)
//!     }
//! }
//!
//! # futures::executor::block_on(async {
//! let cache = SingletonResourceCache::new(Backend);
//! let sidebar = ResourceBinding::mount(&cache, "logo", "sidebar").unwrap();
//!
//! cache.set("logo", "b.png".to_string()).await.unwrap();
//! assert_eq!(sidebar.current().as_deref().map(String::as_str), Some("b.png"));
//! # });
//! ```

mod binding;
mod cache;
mod client;
mod config;
pub mod error;
mod state;

pub use binding::ResourceBinding;
pub use cache::{Resettable, SingletonResourceCache};
pub use client::RemoteResourceClient;
pub use config::{CacheConfig, ErrorPolicy};
pub use error::{CacheError, RemoteError};
pub use state::{ResourceState, Revision, Snapshot};
