//! # Signet Internal Library
//!
//! Re-exports the signet crates for convenience.

/// Topic-keyed change broadcasting.
pub use signet_broadcast;

/// Singleton resource cache and consumer bindings.
pub use signet_cache;

/// Logging setup.
pub use signet_core;

/// HTTP backend and the logo resource.
pub use signet_remote;

/// Session state and logout.
pub use signet_session;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use signet_broadcast::{BroadcastError, ChangeBroadcaster, Subscription};
    pub use signet_cache::{
        CacheConfig, CacheError, ErrorPolicy, RemoteError, RemoteResourceClient, ResourceBinding,
        ResourceState, Resettable, Revision, SingletonResourceCache, Snapshot,
    };
    pub use signet_core::{LogFormat, LoggingConfig};
    pub use signet_remote::{HttpClientConfig, HttpResourceClient, LOGO, Logo, Upload};
    pub use signet_session::{AuthState, Session, TokenSource, UserRole};
}
