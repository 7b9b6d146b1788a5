//! Errors of the admin shell.

use signet_broadcast::BroadcastError;
use signet_cache::{CacheError, RemoteError};
use signet_remote::ConfigError;

/// Anything that can stop the shell.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    /// The environment holds an invalid setting.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP client could not be created.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// A region could not be mounted.
    #[error(transparent)]
    Mount(#[from] BroadcastError),

    /// Loading or uploading the logo failed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The upload file could not be read.
    #[error("failed to read upload: {0}")]
    Io(#[from] std::io::Error),
}
