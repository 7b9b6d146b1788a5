//! Error types for cached resource access.

use core::time::Duration;

/// Failure reported by a [`RemoteResourceClient`](crate::RemoteResourceClient).
///
/// Cloneable so that one failed fetch can be handed to every caller that was
/// waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The request never produced a response (connection refused, DNS, TLS...).
    #[error("http error: {0}")]
    Transport(String),

    /// The request did not finish within the configured limit.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The backend answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Status {
        /// HTTP-like status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// The response could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The payload was rejected before it was sent.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// The client has no route for the requested resource.
    #[error("no route configured for resource '{0}'")]
    UnknownRoute(String),
}

impl RemoteError {
    /// Returns the HTTP-like status code, if the backend produced one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors surfaced by [`SingletonResourceCache`](crate::SingletonResourceCache).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    /// The remote read failed. Every caller sharing the fetch receives this.
    #[error("fetch of '{resource}' failed: {source}")]
    FetchFailed {
        /// The resource being fetched.
        resource: String,
        /// The underlying remote failure.
        #[source]
        source: RemoteError,
    },

    /// The remote write failed. The cached value is unchanged and nothing was
    /// broadcast; only the writer sees this.
    #[error("write of '{resource}' failed: {source}")]
    WriteFailed {
        /// The resource being written.
        resource: String,
        /// The underlying remote failure.
        #[source]
        source: RemoteError,
    },
}

impl CacheError {
    /// Returns the resource name the failure belongs to.
    #[must_use]
    pub fn resource(&self) -> &str {
        match self {
            CacheError::FetchFailed { resource, .. } | CacheError::WriteFailed { resource, .. } => {
                resource
            }
        }
    }

    /// Returns the remote failure behind this error.
    #[must_use]
    pub fn remote(&self) -> &RemoteError {
        match self {
            CacheError::FetchFailed { source, .. } | CacheError::WriteFailed { source, .. } => {
                source
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_only_reported_for_status_errors() {
        let rejected = RemoteError::Status {
            status: 413,
            message: "file too large".to_string(),
        };
        assert_eq!(rejected.status(), Some(413));
        assert_eq!(RemoteError::Transport("refused".to_string()).status(), None);
    }

    #[test]
    fn cache_error_display_includes_resource_and_cause() {
        let error = CacheError::WriteFailed {
            resource: "logo".to_string(),
            source: RemoteError::Status {
                status: 500,
                message: "Something went wrong".to_string(),
            },
        };
        assert_eq!(
            error.to_string(),
            "write of 'logo' failed: server returned 500: Something went wrong"
        );
        assert_eq!(error.resource(), "logo");
        assert_eq!(error.remote().status(), Some(500));
    }
}
