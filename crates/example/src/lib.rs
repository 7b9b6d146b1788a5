//! Example admin shell built with signet.
//!
//! The company logo appears in three regions of the shell at once: the
//! sidebar, the dashboard header and the settings page that uploads it. All
//! three read one [`SingletonResourceCache`](signet_cache::SingletonResourceCache),
//! so opening the shell costs one request, and an upload from settings shows
//! up everywhere without a refetch.
//!
//! # Architecture
//!
//! ```text
//!  ┌─────────┐  ┌───────────┐  ┌──────────┐
//!  │ sidebar │  │ dashboard │  │ settings │──── upload ───┐
//!  └────▲────┘  └─────▲─────┘  └────▲─────┘               │
//!       │ revision    │             │                     ▼
//!  ┌────┴─────────────┴─────────────┴──────────────────────────┐
//!  │ SingletonResourceCache<HttpResourceClient<Logo>>          │
//!  └────────────────────────────┬──────────────────────────────┘
//!                               │ GET /logo, POST /logo/upload
//!                               ▼
//!                            backend
//! ```

mod error;
mod shell;

pub use error::ShellError;
pub use shell::{AdminShell, REGIONS, SETTINGS};

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use signet_cache::{CacheConfig, CacheError, RemoteError, RemoteResourceClient};
    use signet_session::{AuthState, Session, UserRole};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Backend {
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl RemoteResourceClient for Backend {
        type Value = String;
        type Payload = String;

        async fn fetch(&self, _resource: &str) -> Result<String, RemoteError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok("a.png".to_string())
        }

        async fn write(&self, _resource: &str, payload: String) -> Result<String, RemoteError> {
            if payload.ends_with(".png") {
                Ok(payload)
            } else {
                Err(RemoteError::InvalidPayload(payload))
            }
        }
    }

    fn shell() -> AdminShell<Backend> {
        let session = Arc::new(Session::in_memory());
        session.set_auth(AuthState::signed_in("t1", "r1", UserRole::SuperAdmin));
        AdminShell::new(Backend::default(), CacheConfig::default(), session).unwrap()
    }

    fn shown(shell: &AdminShell<Backend>) -> Vec<Option<String>> {
        shell
            .regions()
            .iter()
            .map(|region| region.current().map(|logo| logo.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn opening_the_shell_fetches_once() {
        let shell = shell();

        let logo = shell.load().await.unwrap();

        assert_eq!(*logo, "a.png");
        assert_eq!(shell.cache().client().fetches.load(Ordering::SeqCst), 1);
        assert_eq!(shown(&shell), vec![Some("a.png".to_string()); 3]);
    }

    #[tokio::test]
    async fn upload_reaches_every_region() {
        let shell = shell();
        shell.load().await.unwrap();

        shell.upload("b.png".to_string()).await.unwrap();

        assert_eq!(shown(&shell), vec![Some("b.png".to_string()); 3]);
        assert_eq!(shell.cache().client().fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rejected_upload_keeps_the_old_logo() {
        let shell = shell();
        shell.load().await.unwrap();

        let error = shell.upload("b.pdf".to_string()).await.unwrap_err();

        assert!(matches!(error, CacheError::WriteFailed { .. }));
        assert_eq!(shown(&shell), vec![Some("a.png".to_string()); 3]);
    }

    #[tokio::test]
    async fn logout_unmounts_and_clears() {
        let shell = shell();
        shell.load().await.unwrap();

        shell.logout();

        assert!(!shell.session().is_authenticated());
        assert!(shell.cache().peek(signet_remote::LOGO).is_none());
        assert!(shell.regions().iter().all(|region| !region.is_mounted()));
        assert_eq!(shell.cache().broadcaster().subscriber_count(signet_remote::LOGO), 0);
    }

    #[test]
    fn dropping_the_shell_frees_the_session() {
        let session = Arc::new(Session::in_memory());
        session.set_auth(AuthState::signed_in("t1", "r1", UserRole::Admin));
        let shell =
            AdminShell::connect(signet_remote::HttpClientConfig::default(), Arc::clone(&session))
                .unwrap();
        assert_eq!(session.cache_count(), 1);

        let weak = Arc::downgrade(&session);
        drop(session);
        drop(shell);

        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn settings_is_a_mounted_region() {
        let shell = shell();
        assert_eq!(shell.region(SETTINGS).map(|r| r.region()), Some(SETTINGS));
        assert!(shell.region("footer").is_none());
    }
}
