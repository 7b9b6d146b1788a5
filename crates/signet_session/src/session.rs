//! The signed-in session and its logout boundary.

use core::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use signet_cache::Resettable;

use crate::auth::{AuthState, UserRole};
use crate::store::{
    ACCESS_TOKEN_KEY, MemorySessionStore, REFRESH_TOKEN_KEY, ROLE_KEY, SessionStore, USERNAME_KEY,
};

/// Supplies the bearer token for outgoing requests.
pub trait TokenSource: Send + Sync {
    /// Returns the current access token, if signed in.
    fn bearer_token(&self) -> Option<String>;
}

/// Application session: credentials plus every cache scoped to the login.
///
/// The session is the single place that knows when a login ends. Caches that
/// hold per-login data register themselves with [`register_cache`] and are
/// reset by [`logout`], so the next administrator never sees a previous
/// administrator's values.
///
/// Caches are held weakly. Their clients usually hold the session as a
/// [`TokenSource`], and the session must not keep them alive in return.
///
/// [`register_cache`]: Session::register_cache
/// [`logout`]: Session::logout
///
/// # Example
///
/// ```
/// use signet_session::{AuthState, Session, TokenSource, UserRole};
///
/// let session = Session::in_memory();
/// session.set_auth(AuthState::signed_in("t1", "r1", UserRole::Admin));
/// assert_eq!(session.bearer_token().as_deref(), Some("t1"));
///
/// session.logout();
/// assert!(!session.is_authenticated());
/// ```
pub struct Session {
    store: Box<dyn SessionStore>,
    auth: RwLock<AuthState>,
    caches: RwLock<Vec<Weak<dyn Resettable>>>,
}

impl Session {
    /// Creates a session, restoring any credentials already in `store`.
    pub fn new(store: impl SessionStore) -> Self {
        let auth = restore(&store);
        if auth.is_authenticated() {
            tracing::info!(username = ?auth.username, role = ?auth.role, "session restored");
        }
        Self {
            store: Box::new(store),
            auth: RwLock::new(auth),
            caches: RwLock::new(Vec::new()),
        }
    }

    /// Creates a signed-out session backed by a [`MemorySessionStore`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemorySessionStore::new())
    }

    /// Returns the current credentials.
    #[must_use]
    pub fn auth(&self) -> AuthState {
        self.auth.read().clone()
    }

    /// Replaces the current credentials.
    ///
    /// Only fields that are present are persisted; absent fields keep whatever
    /// the store already holds until the next [`logout`](Self::logout).
    pub fn set_auth(&self, auth: AuthState) {
        if let Some(token) = &auth.access_token {
            self.store.set(ACCESS_TOKEN_KEY, token);
        }
        if let Some(token) = &auth.refresh_token {
            self.store.set(REFRESH_TOKEN_KEY, token);
        }
        if let Some(role) = auth.role {
            self.store.set(ROLE_KEY, role.as_str());
        }
        if let Some(username) = &auth.username {
            self.store.set(USERNAME_KEY, username);
        }

        tracing::info!(username = ?auth.username, role = ?auth.role, "signed in");
        *self.auth.write() = auth;
    }

    /// Returns `true` if an access token is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.auth.read().is_authenticated()
    }

    /// Returns the role of the signed-in administrator.
    #[must_use]
    pub fn role(&self) -> Option<UserRole> {
        self.auth.read().role
    }

    /// Ties `cache` to this login; it is reset on [`logout`](Self::logout)
    /// for as long as it is alive.
    pub fn register_cache(&self, cache: Weak<dyn Resettable>) {
        let mut caches = self.caches.write();
        caches.retain(|cache| cache.strong_count() > 0);
        caches.push(cache);
    }

    /// Returns the number of registered caches still alive.
    #[must_use]
    pub fn cache_count(&self) -> usize {
        self.caches
            .read()
            .iter()
            .filter(|cache| cache.strong_count() > 0)
            .count()
    }

    /// Ends the login: clears the store and credentials, then resets every
    /// registered cache.
    pub fn logout(&self) {
        self.store.clear();
        *self.auth.write() = AuthState::default();

        let caches: Vec<Arc<dyn Resettable>> = {
            let mut registered = self.caches.write();
            registered.retain(|cache| cache.strong_count() > 0);
            registered.iter().filter_map(Weak::upgrade).collect()
        };
        for cache in &caches {
            cache.reset();
        }
        tracing::info!(caches = caches.len(), "signed out");
    }
}

impl TokenSource for Session {
    fn bearer_token(&self) -> Option<String> {
        self.auth.read().access_token.clone()
    }
}

impl<T: TokenSource + ?Sized> TokenSource for Arc<T> {
    fn bearer_token(&self) -> Option<String> {
        (**self).bearer_token()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let auth = self.auth.read();
        f.debug_struct("Session")
            .field("authenticated", &auth.is_authenticated())
            .field("username", &auth.username)
            .field("role", &auth.role)
            .field("caches", &self.cache_count())
            .finish_non_exhaustive()
    }
}

fn restore(store: &dyn SessionStore) -> AuthState {
    let role = store.get(ROLE_KEY).and_then(|raw| match raw.parse::<UserRole>() {
        Ok(role) => Some(role),
        Err(error) => {
            tracing::warn!(error = %error, "ignoring stored role");
            None
        }
    });

    AuthState {
        access_token: store.get(ACCESS_TOKEN_KEY),
        refresh_token: store.get(REFRESH_TOKEN_KEY),
        role,
        username: store.get(USERNAME_KEY),
    }
}
