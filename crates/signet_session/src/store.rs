//! Key/value persistence for session data.

use hashbrown::HashMap;
use parking_lot::RwLock;

/// Storage key of the access token.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";
/// Storage key of the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
/// Storage key of the role.
pub const ROLE_KEY: &str = "role";
/// Storage key of the username.
pub const USERNAME_KEY: &str = "username";

/// Flat string store that outlives a single page or process, such as browser
/// local storage or a file in the user's profile.
///
/// `clear` removes every key, including ones the session did not write.
pub trait SessionStore: Send + Sync + 'static {
    /// Returns the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str);

    /// Removes every key.
    fn clear(&self);
}

/// In-memory [`SessionStore`].
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.write().insert(key.to_owned(), value.to_owned());
    }

    fn clear(&self) {
        self.entries.write().clear();
    }
}
