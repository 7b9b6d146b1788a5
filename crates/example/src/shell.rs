//! The admin shell: one logo cache shown in several regions.

use std::sync::Arc;

use futures::future::join_all;
use signet_cache::{
    CacheConfig, CacheError, RemoteResourceClient, ResourceBinding, SingletonResourceCache,
};
use signet_remote::{HttpClientConfig, HttpResourceClient, LOGO, Logo};
use signet_session::Session;

use crate::error::ShellError;

/// Regions that show the logo, in mount order.
pub const REGIONS: [&str; 3] = ["sidebar", "dashboard", "settings"];

/// Region that owns the upload form.
pub const SETTINGS: &str = "settings";

/// The admin shell.
///
/// Owns the logo cache for one login, registers it with the session so it is
/// cleared at logout, and mounts one [`ResourceBinding`] per region.
pub struct AdminShell<C: RemoteResourceClient> {
    session: Arc<Session>,
    cache: SingletonResourceCache<C>,
    regions: Vec<ResourceBinding<C>>,
}

impl AdminShell<HttpResourceClient<Logo>> {
    /// Builds a shell talking to the backend in `config`, authenticated by
    /// `session`.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::Remote`] if the HTTP client cannot be built.
    pub fn connect(config: HttpClientConfig, session: Arc<Session>) -> Result<Self, ShellError> {
        let client = HttpResourceClient::new(config)?.with_token_source(session.clone());
        Self::new(client, CacheConfig::default(), session)
    }
}

impl<C: RemoteResourceClient> AdminShell<C> {
    /// Builds a shell over `client` and mounts every region.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::Mount`] if a region is mounted twice.
    pub fn new(client: C, config: CacheConfig, session: Arc<Session>) -> Result<Self, ShellError> {
        let cache = SingletonResourceCache::init(client, config);
        session.register_cache(cache.downgrade());

        let regions = REGIONS
            .iter()
            .map(|region| ResourceBinding::mount(&cache, LOGO, region))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            session,
            cache,
            regions,
        })
    }

    /// Loads the logo into every region at once. The regions share one fetch.
    ///
    /// # Errors
    ///
    /// Returns the fetch failure; regions keep their previous value.
    pub async fn load(&self) -> Result<Arc<C::Value>, CacheError> {
        let loaded = join_all(self.regions.iter().map(ResourceBinding::load)).await;
        match loaded.into_iter().collect::<Result<Vec<_>, _>>()?.pop() {
            Some(logo) => Ok(logo),
            None => self.cache.get(LOGO).await,
        }
    }

    /// Uploads a new logo from the settings region.
    ///
    /// Every region shows the stored logo once this returns `Ok`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::WriteFailed`]; every region keeps the old logo.
    pub async fn upload(&self, payload: C::Payload) -> Result<Arc<C::Value>, CacheError> {
        tracing::info!(region = SETTINGS, "uploading logo");
        self.cache.set(LOGO, payload).await
    }

    /// Returns the binding of `name`.
    #[must_use]
    pub fn region(&self, name: &str) -> Option<&ResourceBinding<C>> {
        self.regions.iter().find(|binding| binding.region() == name)
    }

    /// Returns every mounted region.
    #[must_use]
    pub fn regions(&self) -> &[ResourceBinding<C>] {
        &self.regions
    }

    /// Returns the logo cache.
    #[must_use]
    pub fn cache(&self) -> &SingletonResourceCache<C> {
        &self.cache
    }

    /// Returns the session.
    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Ends the login: unmounts every region, then logs the session out, which
    /// resets the cache.
    pub fn logout(&self) {
        for region in &self.regions {
            region.unmount();
        }
        self.session.logout();
    }
}
