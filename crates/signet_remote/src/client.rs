//! `reqwest`-based [`RemoteResourceClient`].

use core::fmt;
use core::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use signet_cache::{RemoteError, RemoteResourceClient};
use signet_session::TokenSource;

use crate::config::{HttpClientConfig, ResourceRoute};
use crate::upload::Upload;

/// Message reported when an error response carries none.
pub const FALLBACK_ERROR_MESSAGE: &str = "Something went wrong";

/// Multipart field holding the uploaded file.
const FILE_FIELD: &str = "file";

/// HTTP client for resources served as JSON and replaced by multipart upload.
///
/// Requests carry `Authorization: Bearer <token>` whenever the configured
/// [`TokenSource`] has a token. Error responses are reduced to their JSON
/// `message` field.
pub struct HttpResourceClient<V> {
    http: reqwest::Client,
    config: HttpClientConfig,
    tokens: Option<Arc<dyn TokenSource>>,
    _value: PhantomData<fn() -> V>,
}

impl<V> HttpResourceClient<V> {
    /// Creates a client for the backend described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Transport`] if the underlying HTTP client cannot
    /// be built (e.g. no TLS backend is available).
    pub fn new(config: HttpClientConfig) -> Result<Self, RemoteError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| RemoteError::Transport(format!("failed to build http client: {err}")))?;

        Ok(Self {
            http,
            config,
            tokens: None,
            _value: PhantomData,
        })
    }

    /// Authenticates requests with tokens from `tokens`.
    #[must_use]
    pub fn with_token_source(mut self, tokens: Arc<dyn TokenSource>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Returns the client configuration.
    #[must_use]
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    fn route(&self, resource: &str) -> Result<&ResourceRoute, RemoteError> {
        self.config
            .route(resource)
            .ok_or_else(|| RemoteError::UnknownRoute(resource.to_owned()))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.tokens.as_ref().and_then(|tokens| tokens.bearer_token()) {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn transport(&self, err: &reqwest::Error) -> RemoteError {
        match self.config.timeout {
            Some(limit) if err.is_timeout() => RemoteError::Timeout(limit),
            _ => RemoteError::Transport(err.to_string()),
        }
    }
}

#[async_trait]
impl<V> RemoteResourceClient for HttpResourceClient<V>
where
    V: DeserializeOwned + Send + Sync + 'static,
{
    type Value = V;
    type Payload = Upload;

    async fn fetch(&self, resource: &str) -> Result<V, RemoteError> {
        let url = self.config.url(&self.route(resource)?.read);
        tracing::debug!(resource, url = %url, "GET");

        let response = self
            .authorize(self.http.get(&url))
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await
            .map_err(|err| self.transport(&err))?;

        self.decode(response).await
    }

    async fn write(&self, resource: &str, payload: Upload) -> Result<V, RemoteError> {
        let route = self.route(resource)?;
        if !payload.matches(&route.accept) {
            return Err(RemoteError::InvalidPayload(format!(
                "'{}' is {}, expected {}",
                payload.file_name, payload.content_type, route.accept
            )));
        }
        if let Some(max) = route.max_bytes
            && payload.len() as u64 > max
        {
            return Err(RemoteError::InvalidPayload(format!(
                "'{}' is {} bytes, limit is {max}",
                payload.file_name,
                payload.len()
            )));
        }

        let url = self.config.url(&route.write);
        tracing::debug!(resource, url = %url, file = %payload.file_name, bytes = payload.len(), "POST");

        let part = Part::bytes(payload.bytes)
            .file_name(payload.file_name)
            .mime_str(&payload.content_type)
            .map_err(|err| RemoteError::InvalidPayload(err.to_string()))?;
        let form = Form::new().part(FILE_FIELD, part);

        let response = self
            .authorize(self.http.post(&url))
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .multipart(form)
            .send()
            .await
            .map_err(|err| self.transport(&err))?;

        self.decode(response).await
    }
}

impl<V: DeserializeOwned> HttpResourceClient<V> {
    async fn decode(&self, response: reqwest::Response) -> Result<V, RemoteError> {
        let status = response.status();
        let body = response.text().await.map_err(|err| self.transport(&err))?;

        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        serde_json::from_str(&body)
            .map_err(|err| RemoteError::InvalidResponse(format!("failed to parse response: {err}")))
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Extracts the `message` of an error body, or [`FALLBACK_ERROR_MESSAGE`].
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string())
}

impl<V> fmt::Debug for HttpResourceClient<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResourceClient")
            .field("base_url", &self.config.base_url)
            .field("timeout", &self.config.timeout)
            .field("authenticated", &self.tokens.is_some())
            .finish()
    }
}
