//! The authenticated API client.
//!
//! Every call returns [`ApiResult`]; transport failures, error statuses and
//! undecodable bodies all come back as [`ApiError`] values instead of panics
//! or propagated exceptions.

use std::sync::Arc;

use erate_store::{KeyValueStore, StoreResult};
use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::auth_layer::AuthLayer;
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::http::{Method, MultipartForm, ReqwestTransport, Request, Response, Transport};
use crate::tokens::{PersistedTokenStorage, TokenPair, TokenStorage};

/// Client used by the CLI and the table actions: reqwest transport, tokens in a shared store.
pub type DefaultClient = ApiClient<ReqwestTransport, PersistedTokenStorage<Arc<dyn KeyValueStore>>>;

#[derive(Debug)]
pub struct ApiClient<T, S> {
    config: ClientConfig,
    layer: AuthLayer<T, S>,
}

impl DefaultClient {
    /// Client over reqwest with tokens kept in `store`.
    pub fn with_store(config: ClientConfig, store: Arc<dyn KeyValueStore>) -> ApiResult<Self> {
        let transport = ReqwestTransport::from_config(&config)?;
        Ok(Self::new(
            config,
            transport,
            PersistedTokenStorage::new(store),
        ))
    }
}

impl<T: Transport, S: TokenStorage> ApiClient<T, S> {
    pub fn new(config: ClientConfig, transport: T, tokens: S) -> Self {
        let refresh_url = config.refresh_url();
        Self {
            config,
            layer: AuthLayer::new(transport, tokens, refresh_url),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn tokens(&self) -> &S {
        self.layer.tokens()
    }

    /// Whether any credential is stored. Says nothing about its validity.
    pub fn has_session(&self) -> bool {
        !self.tokens().get().is_empty()
    }

    /// Store a freshly issued token pair (login, register, OAuth callback).
    pub fn store_tokens(&self, tokens: &TokenPair) -> StoreResult<()> {
        self.tokens().set(tokens)
    }

    /// Forget the local session. The server is not contacted.
    pub fn logout(&self) -> StoreResult<()> {
        self.tokens().clear()
    }

    /// Send `request` through the auth layer and decode a 2xx body as `R`.
    pub async fn execute<R: DeserializeOwned>(&self, request: Request) -> ApiResult<R> {
        let method = request.method;
        let url = request.url.clone();

        let response = self.layer.send(request).await.map_err(|e| {
            warn!("{} {url} failed: {e}", method.as_str());
            ApiError::from(e)
        })?;

        debug!("{} {url} -> {}", method.as_str(), response.status);
        decode(&response)
    }

    /// JSON request to `path` (relative to the API root) with an optional body.
    pub async fn request<B, R>(&self, method: Method, path: &str, body: Option<&B>) -> ApiResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let mut request =
            Request::new(method, self.config.endpoint(path)).header("accept", "application/json");
        if let Some(body) = body {
            request = request
                .json(body)
                .map_err(|e| ApiError::Encode(e.to_string()))?;
        }
        self.execute(request).await
    }

    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> ApiResult<R> {
        self.request::<(), R>(Method::Get, path, None).await
    }

    pub async fn post<B, R>(&self, path: &str, body: &B) -> ApiResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.request(Method::Post, path, Some(body)).await
    }

    pub async fn put<B, R>(&self, path: &str, body: &B) -> ApiResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.request(Method::Put, path, Some(body)).await
    }

    pub async fn patch<B, R>(&self, path: &str, body: &B) -> ApiResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.request(Method::Patch, path, Some(body)).await
    }

    pub async fn delete<R: DeserializeOwned>(&self, path: &str) -> ApiResult<R> {
        self.request::<(), R>(Method::Delete, path, None).await
    }

    /// `multipart/form-data` POST. Same auth handling as JSON requests.
    pub async fn upload<R: DeserializeOwned>(&self, path: &str, form: MultipartForm) -> ApiResult<R> {
        let request = Request::post(self.config.endpoint(path))
            .header("accept", "application/json")
            .multipart(form);
        self.execute(request).await
    }
}

/// Map a response onto the result shape: 2xx decodes, anything else fails.
fn decode<R: DeserializeOwned>(response: &Response) -> ApiResult<R> {
    if !response.is_success() {
        return Err(ApiError::from_response(response.status, &response.body));
    }

    // Empty 2xx bodies (204) decode like a JSON null, so `()` and `Option<_>` work.
    let body: &[u8] = if response.body.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        &response.body
    };

    serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()))
}
