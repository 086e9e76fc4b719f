//! Authenticated client for the E-Rate intelligence REST API.
//!
//! Layers, from the wire up:
//!
//! - [`http`]: a bare [`Transport`] plus plain request/response data
//! - [`auth_layer`]: bearer attachment and the single refresh-and-retry on 401
//! - [`ApiClient`]: URL building, JSON encoding, and the uniform [`ApiResult`]
//! - [`v1`]: typed endpoint helpers (auth, entity lookups, push, uploads)
//!
//! Tokens live behind [`TokenStorage`]; [`PersistedTokenStorage`] keeps them in
//! any [`erate_store::KeyValueStore`].

pub mod auth_layer;
mod client;
mod config;
mod error;
pub mod http;
mod tokens;
pub mod v1;

pub use auth_layer::AuthLayer;
pub use client::{ApiClient, DefaultClient};
pub use config::{API_PREFIX, ClientConfig};
pub use error::{ApiError, ApiResult, NETWORK_ERROR_MESSAGE};
pub use http::{HttpError, Method, MultipartForm, ReqwestTransport, Request, Response, Transport};
pub use tokens::{
    AUTH_STORE_KEY, LEGACY_ACCESS_TOKEN_KEY, PersistedTokenStorage, StoredTokens, TokenPair,
    TokenStorage,
};
