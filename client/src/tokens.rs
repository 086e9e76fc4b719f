//! Session token storage.
//!
//! The token pair is persisted as one JSON document under [`AUTH_STORE_KEY`]
//! so that both tokens are replaced by a single write. Older clients stored
//! only the access token under [`LEGACY_ACCESS_TOKEN_KEY`]; that copy is still
//! written and is consulted first when reading the access token.

use std::fmt::Debug;
use std::sync::Arc;

use erate_store::{KeyValueStore, MemoryStore, StoreResult};
use log::warn;
use serde::{Deserialize, Serialize};

/// Namespaced key holding the persisted auth document.
pub const AUTH_STORE_KEY: &str = "erate-auth";

/// Legacy key holding a bare copy of the access token.
pub const LEGACY_ACCESS_TOKEN_KEY: &str = "access_token";

/// Tokens issued by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    /// `None` when the issuer did not rotate the refresh token.
    pub refresh_token: Option<String>,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: Some(refresh_token.into()),
        }
    }
}

/// Whatever is currently stored. Either side may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTokens {
    #[serde(rename = "accessToken", default)]
    pub access_token: Option<String>,
    #[serde(rename = "refreshToken", default)]
    pub refresh_token: Option<String>,
}

impl StoredTokens {
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

/// Pluggable token storage used by the auth layer.
pub trait TokenStorage: Send + Sync + Debug {
    /// Current tokens. Storage failures read as "no tokens".
    fn get(&self) -> StoredTokens;

    /// Store a newly issued pair. A pair without a refresh token keeps the
    /// previously stored refresh token.
    fn set(&self, tokens: &TokenPair) -> StoreResult<()>;

    /// Forget both tokens.
    fn clear(&self) -> StoreResult<()>;

    fn access_token(&self) -> Option<String> {
        self.get().access_token
    }

    fn refresh_token(&self) -> Option<String> {
        self.get().refresh_token
    }
}

impl<S: TokenStorage + ?Sized> TokenStorage for Arc<S> {
    fn get(&self) -> StoredTokens {
        (**self).get()
    }

    fn set(&self, tokens: &TokenPair) -> StoreResult<()> {
        (**self).set(tokens)
    }

    fn clear(&self) -> StoreResult<()> {
        (**self).clear()
    }
}

/// Where an access token can be found, in lookup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenSource {
    Legacy,
    Namespaced,
}

const ACCESS_TOKEN_LOOKUP: [TokenSource; 2] = [TokenSource::Legacy, TokenSource::Namespaced];

/// Shape of the document stored under [`AUTH_STORE_KEY`].
#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedAuth {
    #[serde(default)]
    state: StoredTokens,
    #[serde(default)]
    version: u32,
}

/// [`TokenStorage`] on top of any [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct PersistedTokenStorage<S> {
    store: S,
}

impl PersistedTokenStorage<Arc<MemoryStore>> {
    /// Storage that forgets everything when dropped.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }
}

impl<S: KeyValueStore> PersistedTokenStorage<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn read_namespaced(&self) -> StoredTokens {
        match self.store.get(AUTH_STORE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<PersistedAuth>(&raw) {
                Ok(doc) => doc.state,
                Err(e) => {
                    warn!("Ignoring unreadable auth document: {e}");
                    StoredTokens::default()
                }
            },
            Ok(None) => StoredTokens::default(),
            Err(e) => {
                warn!("Failed to read auth document: {e}");
                StoredTokens::default()
            }
        }
    }

    fn read_legacy(&self) -> Option<String> {
        match self.store.get(LEGACY_ACCESS_TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!("Failed to read legacy access token: {e}");
                None
            }
        }
    }
}

impl<S: KeyValueStore> TokenStorage for PersistedTokenStorage<S> {
    fn get(&self) -> StoredTokens {
        let namespaced = self.read_namespaced();
        let access_token = ACCESS_TOKEN_LOOKUP.iter().find_map(|source| match source {
            TokenSource::Legacy => self.read_legacy(),
            TokenSource::Namespaced => namespaced.access_token.clone(),
        });

        StoredTokens {
            access_token,
            refresh_token: namespaced.refresh_token,
        }
    }

    fn set(&self, tokens: &TokenPair) -> StoreResult<()> {
        let refresh_token = match &tokens.refresh_token {
            Some(token) => Some(token.clone()),
            None => self.read_namespaced().refresh_token,
        };

        let doc = PersistedAuth {
            state: StoredTokens {
                access_token: Some(tokens.access_token.clone()),
                refresh_token,
            },
            version: 0,
        };
        // Serializing a struct of strings cannot fail.
        let raw = serde_json::to_string(&doc).unwrap_or_default();

        // The legacy key wins lookups, so it must never hold an older token
        // than the document.
        self.store
            .set(LEGACY_ACCESS_TOKEN_KEY, &tokens.access_token)?;
        self.store.set(AUTH_STORE_KEY, &raw)
    }

    fn clear(&self) -> StoreResult<()> {
        let legacy = self.store.remove(LEGACY_ACCESS_TOKEN_KEY);
        let namespaced = self.store.remove(AUTH_STORE_KEY);
        legacy.and(namespaced)
    }
}
