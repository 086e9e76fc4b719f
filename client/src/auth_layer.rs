//! Bearer-token middleware with refresh-and-retry on 401.
//!
//! [`AuthLayer`] wraps a bare [`Transport`] and is itself a [`Transport`]:
//!
//! 1. attach `Authorization: Bearer <access>` when an access token is stored
//! 2. send; anything other than 401 is returned untouched
//! 3. on 401 with a stored refresh token, `POST /auth/refresh` exactly once
//! 4. refresh ok: store the new pair, replay the original request once
//! 5. refresh failed: clear the stored tokens and return the original 401
//!
//! The refresh call and the replay are awaited one after the other. Nothing
//! coordinates refreshes between processes sharing the same store; the last
//! write wins.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::http::{HttpResult, Request, Response, Transport};
use crate::tokens::{TokenPair, TokenStorage};

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug)]
pub struct AuthLayer<T, S> {
    inner: T,
    tokens: S,
    refresh_url: String,
}

impl<T: Transport, S: TokenStorage> AuthLayer<T, S> {
    pub fn new(inner: T, tokens: S, refresh_url: impl Into<String>) -> Self {
        Self {
            inner,
            tokens,
            refresh_url: refresh_url.into(),
        }
    }

    pub fn tokens(&self) -> &S {
        &self.tokens
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Exchange `refresh_token` for a new pair.
    ///
    /// Returns the new access token, or `None` when the refresh failed for any
    /// reason.
    async fn refresh(&self, refresh_token: &str) -> Option<String> {
        let request = match Request::post(&self.refresh_url).json(&RefreshRequest { refresh_token }) {
            Ok(request) => request,
            Err(e) => {
                warn!("Failed to encode refresh request: {e}");
                return None;
            }
        };

        let response = match self.inner.send(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Token refresh failed: {e}");
                return None;
            }
        };

        if !response.is_success() {
            warn!("Token refresh rejected with status {}", response.status);
            return None;
        }

        let issued: RefreshResponse = match response.json() {
            Ok(issued) => issued,
            Err(e) => {
                warn!("Token refresh returned an unreadable body: {e}");
                return None;
            }
        };

        let pair = TokenPair {
            access_token: issued.access_token,
            refresh_token: issued.refresh_token,
        };
        if let Err(e) = self.tokens.set(&pair) {
            // The new token still works for this call even if it was not persisted.
            warn!("Failed to persist refreshed tokens: {e}");
        }

        Some(pair.access_token)
    }

    fn clear_tokens(&self) {
        if let Err(e) = self.tokens.clear() {
            warn!("Failed to clear stored tokens: {e}");
        }
    }
}

impl<T: Transport, S: TokenStorage> Transport for AuthLayer<T, S> {
    async fn send(&self, request: Request) -> HttpResult<Response> {
        let stored = self.tokens.get();
        debug!(
            "{} {} (authenticated: {})",
            request.method.as_str(),
            request.url,
            stored.access_token.is_some()
        );

        let first = self
            .inner
            .send(request.clone().with_bearer(stored.access_token.as_deref()))
            .await?;

        if !first.is_unauthorized() {
            return Ok(first);
        }

        let Some(refresh_token) = stored.refresh_token else {
            return Ok(first);
        };

        match self.refresh(&refresh_token).await {
            Some(access_token) => {
                info!("Access token refreshed, retrying {}", request.url);
                self.inner
                    .send(request.with_bearer(Some(&access_token)))
                    .await
            }
            None => {
                info!("Session could not be refreshed, signing out");
                self.clear_tokens();
                Ok(first)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;
    use crate::http::HttpError;
    use crate::tokens::PersistedTokenStorage;

    /// Transport that replays scripted outcomes and records what it was sent.
    #[derive(Debug, Default)]
    struct ScriptedTransport {
        outcomes: Mutex<VecDeque<HttpResult<Response>>>,
        sent: Mutex<Vec<Request>>,
    }

    impl ScriptedTransport {
        fn new(outcomes: impl IntoIterator<Item = HttpResult<Response>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into_iter().collect()),
                sent: Mutex::default(),
            }
        }

        fn sent(&self) -> Vec<Request> {
            self.sent.lock().expect("lock").clone()
        }
    }

    impl Transport for ScriptedTransport {
        async fn send(&self, request: Request) -> HttpResult<Response> {
            self.sent.lock().expect("lock").push(request);
            self.outcomes
                .lock()
                .expect("lock")
                .pop_front()
                .unwrap_or_else(|| Err(HttpError::new("no scripted response left")))
        }
    }

    fn ok(status: u16, body: &str) -> HttpResult<Response> {
        Ok(Response::new(status, body.as_bytes().to_vec()))
    }

    fn layer(
        outcomes: impl IntoIterator<Item = HttpResult<Response>>,
    ) -> AuthLayer<ScriptedTransport, PersistedTokenStorage<std::sync::Arc<erate_store::MemoryStore>>>
    {
        AuthLayer::new(
            ScriptedTransport::new(outcomes),
            PersistedTokenStorage::in_memory(),
            "http://h/api/v1/auth/refresh",
        )
    }

    #[tokio::test]
    async fn test_attaches_bearer_when_present() {
        let layer = layer([ok(200, "{}")]);
        layer.tokens().set(&TokenPair::new("A", "R")).expect("set");

        let response = layer.send(Request::get("http://h/x")).await.expect("send");
        assert_eq!(response.status, 200);

        let sent = layer.inner().sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].header_value("authorization"), Some("Bearer A"));
    }

    #[tokio::test]
    async fn test_no_token_still_sends_without_header() {
        let layer = layer([ok(200, "{}")]);

        layer.send(Request::get("http://h/public")).await.expect("send");
        assert_eq!(layer.inner().sent()[0].header_value("authorization"), None);
    }

    #[tokio::test]
    async fn test_401_refreshes_once_and_retries_once() {
        let layer = layer([
            ok(401, r#"{"detail":"expired"}"#),
            ok(200, r#"{"access_token":"A2","refresh_token":"R2"}"#),
            ok(200, r#"{"id":1}"#),
        ]);
        layer.tokens().set(&TokenPair::new("A", "R")).expect("set");

        let response = layer.send(Request::get("http://h/resource")).await.expect("send");
        assert_eq!(response.status, 200);
        assert_eq!(response.body, br#"{"id":1}"#.to_vec());

        let sent = layer.inner().sent();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[1].url, "http://h/api/v1/auth/refresh");
        assert_eq!(sent[1].body, crate::http::Body::Bytes(br#"{"refresh_token":"R"}"#.to_vec()));
        assert_eq!(sent[2].header_value("authorization"), Some("Bearer A2"));

        assert_eq!(layer.tokens().access_token().as_deref(), Some("A2"));
        assert_eq!(layer.tokens().refresh_token().as_deref(), Some("R2"));
    }

    #[tokio::test]
    async fn test_failed_refresh_clears_tokens_and_returns_original_401() {
        let layer = layer([
            ok(401, r#"{"detail":"expired"}"#),
            ok(401, r#"{"detail":"refresh token revoked"}"#),
        ]);
        layer.tokens().set(&TokenPair::new("A", "R")).expect("set");

        let response = layer.send(Request::get("http://h/resource")).await.expect("send");
        assert_eq!(response.status, 401);
        assert_eq!(response.body, br#"{"detail":"expired"}"#.to_vec());

        assert_eq!(layer.inner().sent().len(), 2);
        assert!(layer.tokens().get().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_network_error_clears_tokens() {
        let layer = layer([ok(401, "{}"), Err(HttpError::new("connection reset"))]);
        layer.tokens().set(&TokenPair::new("A", "R")).expect("set");

        let response = layer.send(Request::get("http://h/resource")).await.expect("send");
        assert_eq!(response.status, 401);
        assert!(layer.tokens().get().is_empty());
    }

    #[tokio::test]
    async fn test_401_without_refresh_token_is_returned_as_is() {
        let layer = layer([ok(401, "{}")]);

        let response = layer.send(Request::get("http://h/resource")).await.expect("send");
        assert_eq!(response.status, 401);
        assert_eq!(layer.inner().sent().len(), 1);
    }

    #[tokio::test]
    async fn test_retry_401_is_not_refreshed_again() {
        let layer = layer([
            ok(401, "{}"),
            ok(200, r#"{"access_token":"A2"}"#),
            ok(401, r#"{"detail":"still no"}"#),
        ]);
        layer.tokens().set(&TokenPair::new("A", "R")).expect("set");

        let response = layer.send(Request::get("http://h/resource")).await.expect("send");
        assert_eq!(response.status, 401);
        assert_eq!(layer.inner().sent().len(), 3);
        // Refresh response omitted a new refresh token, so the old one stays.
        assert_eq!(layer.tokens().refresh_token().as_deref(), Some("R"));
    }

    #[tokio::test]
    async fn test_non_401_failures_are_not_retried() {
        let layer = layer([ok(500, r#"{"message":"boom"}"#)]);
        layer.tokens().set(&TokenPair::new("A", "R")).expect("set");

        let response = layer.send(Request::get("http://h/resource")).await.expect("send");
        assert_eq!(response.status, 500);
        assert_eq!(layer.inner().sent().len(), 1);
        assert_eq!(layer.tokens().access_token().as_deref(), Some("A"));
    }

    #[tokio::test]
    async fn test_network_error_on_first_call_propagates() {
        let layer = layer([Err(HttpError::new("dns"))]);
        layer.tokens().set(&TokenPair::new("A", "R")).expect("set");

        let err = layer
            .send(Request::get("http://h/resource"))
            .await
            .expect_err("network failure should surface");
        assert_eq!(err.message, "dns");
        assert_eq!(layer.tokens().access_token().as_deref(), Some("A"));
    }
}
