//! `/api/v1/auth/*` endpoints.
//!
//! Login, register and Google sign-in all answer with a token pair plus the
//! user; the pair is stored before the response is handed back.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::http::Transport;
use crate::tokens::{TokenPair, TokenStorage};

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    /// `consultant`, `vendor` or `applicant`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GoogleAuthRequest {
    /// ID token handed back by Google Identity Services.
    pub credential: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// User object returned alongside tokens and from `/auth/me`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<Value>,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    /// Fields this client does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

impl AuthResponse {
    pub fn token_pair(&self) -> TokenPair {
        TokenPair {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }
}

impl<T: Transport, S: TokenStorage> ApiClient<T, S> {
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<AuthResponse> {
        let request = LoginRequest {
            email: email.trim().to_owned(),
            password: password.to_owned(),
        };
        self.authenticate("/auth/login", &request).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<AuthResponse> {
        self.authenticate("/auth/register", request).await
    }

    /// Exchange a Google ID token for a session (OAuth callback).
    pub async fn login_with_google(&self, request: &GoogleAuthRequest) -> ApiResult<AuthResponse> {
        self.authenticate("/auth/google", request).await
    }

    /// The signed-in user.
    pub async fn me(&self) -> ApiResult<UserProfile> {
        self.get("/auth/me").await
    }

    async fn authenticate<B: Serialize>(&self, path: &str, body: &B) -> ApiResult<AuthResponse> {
        let response: AuthResponse = self.post(path, body).await?;
        self.store_tokens(&response.token_pair())?;
        if let Some(user) = &response.user {
            log::info!("Signed in as {}", user.email);
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_skips_missing_fields() {
        let request = RegisterRequest {
            email: "a@b.c".to_owned(),
            password: "pw".to_owned(),
            role: Some("consultant".to_owned()),
            ..Default::default()
        };
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"email": "a@b.c", "password": "pw", "role": "consultant"})
        );
    }

    #[test]
    fn test_auth_response_keeps_unknown_user_fields() {
        let json = r#"{
            "access_token": "A",
            "refresh_token": "R",
            "user": {"id": 7, "email": "a@b.c", "subscription_status": "active"}
        }"#;
        let response: AuthResponse = serde_json::from_str(json).expect("deserialize");
        let user = response.user.as_ref().expect("user");
        assert_eq!(user.email, "a@b.c");
        assert_eq!(user.extra.get("subscription_status"), Some(&serde_json::json!("active")));
        assert_eq!(response.token_pair(), TokenPair::new("A", "R"));
    }

    #[test]
    fn test_auth_response_without_refresh_token() {
        let response: AuthResponse =
            serde_json::from_str(r#"{"access_token":"A"}"#).expect("deserialize");
        assert!(response.refresh_token.is_none());
        assert!(response.user.is_none());
    }
}
