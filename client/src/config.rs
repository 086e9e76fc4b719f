use std::time::Duration;

use ustr::Ustr;

/// API version prefix shared by every endpoint.
pub const API_PREFIX: &str = "/api/v1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    /// Whole-request timeout. `None` waits as long as the connection does.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: base_url.into().trim_end_matches('/').to_owned(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Root of the versioned API, e.g. `https://host/api/v1`.
    pub fn api_url(&self) -> Ustr {
        Ustr::from(&format!("{}{API_PREFIX}", self.api_base_url))
    }

    /// Absolute URL for an endpoint path.
    ///
    /// Paths already carrying the `/api/` prefix are joined to the base URL as
    /// they are; anything else is taken relative to [`Self::api_url`].
    pub fn endpoint(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_owned();
        }

        let path = if path.starts_with('/') {
            path.to_owned()
        } else {
            format!("/{path}")
        };

        if path.starts_with("/api/") {
            format!("{}{path}", self.api_base_url)
        } else {
            format!("{}{path}", self.api_url())
        }
    }

    pub fn refresh_url(&self) -> String {
        self.endpoint("/auth/refresh")
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        let base = if cfg!(feature = "env_local") {
            "http://localhost:8000"
        } else if cfg!(feature = "env_staging") {
            "https://staging-api.erateintel.com"
        } else {
            "https://api.erateintel.com"
        };
        Self::new(base)
    }
}
