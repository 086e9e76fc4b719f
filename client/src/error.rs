use erate_store::StoreError;
use serde_json::Value;
use thiserror::Error;

use crate::http::HttpError;

pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection and try again.";

/// Failure outcome of an API call.
///
/// The `Display` output is the plain message shown to the user. Only
/// [`ApiError::Status`] carries something the server said.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("Network error. Please check your connection and try again.")]
    Network { detail: String },

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// A 2xx response whose body did not match the expected shape.
    #[error("Unexpected response from server: {0}")]
    Decode(String),

    /// The request body could not be serialized.
    #[error("Failed to encode request: {0}")]
    Encode(String),

    /// The session could not be written to or removed from local storage.
    #[error("Failed to save session: {0}")]
    Storage(String),
}

impl ApiError {
    /// Build a status error from a response body, preferring the server's message.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let message = extract_message(body)
            .unwrap_or_else(|| format!("Request failed with status {status}"));
        Self::Status { status, message }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}

impl From<HttpError> for ApiError {
    fn from(err: HttpError) -> Self {
        Self::Network {
            detail: err.message,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::Storage(err.to_string())
    }
}

/// Result of an API call.
pub type ApiResult<T> = Result<T, ApiError>;

/// Pull a human readable message out of an error body.
///
/// Looks at `message`, then `detail`, then `error`. A `detail` list (as sent
/// by request validators) contributes its first entry's `msg`.
fn extract_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    ["message", "detail", "error"]
        .iter()
        .find_map(|field| match value.get(field)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Array(items) => items
                .first()
                .and_then(|item| item.get("msg"))
                .and_then(Value::as_str)
                .map(str::to_owned),
            _ => None,
        })
}
