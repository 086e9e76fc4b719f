//! Role-scoped resource endpoints and record list extraction.

use serde_json::{Map, Value};

use crate::client::ApiClient;
use crate::error::{ApiError, ApiResult};
use crate::http::Transport;
use crate::tokens::TokenStorage;

/// Top-level resource namespaces of the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceScope {
    Consultant,
    Vendor,
    Subscriptions,
    Admin,
}

impl ResourceScope {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Consultant => "/consultant",
            Self::Vendor => "/vendor",
            Self::Subscriptions => "/subscriptions",
            Self::Admin => "/admin",
        }
    }

    /// Path of `rest` inside this scope, e.g. `Consultant.path("schools")`.
    pub fn path(self, rest: &str) -> String {
        let rest = rest.trim_start_matches('/');
        if rest.is_empty() {
            self.prefix().to_owned()
        } else {
            format!("{}/{rest}", self.prefix())
        }
    }
}

/// Keys under which list endpoints wrap their rows.
const LIST_KEYS: [&str; 5] = ["items", "results", "data", "leads", "records"];

/// A flat JSON record as returned by list endpoints.
pub type JsonRecord = Map<String, Value>;

/// Pull the row objects out of a list response.
///
/// Accepts a bare array or an object holding the array under one of
/// [`LIST_KEYS`]. Non-object entries are dropped.
pub fn extract_records(body: Value) -> Option<Vec<JsonRecord>> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            let key = LIST_KEYS
                .iter()
                .find(|key| map.get(**key).is_some_and(Value::is_array))?;
            match map.remove(*key) {
                Some(Value::Array(items)) => items,
                _ => return None,
            }
        }
        _ => return None,
    };

    Some(
        items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(record) => Some(record),
                _ => None,
            })
            .collect(),
    )
}

impl<T: Transport, S: TokenStorage> ApiClient<T, S> {
    /// GET a list endpoint and return its rows.
    pub async fn fetch_records(&self, path: &str) -> ApiResult<Vec<JsonRecord>> {
        let body: Value = self.get(path).await?;
        extract_records(body)
            .ok_or_else(|| ApiError::Decode(format!("{path} did not return a list of records")))
    }
}
