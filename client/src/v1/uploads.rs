//! CSV uploads (`multipart/form-data`).

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::http::{MultipartForm, Transport};
use crate::tokens::TokenStorage;

pub const CSV_MIME_TYPE: &str = "text/csv";

/// Summary returned by import endpoints.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UploadSummary {
    #[serde(default)]
    pub imported: u64,
    #[serde(default)]
    pub skipped: u64,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<T: Transport, S: TokenStorage> ApiClient<T, S> {
    /// Upload `data` as the `file` field of a multipart form.
    pub async fn upload_csv(&self, path: &str, filename: &str, data: Vec<u8>) -> ApiResult<UploadSummary> {
        let form = MultipartForm::new().file("file", filename, CSV_MIME_TYPE, data);
        self.upload(path, form).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_defaults_missing_counts() {
        let summary: UploadSummary =
            serde_json::from_str(r#"{"imported":3,"message":"ok"}"#).expect("deserialize");
        assert_eq!(summary.imported, 3);
        assert_eq!(summary.skipped, 0);
        assert!(summary.errors.is_empty());
        assert_eq!(summary.extra.get("message"), Some(&Value::from("ok")));
    }
}
