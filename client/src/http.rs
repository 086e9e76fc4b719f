//! Bare HTTP transport.
//!
//! Requests and responses here are plain, clonable data. That matters for the
//! auth layer: a request that came back 401 is replayed once after a token
//! refresh, so the body (including multipart uploads) must be replayable.
//! `reqwest::multipart::Form` is consumed on send, so uploads are described by
//! [`MultipartForm`] and only turned into a reqwest form inside the transport.

use std::collections::HashMap;
use std::future::Future;

use thiserror::Error;

use crate::config::ClientConfig;

pub const AUTHORIZATION: &str = "authorization";
pub const CONTENT_TYPE: &str = "content-type";

/// HTTP method for requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// One field of a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    pub data: Vec<u8>,
    pub filename: Option<String>,
    pub mime_type: Option<String>,
}

/// A replayable `multipart/form-data` body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    parts: Vec<FormPart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plain text field.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            data: value.into().into_bytes(),
            filename: None,
            mime_type: None,
        });
        self
    }

    /// Add a file field.
    pub fn file(
        mut self,
        name: impl Into<String>,
        filename: impl Into<String>,
        mime_type: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            data: data.into(),
            filename: Some(filename.into()),
            mime_type: Some(mime_type.into()),
        });
        self
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }
}

/// Request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Body {
    #[default]
    Empty,
    Bytes(Vec<u8>),
    Multipart(MultipartForm),
}

/// A fully described HTTP request.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: String,
    /// Header names are stored lowercased.
    pub headers: HashMap<String, String>,
    pub body: Body,
}

impl Request {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: Body::Empty,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    /// Add a header to the request.
    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_lowercase(), value.into());
        self
    }

    /// Set the request body as JSON and mark it `application/json`.
    pub fn json<T: serde::Serialize + ?Sized>(mut self, value: &T) -> Result<Self, serde_json::Error> {
        self.body = Body::Bytes(serde_json::to_vec(value)?);
        self.headers
            .insert(CONTENT_TYPE.to_owned(), "application/json".to_owned());
        Ok(self)
    }

    /// Set a multipart body.
    ///
    /// Any JSON content type is dropped; the transport sets the multipart
    /// boundary header itself.
    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.headers.remove(CONTENT_TYPE);
        self.body = Body::Multipart(form);
        self
    }

    /// Replace (or remove, when `token` is `None`) the bearer credential.
    pub fn with_bearer(mut self, token: Option<&str>) -> Self {
        match token {
            Some(token) => {
                self.headers
                    .insert(AUTHORIZATION.to_owned(), format!("Bearer {token}"));
            }
            None => {
                self.headers.remove(AUTHORIZATION);
            }
        }
        self
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }
}

/// A simplified HTTP response that contains only owned data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// Response headers (lowercased keys)
    pub headers: HashMap<String, String>,
    /// Response body as bytes
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// Returns true if the status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Get a header value by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(|s| s.as_str())
    }

    /// Attempt to deserialize the body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// The request never produced a response (DNS, connect, reset, timeout, bad request parts).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("HTTP error: {message}")]
pub struct HttpError {
    pub message: String,
}

impl HttpError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result type for HTTP operations.
pub type HttpResult<T> = Result<T, HttpError>;

/// Something that can execute a [`Request`].
///
/// The production implementation is [`ReqwestTransport`]; tests substitute
/// scripted transports.
pub trait Transport: Send + Sync {
    fn send(&self, request: Request) -> impl Future<Output = HttpResult<Response>> + Send;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn send(&self, request: Request) -> impl Future<Output = HttpResult<Response>> + Send {
        (**self).send(request)
    }
}

/// Transport backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Transport honouring the timeout in `config`.
    pub fn from_config(config: &ClientConfig) -> HttpResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| HttpError::new(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::new(client))
    }

    fn build_form(form: MultipartForm) -> HttpResult<reqwest::multipart::Form> {
        let mut out = reqwest::multipart::Form::new();
        for part in form.parts {
            let mut field = reqwest::multipart::Part::bytes(part.data);
            if let Some(filename) = part.filename {
                field = field.file_name(filename);
            }
            if let Some(mime) = part.mime_type {
                field = field
                    .mime_str(&mime)
                    .map_err(|e| HttpError::new(format!("invalid mime type {mime}: {e}")))?;
            }
            out = out.part(part.name, field);
        }
        Ok(out)
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: Request) -> HttpResult<Response> {
        let Request {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = match method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Patch => self.client.patch(&url),
            Method::Delete => self.client.delete(&url),
        };

        for (name, value) in &headers {
            builder = builder.header(name, value);
        }

        builder = match body {
            Body::Empty => builder,
            Body::Bytes(bytes) => builder.body(bytes),
            Body::Multipart(form) => builder.multipart(Self::build_form(form)?),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| HttpError::new(e.to_string()))?;

        // Extract status and headers before consuming the response
        let status = response.status().as_u16();
        let mut response_headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                response_headers.insert(name.as_str().to_lowercase(), v.to_owned());
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| HttpError::new(e.to_string()))?
            .to_vec();

        Ok(Response {
            status,
            headers: response_headers,
            body,
        })
    }
}
