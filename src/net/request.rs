//! Request descriptors consumed by the typed request client.
//!
//! A descriptor is built per call by a feature function in [`super::api`],
//! handed to [`super::client::ApiClient::request`] and dropped once the call
//! resolves. The body is a single enum so a call can never carry both a
//! JSON and a multipart payload.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use serde::Serialize;

use crate::error::ApiError;

/// The fixed verb set understood by the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Retrieve,
    Create,
    Replace,
    Remove,
}

impl Method {
    #[must_use]
    pub fn as_http(self) -> reqwest::Method {
        match self {
            Self::Retrieve => reqwest::Method::GET,
            Self::Create => reqwest::Method::POST,
            Self::Replace => reqwest::Method::PUT,
            Self::Remove => reqwest::Method::DELETE,
        }
    }
}

/// Outbound body: structured JSON or an opaque multipart upload.
#[derive(Debug)]
pub enum RequestBody {
    Json(serde_json::Value),
    Multipart(Form),
}

/// A file attached to a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    /// Wrap in-memory bytes, guessing the MIME type from the file name.
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime = mime_guess::from_path(&file_name).first_or_octet_stream().to_string();
        Self { file_name, mime, bytes }
    }

    /// Read a file from disk.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be read.
    pub async fn read(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_owned(), |n| n.to_string_lossy().into_owned());
        Ok(Self::new(file_name, bytes))
    }

    pub(crate) fn into_part(self) -> Result<Part, ApiError> {
        Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.mime)
            .map_err(|e| ApiError::InvalidRequest(format!("bad upload MIME type: {e}")))
    }
}

/// One outbound API call.
#[derive(Debug)]
pub struct ApiRequest {
    pub(crate) endpoint: String,
    pub(crate) method: Method,
    pub(crate) body: Option<RequestBody>,
    pub(crate) headers: Vec<(String, String)>,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self { endpoint: endpoint.into(), method, body: None, headers: Vec::new() }
    }

    #[must_use]
    pub fn retrieve(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Retrieve, endpoint)
    }

    #[must_use]
    pub fn create(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Create, endpoint)
    }

    #[must_use]
    pub fn replace(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Replace, endpoint)
    }

    #[must_use]
    pub fn remove(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Remove, endpoint)
    }

    /// Attach a structured body, serialized as JSON when sent.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if `body` cannot be represented as JSON.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        self.body = Some(RequestBody::Json(value));
        Ok(self)
    }

    /// Attach a multipart payload, passed through to the transport unmodified.
    #[must_use]
    pub fn multipart(mut self, form: Form) -> Self {
        self.body = Some(RequestBody::Multipart(form));
        self
    }

    /// Extra header merged into the call. `Authorization` is never overridden.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    #[must_use]
    pub fn is_multipart(&self) -> bool {
        matches!(self.body, Some(RequestBody::Multipart(_)))
    }
}
