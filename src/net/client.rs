//! Typed request client: the single choke point for outbound API calls.
//!
//! CONTRACT
//! ========
//! - A bearer `Authorization` header is attached whenever the credential
//!   source yields a non-empty token, and extra headers can never replace it.
//! - JSON calls get `Content-Type: application/json` and a serialized body.
//!   Multipart calls leave the content type to the transport so it can
//!   compute the boundary.
//! - 2xx bodies decode into `T`; 204 (or an empty 2xx body) decodes from an
//!   empty value. Non-2xx becomes `ApiError::Status` with the server's `msg`.
//!
//! The client holds no mutable state between calls, so clones can be used
//! concurrently. No timeout is applied unless the config asks for one.

use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::request::{ApiRequest, RequestBody};
use crate::config::ClientConfig;
use crate::error::ApiError;

/// Anything that can supply the current bearer credential.
pub trait CredentialSource: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Option<Arc<dyn CredentialSource>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("has_credentials", &self.credentials.is_some())
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    msg: Option<String>,
}

impl ApiClient {
    /// Build a client for `config.api_url` without a credential source.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder().connect_timeout(config.connect_timeout);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::InvalidRequest(format!("HTTP client build failed: {e}")))?;
        Ok(Self { http, base_url: config.api_url.trim_end_matches('/').to_owned(), credentials: None })
    }

    /// Return a client that reads its bearer token from `source` on every call.
    #[must_use]
    pub fn with_credentials(mut self, source: Arc<dyn CredentialSource>) -> Self {
        self.credentials = Some(source);
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a resource path relative to the base URL.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` for an empty endpoint.
    pub fn url_for(&self, endpoint: &str) -> Result<String, ApiError> {
        let endpoint = endpoint.trim().trim_start_matches('/');
        if endpoint.is_empty() {
            return Err(ApiError::InvalidRequest("endpoint must not be empty".to_owned()));
        }
        Ok(format!("{}/{endpoint}", self.base_url))
    }

    fn current_token(&self) -> Option<String> {
        self.credentials
            .as_ref()
            .and_then(|c| c.bearer_token())
            .filter(|t| !t.is_empty())
    }

    /// Turn a descriptor into a ready-to-send transport request.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` for an empty endpoint, an unusable header
    /// or credential, or a body that cannot be serialized.
    pub fn build_request(&self, req: ApiRequest) -> Result<reqwest::Request, ApiError> {
        let url = self.url_for(&req.endpoint)?;
        let multipart = req.is_multipart();

        let mut headers = HeaderMap::new();
        if let Some(token) = self.current_token() {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ApiError::InvalidRequest("credential is not a valid header value".to_owned()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        if !multipart {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        for (name, value) in &req.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ApiError::InvalidRequest(format!("bad header name `{name}`: {e}")))?;
            if name == AUTHORIZATION {
                tracing::debug!(endpoint = %req.endpoint, "ignoring caller-supplied authorization header");
                continue;
            }
            if multipart && name == CONTENT_TYPE {
                tracing::debug!(endpoint = %req.endpoint, "ignoring caller-supplied content type on upload");
                continue;
            }
            let value = HeaderValue::from_str(value)
                .map_err(|e| ApiError::InvalidRequest(format!("bad value for header `{name}`: {e}")))?;
            headers.insert(name, value);
        }

        let mut builder = self.http.request(req.method.as_http(), url).headers(headers);
        builder = match req.body {
            Some(RequestBody::Json(value)) => {
                let bytes = serde_json::to_vec(&value).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
                builder.body(bytes)
            }
            Some(RequestBody::Multipart(form)) => builder.multipart(form),
            None => builder,
        };
        builder.build().map_err(|e| ApiError::InvalidRequest(e.to_string()))
    }

    /// Issue one call and decode the result as `T`.
    ///
    /// # Errors
    ///
    /// - `Network` when no response arrives
    /// - `Status` for any non-2xx response
    /// - `Decode` when a success body does not match `T`
    /// - `InvalidRequest` when the descriptor cannot be built
    pub async fn request<T: DeserializeOwned>(&self, req: ApiRequest) -> Result<T, ApiError> {
        let method = req.method;
        let endpoint = req.endpoint.clone();
        let request = self.build_request(req)?;
        tracing::debug!(?method, %endpoint, "api request");

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !status.is_success() {
            let err = status_error(status.as_u16(), &body);
            tracing::warn!(?method, %endpoint, status = status.as_u16(), error = %err, "api request failed");
            return Err(err);
        }
        if status == StatusCode::NO_CONTENT || body.iter().all(u8::is_ascii_whitespace) {
            return empty_value();
        }
        serde_json::from_slice(&body).map_err(|e| ApiError::Decode(format!("{endpoint}: {e}")))
    }
}

pub(crate) fn status_error(status: u16, body: &[u8]) -> ApiError {
    let message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.msg)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("HTTP error! status: {status}"));
    ApiError::Status { message, status }
}

/// Decode `T` from an empty success: `null` first (unit, `Option`,
/// `IgnoredAny`), then `{}` (records whose fields all have defaults).
pub(crate) fn empty_value<T: DeserializeOwned>() -> Result<T, ApiError> {
    T::deserialize(serde_json::Value::Null)
        .or_else(|_| T::deserialize(serde_json::Value::Object(serde_json::Map::new())))
        .map_err(|e| ApiError::Decode(format!("empty response: {e}")))
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
