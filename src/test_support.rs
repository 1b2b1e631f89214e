//! In-process stub backend for tests.
//!
//! Every request is recorded; responses are looked up by `(method, path)`
//! where `path` is relative to the `/api` prefix (e.g. `bookings/123/status`).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedCall {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

#[derive(Debug, Clone)]
struct StubResponse {
    status: u16,
    body: String,
}

#[derive(Clone, Default)]
pub struct StubBackend {
    routes: Arc<Mutex<HashMap<(String, String), StubResponse>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl StubBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, method: &str, path: &str, status: u16, body: serde_json::Value) {
        self.respond_raw(method, path, status, &body.to_string());
    }

    pub fn respond_raw(&self, method: &str, path: &str, status: u16, body: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert((method.to_owned(), path.to_owned()), StubResponse { status, body: body.to_owned() });
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Bind to an ephemeral port and return the API base URL.
    pub async fn spawn(&self) -> String {
        let app = Router::new().fallback(handle).with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/api")
    }
}

async fn handle(State(stub): State<StubBackend>, method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
    let path = uri.path().trim_start_matches("/api/").to_owned();
    let recorded_headers = headers
        .iter()
        .map(|(k, v)| (k.as_str().to_owned(), v.to_str().unwrap_or_default().to_owned()))
        .collect();
    stub.calls.lock().unwrap().push(RecordedCall {
        method: method.as_str().to_owned(),
        path: path.clone(),
        headers: recorded_headers,
        body: body.to_vec(),
    });

    let found = stub
        .routes
        .lock()
        .unwrap()
        .get(&(method.as_str().to_owned(), path))
        .cloned();
    match found {
        Some(resp) => {
            let status = StatusCode::from_u16(resp.status).unwrap();
            (status, [(header::CONTENT_TYPE, "application/json")], resp.body).into_response()
        }
        None => (StatusCode::NOT_FOUND, [(header::CONTENT_TYPE, "application/json")], r#"{"msg":"Not found"}"#)
            .into_response(),
    }
}

/// Credential source returning a fixed token.
pub struct FixedToken(pub Option<String>);

impl crate::net::client::CredentialSource for FixedToken {
    fn bearer_token(&self) -> Option<String> {
        self.0.clone()
    }
}
