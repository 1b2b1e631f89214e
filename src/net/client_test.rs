use std::path::PathBuf;
use std::sync::Arc;

use reqwest::multipart::Form;
use serde_json::json;

use super::*;
use crate::net::request::ApiRequest;
use crate::test_support::{FixedToken, StubBackend};

fn client_for(base: &str) -> ApiClient {
    ApiClient::new(&ClientConfig::with_api_url(base, PathBuf::from("unused"))).unwrap()
}

fn authed(base: &str, token: &str) -> ApiClient {
    client_for(base).with_credentials(Arc::new(FixedToken(Some(token.to_owned()))))
}

fn body_json(req: &reqwest::Request) -> serde_json::Value {
    let bytes = req.body().and_then(reqwest::Body::as_bytes).unwrap();
    serde_json::from_slice(bytes).unwrap()
}

// =============================================================================
// Request construction
// =============================================================================

#[test]
fn replace_status_carries_bearer_and_json_body() {
    let client = authed("http://api.test/api", "tok123");
    let req = ApiRequest::replace("bookings/123/status")
        .json(&json!({ "status": "Approved" }))
        .unwrap();
    let built = client.build_request(req).unwrap();

    assert_eq!(built.method(), reqwest::Method::PUT);
    assert_eq!(built.url().as_str(), "http://api.test/api/bookings/123/status");
    assert_eq!(built.headers()[AUTHORIZATION], "Bearer tok123");
    assert_eq!(built.headers()[CONTENT_TYPE], "application/json");
    assert_eq!(body_json(&built), json!({ "status": "Approved" }));
}

#[test]
fn anonymous_calls_have_no_authorization() {
    let client = client_for("http://api.test/api");
    let built = client.build_request(ApiRequest::retrieve("services")).unwrap();
    assert!(built.headers().get(AUTHORIZATION).is_none());
}

#[test]
fn empty_token_is_treated_as_anonymous() {
    let client = authed("http://api.test/api", "");
    let built = client.build_request(ApiRequest::retrieve("services")).unwrap();
    assert!(built.headers().get(AUTHORIZATION).is_none());
}

#[test]
fn credential_source_without_token_sends_no_authorization() {
    let client = client_for("http://api.test/api").with_credentials(Arc::new(FixedToken(None)));
    let built = client.build_request(ApiRequest::retrieve("bookings")).unwrap();
    assert!(built.headers().get(AUTHORIZATION).is_none());
}

#[test]
fn extra_headers_cannot_override_authorization() {
    let client = authed("http://api.test/api", "tok123");
    let req = ApiRequest::retrieve("bookings")
        .header("Authorization", "Bearer forged")
        .header("X-Trace", "abc");
    let built = client.build_request(req).unwrap();
    assert_eq!(built.headers()[AUTHORIZATION], "Bearer tok123");
    assert_eq!(built.headers()["x-trace"], "abc");
}

#[test]
fn multipart_body_is_never_json() {
    let client = authed("http://api.test/api", "tok123");
    let form = Form::new().text("title", "Fence repair");
    let built = client.build_request(ApiRequest::create("blog").multipart(form)).unwrap();

    let content_type = built.headers()[CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("multipart/form-data; boundary="), "got {content_type}");
    assert_eq!(built.headers().get_all(CONTENT_TYPE).iter().count(), 1);
    assert_eq!(built.headers()[AUTHORIZATION], "Bearer tok123");
}

#[test]
fn upload_ignores_caller_content_type() {
    let client = authed("http://api.test/api", "tok123");
    let form = Form::new().text("title", "Fence repair");
    let req = ApiRequest::create("blog").multipart(form).header("Content-Type", "application/json");
    let built = client.build_request(req).unwrap();

    let values: Vec<_> = built.headers().get_all(CONTENT_TYPE).iter().collect();
    assert_eq!(values.len(), 1);
    assert!(values[0].to_str().unwrap().starts_with("multipart/form-data"));
}

#[test]
fn json_call_without_body_still_declares_json() {
    let client = client_for("http://api.test/api");
    let built = client.build_request(ApiRequest::remove("blog/9")).unwrap();
    assert_eq!(built.method(), reqwest::Method::DELETE);
    assert_eq!(built.headers()[CONTENT_TYPE], "application/json");
    assert!(built.body().is_none());
}

#[test]
fn empty_endpoint_is_rejected() {
    let client = client_for("http://api.test/api");
    let err = client.build_request(ApiRequest::retrieve("  /")).unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest(_)));
}

#[test]
fn leading_slash_is_tolerated() {
    let client = client_for("http://api.test/api/");
    assert_eq!(client.url_for("/services").unwrap(), "http://api.test/api/services");
}

#[test]
fn bad_extra_header_name_is_rejected() {
    let client = client_for("http://api.test/api");
    let err = client
        .build_request(ApiRequest::retrieve("services").header("bad header", "x"))
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest(_)));
}

// =============================================================================
// Response normalization
// =============================================================================

#[test]
fn error_message_prefers_server_msg() {
    let err = status_error(401, br#"{"msg":"Invalid credentials"}"#);
    assert_eq!(err.to_string(), "Invalid credentials");
    assert_eq!(err.status(), Some(401));
}

#[test]
fn error_message_falls_back_for_non_json_or_blank_msg() {
    assert_eq!(status_error(502, b"<html>bad gateway</html>").to_string(), "HTTP error! status: 502");
    assert_eq!(status_error(500, br#"{"msg":""}"#).to_string(), "HTTP error! status: 500");
}

#[test]
fn empty_value_fills_unit_option_and_defaulted_records() {
    #[derive(serde::Deserialize, Debug, Default, PartialEq)]
    struct Ack {
        #[serde(default)]
        success: bool,
    }
    empty_value::<()>().unwrap();
    assert_eq!(empty_value::<Option<u8>>().unwrap(), None);
    assert_eq!(empty_value::<Ack>().unwrap(), Ack::default());
}

#[test]
fn empty_value_for_required_fields_is_decode_error() {
    #[derive(serde::Deserialize, Debug)]
    #[allow(dead_code)]
    struct Needs {
        id: String,
    }
    assert!(matches!(empty_value::<Needs>(), Err(ApiError::Decode(_))));
}

#[tokio::test]
async fn request_decodes_success_body() {
    let stub = StubBackend::new();
    stub.respond("GET", "services", 200, json!([{ "_id": "s1", "name": "Fencing" }]));
    let base = stub.spawn().await;

    let list: Vec<serde_json::Value> = client_for(&base).request(ApiRequest::retrieve("services")).await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["_id"], "s1");
}

#[tokio::test]
async fn request_surfaces_status_error() {
    let stub = StubBackend::new();
    stub.respond("POST", "bookings", 400, json!({ "msg": "Phone is required" }));
    let base = stub.spawn().await;

    let err = client_for(&base)
        .request::<serde_json::Value>(ApiRequest::create("bookings").json(&json!({})).unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Phone is required");
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn request_treats_204_as_empty() {
    let stub = StubBackend::new();
    stub.respond_raw("DELETE", "services/s1", 204, "");
    let base = stub.spawn().await;

    let out: serde::de::IgnoredAny = authed(&base, "tok")
        .request(ApiRequest::remove("services/s1"))
        .await
        .unwrap();
    let _ = out;
}

#[tokio::test]
async fn request_reports_shape_mismatch_as_decode_error() {
    let stub = StubBackend::new();
    stub.respond("GET", "blog", 200, json!({ "unexpected": true }));
    let base = stub.spawn().await;

    let err = client_for(&base)
        .request::<Vec<serde_json::Value>>(ApiRequest::retrieve("blog"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn request_sends_bearer_to_server() {
    let stub = StubBackend::new();
    stub.respond("PUT", "bookings/123/status", 200, json!({ "_id": "123" }));
    let base = stub.spawn().await;

    let _: serde_json::Value = authed(&base, "tok123")
        .request(ApiRequest::replace("bookings/123/status").json(&json!({ "status": "Approved" })).unwrap())
        .await
        .unwrap();

    let calls = stub.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].header("authorization"), Some("Bearer tok123"));
    assert_eq!(calls[0].json(), json!({ "status": "Approved" }));
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client_for(&format!("http://{addr}/api"))
        .request::<serde_json::Value>(ApiRequest::retrieve("services"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
}
