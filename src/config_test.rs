use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_when_nothing_is_set() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(cfg.api_url, DEFAULT_API_URL);
    assert_eq!(cfg.request_timeout, None);
    assert_eq!(cfg.connect_timeout, Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS));
    assert!(cfg.state_dir.ends_with("trueline") || cfg.state_dir.ends_with(".trueline"));
}

#[test]
fn overrides_are_parsed() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[
        ("TRUELINE_API_URL", "http://127.0.0.1:5000/api/"),
        ("TRUELINE_STATE_DIR", "/tmp/trueline-test"),
        ("TRUELINE_REQUEST_TIMEOUT_SECS", "30"),
        ("TRUELINE_CONNECT_TIMEOUT_SECS", "3"),
    ]))
    .unwrap();
    assert_eq!(cfg.api_url, "http://127.0.0.1:5000/api");
    assert_eq!(cfg.state_dir, PathBuf::from("/tmp/trueline-test"));
    assert_eq!(cfg.request_timeout, Some(Duration::from_secs(30)));
    assert_eq!(cfg.connect_timeout, Duration::from_secs(3));
}

#[test]
fn blank_timeout_means_unset() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[("TRUELINE_REQUEST_TIMEOUT_SECS", "  ")])).unwrap();
    assert_eq!(cfg.request_timeout, None);
}

#[test]
fn non_numeric_timeout_errors() {
    let err = ClientConfig::from_lookup(lookup_from(&[("TRUELINE_CONNECT_TIMEOUT_SECS", "soon")])).unwrap_err();
    assert_eq!(
        err,
        ConfigError::InvalidSeconds { var: "TRUELINE_CONNECT_TIMEOUT_SECS", value: "soon".into() }
    );
}

#[test]
fn non_http_base_url_errors() {
    assert!(matches!(parse_api_url(Some("ftp://example.com")), Err(ConfigError::InvalidBaseUrl(_))));
    assert!(matches!(parse_api_url(Some("https://")), Err(ConfigError::InvalidBaseUrl(_))));
    assert!(matches!(parse_api_url(Some("http://")), Err(ConfigError::InvalidBaseUrl(_))));
    assert!(matches!(parse_api_url(Some("http:///api")), Err(ConfigError::InvalidBaseUrl(_))));
}

#[test]
fn short_http_host_is_accepted() {
    assert_eq!(parse_api_url(Some("http://a")).unwrap(), "http://a");
    assert_eq!(parse_api_url(Some("https://b/api/")).unwrap(), "https://b/api");
}

#[test]
fn with_api_url_trims_trailing_slash() {
    let cfg = ClientConfig::with_api_url("http://localhost:5000/api/", PathBuf::from("state"));
    assert_eq!(cfg.api_url, "http://localhost:5000/api");
    assert_eq!(cfg.request_timeout, None);
}
