//! Tests for `Probe::fetch` against live local servers.
//!
//! wiremock stands in for SpaceAPI endpoints; closed ports stand in for
//! hosts that cannot be reached at all. Request counts on the mocks show how
//! many TLS attempts were made.

use std::time::Duration;

use sav_probe::{inspect, Probe, ProbeConfig, DEFAULT_ORIGIN};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SPACE: &str = r#"{"api": "0.13", "space": "my cool space"}"#;

fn probe() -> Probe {
    Probe::new(ProbeConfig::default()).unwrap()
}

fn probe_with(config: ProbeConfig) -> Probe {
    Probe::new(config).unwrap()
}

// ── Reachable endpoints ──────────────────────────────────────────────

#[tokio::test]
async fn plain_http_endpoint_is_reachable_without_valid_cert() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status.json"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(SPACE, "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let target = Probe::parse_target(&format!("{}/status.json", server.uri())).unwrap();
    let outcome = probe().fetch(&target).await.unwrap();

    assert!(outcome.reachable);
    assert!(!outcome.is_https);
    assert!(!outcome.https_forward);
    assert!(!outcome.cert_valid, "no HTTPS leg, so no certificate to vouch for");
    assert_eq!(outcome.document(), Some(SPACE.as_bytes()));

    let headers = outcome.headers.expect("headers of a reachable endpoint");
    assert!(inspect(&headers, DEFAULT_ORIGIN).content_type_ok);
}

#[tokio::test]
async fn json_content_type_with_charset_is_compliant() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(SPACE, "application/json; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let target = Probe::parse_target(&server.uri()).unwrap();
    let outcome = probe().fetch(&target).await.unwrap();

    let headers = outcome.headers.expect("headers of a reachable endpoint");
    assert_eq!(
        headers.get("content-type").unwrap(),
        "application/json; charset=utf-8"
    );
    assert!(inspect(&headers, DEFAULT_ORIGIN).content_type_ok);
}

#[tokio::test]
async fn text_plain_content_type_is_not_compliant() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SPACE))
        .mount(&server)
        .await;

    let target = Probe::parse_target(&server.uri()).unwrap();
    let outcome = probe().fetch(&target).await.unwrap();

    let headers = outcome.headers.expect("headers of a reachable endpoint");
    assert!(!inspect(&headers, DEFAULT_ORIGIN).content_type_ok);
}

#[tokio::test]
async fn request_carries_validator_origin() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("origin", DEFAULT_ORIGIN))
        .respond_with(ResponseTemplate::new(200).set_body_string(SPACE))
        .expect(1)
        .mount(&server)
        .await;

    let target = Probe::parse_target(&server.uri()).unwrap();
    let outcome = probe().fetch(&target).await.unwrap();
    assert!(outcome.reachable, "the mock only answers requests with our Origin");
}

#[tokio::test]
async fn configured_origin_is_used() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("origin", "https://validator.example.net"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SPACE))
        .mount(&server)
        .await;

    let probe = probe_with(ProbeConfig {
        origin: "https://validator.example.net".into(),
        ..ProbeConfig::default()
    });
    let target = Probe::parse_target(&server.uri()).unwrap();
    assert!(probe.fetch(&target).await.unwrap().reachable);
}

#[tokio::test]
async fn empty_body_is_reachable_without_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let target = Probe::parse_target(&server.uri()).unwrap();
    let outcome = probe().fetch(&target).await.unwrap();
    assert!(outcome.reachable);
    assert!(outcome.headers.is_some());
    assert!(outcome.document().is_none());
}

// ── Redirects ────────────────────────────────────────────────────────

#[tokio::test]
async fn relative_redirect_is_followed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/status.json"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/status.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SPACE))
        .expect(1)
        .mount(&server)
        .await;

    let target = Probe::parse_target(&format!("{}/old", server.uri())).unwrap();
    let outcome = probe().fetch(&target).await.unwrap();
    assert!(outcome.reachable);
    assert!(!outcome.https_forward);
    assert_eq!(outcome.document(), Some(SPACE.as_bytes()));
}

#[tokio::test]
async fn redirect_loop_exhausts_budget_on_both_attempts() {
    let server = MockServer::start().await;
    // 1 initial request + 3 followed redirects, for each of the two attempts.
    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/loop"))
        .expect(8)
        .mount(&server)
        .await;

    let probe = probe_with(ProbeConfig {
        max_redirects: 3,
        ..ProbeConfig::default()
    });
    let target = Probe::parse_target(&format!("{}/loop", server.uri())).unwrap();
    let outcome = probe.fetch(&target).await.unwrap();
    assert!(!outcome.reachable);
    assert!(outcome.headers.is_none());
}

#[tokio::test]
async fn failed_redirect_to_https_triggers_single_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/go"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", "https://127.0.0.1:1/status.json"),
        )
        .expect(2)
        .mount(&server)
        .await;

    let target = Probe::parse_target(&format!("{}/go", server.uri())).unwrap();
    let outcome = probe().fetch(&target).await.unwrap();
    assert!(!outcome.reachable);
    assert!(!outcome.https_forward, "unreachable outcomes carry no network flags");
    assert!(!outcome.cert_valid);
}

// ── Unreachable endpoints ────────────────────────────────────────────

#[tokio::test]
async fn http_error_status_is_unreachable_without_fallback() {
    for status in [404u16, 500] {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status).set_body_string(SPACE))
            .expect(1)
            .mount(&server)
            .await;

        let target = Probe::parse_target(&server.uri()).unwrap();
        let outcome = probe().fetch(&target).await.unwrap();
        assert!(!outcome.reachable, "status {status}");
        assert!(outcome.headers.is_none());
        assert!(outcome.body.is_none());
    }
}

#[tokio::test]
async fn closed_port_is_unreachable() {
    let target = Probe::parse_target("http://127.0.0.1:1/status.json").unwrap();
    let outcome = probe().fetch(&target).await.unwrap();
    assert!(!outcome.reachable);
    assert!(!outcome.is_https);
}

#[tokio::test]
async fn closed_https_port_keeps_declared_scheme() {
    let target = Probe::parse_target("https://127.0.0.1:1/status.json").unwrap();
    let outcome = probe().fetch(&target).await.unwrap();
    assert!(!outcome.reachable);
    assert!(outcome.is_https);
    assert!(!outcome.cert_valid);
}

#[tokio::test]
async fn slow_endpoint_times_out_on_both_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(SPACE)
                .set_delay(Duration::from_millis(500)),
        )
        .expect(2)
        .mount(&server)
        .await;

    let probe = probe_with(ProbeConfig {
        attempt_timeout: Duration::from_millis(100),
        ..ProbeConfig::default()
    });
    let target = Probe::parse_target(&server.uri()).unwrap();
    let outcome = probe.fetch(&target).await.unwrap();
    assert!(!outcome.reachable);
}
