#![allow(clippy::unwrap_used)]
// Integration tests for `Gateway` and `TokenManager` using wiremock.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ivtpump_api::{
    Credential, Error, Gateway, OAuthConfig, RawResponse, TokenManager, TokenSink,
    TransportConfig,
};

const DEVICE: &str = "101234567";
const TOKEN_PATH: &str = "/auth/connect/token";

// ── Helpers ─────────────────────────────────────────────────────────

#[derive(Default)]
struct RecordingSink {
    seen: Mutex<Vec<Credential>>,
    fail: bool,
}

impl TokenSink for RecordingSink {
    fn persist<'a>(&'a self, credential: &'a Credential) -> BoxFuture<'a, Result<(), Error>> {
        async move {
            if self.fail {
                return Err(Error::Persistence {
                    message: "disk full".into(),
                });
            }
            self.seen.lock().unwrap().push(credential.clone());
            Ok(())
        }
        .boxed()
    }
}

fn secret(s: &str) -> SecretString {
    SecretString::from(s.to_owned())
}

fn valid_credential() -> Credential {
    Credential::new(
        secret("tok"),
        Some(secret("refresh-1")),
        Some(Utc::now() + TimeDelta::hours(1)),
    )
}

fn build(server: &MockServer, credential: Credential, sink: Arc<RecordingSink>) -> Gateway {
    build_with(server, credential, sink, TransportConfig::default())
}

fn build_with(
    server: &MockServer,
    credential: Credential,
    sink: Arc<RecordingSink>,
    transport: TransportConfig,
) -> Gateway {
    let http = transport.build_client().unwrap();
    let token_url = Url::parse(&format!("{}{TOKEN_PATH}", server.uri())).unwrap();
    let tokens = TokenManager::new(
        http.clone(),
        OAuthConfig::with_token_url(token_url),
        credential,
        Some(sink),
    );
    let base = Url::parse(&format!("{}/gateways/", server.uri())).unwrap();
    Gateway::new(http, &base, DEVICE, Arc::new(tokens)).unwrap()
}

fn resource(suffix: &str) -> String {
    format!("/gateways/{DEVICE}/resource{suffix}")
}

// ── GET ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_scalar() {
    let server = MockServer::start().await;
    let gateway = build(&server, valid_credential(), Arc::default());

    Mock::given(method("GET"))
        .and(path(resource("/heatingCircuits/hc1/roomtemperature")))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "/heatingCircuits/hc1/roomtemperature",
            "type": "floatValue",
            "value": 21.5,
            "unitOfMeasure": "C"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = gateway
        .get("/heatingCircuits/hc1/roomtemperature")
        .await
        .unwrap();

    assert_eq!(resp.value(), Some(&json!(21.5)));
    assert_eq!(resp.unit_of_measure(), Some("C"));
}

#[tokio::test]
async fn test_get_not_found_is_absent() {
    let server = MockServer::start().await;
    let gateway = build(&server, valid_credential(), Arc::default());

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let resp = gateway.get("/heatSources/hs2/type").await.unwrap();
    assert_eq!(resp, RawResponse::Absent);
}

#[tokio::test]
async fn test_get_server_error_is_absent() {
    let server = MockServer::start().await;
    let gateway = build(&server, valid_credential(), Arc::default());

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let resp = gateway.get("/system/brand").await.unwrap();
    assert!(resp.is_absent());
}

#[tokio::test]
async fn test_get_timeout_is_absent() {
    let server = MockServer::start().await;
    let transport = TransportConfig {
        timeout: Duration::from_millis(100),
        ..TransportConfig::default()
    };
    let gateway = build_with(&server, valid_credential(), Arc::default(), transport);

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"value": 1}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let resp = gateway.get("/system/brand").await.unwrap();
    assert!(resp.is_absent());
}

#[tokio::test]
async fn test_get_many_preserves_order_and_absent_entries() {
    let server = MockServer::start().await;
    let gateway = build(&server, valid_credential(), Arc::default());

    Mock::given(method("GET"))
        .and(path(resource("/a")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": 1})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(resource("/c")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"values": [{"ch": 3}]})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let results = gateway.get_many(&["/c", "/b", "/a"]).await.unwrap();

    let keys: Vec<&str> = results.keys().map(String::as_str).collect();
    assert_eq!(keys, ["/c", "/b", "/a"]);
    assert!(results["/b"].is_absent());
    assert_eq!(results["/a"].value(), Some(&json!(1)));
    assert!(results["/c"].values().is_some());
}

#[tokio::test]
async fn test_probe() {
    let server = MockServer::start().await;
    let gateway = build(&server, valid_credential(), Arc::default());

    Mock::given(method("GET"))
        .and(path(resource("/gateway/versionFirmware")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": "04.08.02"})))
        .mount(&server)
        .await;

    assert!(gateway.probe().await.unwrap());
}

// ── PUT ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_put_success_statuses() {
    let server = MockServer::start().await;
    let gateway = build(&server, valid_credential(), Arc::default());

    Mock::given(method("PUT"))
        .and(path(resource("/heatingCircuits/hc1/temporaryRoomSetpoint")))
        .and(body_json(json!({"value": 22.0})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(resource("/dhwCircuits/dhw1/operationMode")))
        .and(body_json(json!({"value": "eco"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    assert!(
        gateway
            .put("/heatingCircuits/hc1/temporaryRoomSetpoint", &22.0)
            .await
            .unwrap()
    );
    assert!(
        gateway
            .put("/dhwCircuits/dhw1/operationMode", "eco")
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_put_server_error_is_false() {
    let server = MockServer::start().await;
    let gateway = build(&server, valid_credential(), Arc::default());

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(500).set_body_string("nope"))
        .mount(&server)
        .await;

    assert!(
        !gateway
            .put("/heatingCircuits/hc1/operationMode", "manual")
            .await
            .unwrap()
    );
}

// ── Token lifecycle ─────────────────────────────────────────────────

#[tokio::test]
async fn test_expiring_token_is_refreshed_once_before_get() {
    let server = MockServer::start().await;
    let sink = Arc::new(RecordingSink::default());
    let credential = Credential::new(
        secret("old"),
        Some(secret("refresh-1")),
        Some(Utc::now() + TimeDelta::minutes(2)),
    );
    let gateway = build(&server, credential, Arc::clone(&sink));

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "new",
            "refresh_token": "refresh-2",
            "expires_in": 1800
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(resource("/x")))
        .and(header("authorization", "Bearer new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": 5})))
        .expect(1)
        .mount(&server)
        .await;

    let before = Utc::now();
    let resp = gateway.get("/x").await.unwrap();
    let after = Utc::now();

    assert_eq!(resp.value(), Some(&json!(5)));

    let seen = sink.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let persisted = &seen[0];
    assert_eq!(persisted.access_token().expose_secret(), "new");
    assert_eq!(persisted.refresh_token().unwrap().expose_secret(), "refresh-2");
    let expires_at = persisted.expires_at().unwrap();
    assert!(expires_at >= before + TimeDelta::seconds(1800));
    assert!(expires_at <= after + TimeDelta::seconds(1800));
}

#[tokio::test]
async fn test_expired_without_refresh_token_fails_without_exchange() {
    let server = MockServer::start().await;
    let credential = Credential::new(secret("old"), None, Some(Utc::now() - TimeDelta::hours(1)));
    let gateway = build(&server, credential, Arc::default());

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": 1})))
        .expect(0)
        .mount(&server)
        .await;

    let result = gateway.get("/x").await;
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_unknown_expiry_without_refresh_token_is_used_as_is() {
    let server = MockServer::start().await;
    let credential = Credential::new(secret("forever"), None, None);
    let gateway = build(&server, credential, Arc::default());

    Mock::given(method("GET"))
        .and(header("authorization", "Bearer forever"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": 1})))
        .expect(1)
        .mount(&server)
        .await;

    assert!(!gateway.get("/x").await.unwrap().is_absent());
}

#[tokio::test]
async fn test_rejected_refresh_is_auth_error() {
    let server = MockServer::start().await;
    let credential = Credential::new(secret("old"), Some(secret("revoked")), None);
    let gateway = build(&server, credential, Arc::default());

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = gateway.put("/x", &1).await.unwrap_err();
    assert!(err.is_auth_error());
    match err {
        Error::TokenRejected { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("invalid_grant"), "body: {body}");
        }
        other => panic!("expected TokenRejected, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_refresh_keeps_refresh_token_when_not_rotated() {
    let server = MockServer::start().await;
    let credential = Credential::new(secret("old"), Some(secret("sticky")), None);
    let gateway = build(&server, credential, Arc::default());

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "new"})))
        .expect(1)
        .mount(&server)
        .await;

    let before = Utc::now();
    let token = gateway.tokens().ensure_valid().await.unwrap();
    assert_eq!(token.expose_secret(), "new");

    let cred = gateway.tokens().credential().await;
    assert_eq!(cred.refresh_token().unwrap().expose_secret(), "sticky");
    assert!(cred.expires_at().unwrap() >= before + TimeDelta::seconds(3600));
}

#[tokio::test]
async fn test_sink_failure_is_visible_to_caller() {
    let server = MockServer::start().await;
    let sink = Arc::new(RecordingSink {
        fail: true,
        ..RecordingSink::default()
    });
    let credential = Credential::new(secret("old"), Some(secret("r")), None);
    let gateway = build(&server, credential, sink);

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "new",
            "expires_in": 3600
        })))
        .mount(&server)
        .await;

    let result = gateway.get("/x").await;
    assert!(
        matches!(result, Err(Error::Persistence { .. })),
        "expected Persistence error, got: {result:?}"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_callers_share_one_refresh() {
    let server = MockServer::start().await;
    let sink = Arc::new(RecordingSink::default());
    let credential = Credential::new(
        secret("old"),
        Some(secret("r")),
        Some(Utc::now() - TimeDelta::minutes(1)),
    );
    let gateway = Arc::new(build(&server, credential, Arc::clone(&sink)));

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "shared", "expires_in": 3600}))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut handles = Vec::new();
    for _ in 0..10 {
        let gateway = Arc::clone(&gateway);
        handles.push(tokio::spawn(async move {
            gateway.tokens().ensure_valid().await
        }));
    }

    for handle in handles {
        let token = handle.await.unwrap().unwrap();
        assert_eq!(token.expose_secret(), "shared");
    }
    assert_eq!(sink.seen.lock().unwrap().len(), 1);
}

// ── Authorization code grant ────────────────────────────────────────

#[tokio::test]
async fn test_exchange_code() {
    let server = MockServer::start().await;
    let oauth =
        OAuthConfig::with_token_url(Url::parse(&format!("{}{TOKEN_PATH}", server.uri())).unwrap());

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=the-code"))
        .and(body_string_contains("code_verifier="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "first",
            "refresh_token": "first-refresh",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cred = ivtpump_api::oauth::exchange_code(&reqwest::Client::new(), &oauth, "the-code")
        .await
        .unwrap();

    assert_eq!(cred.access_token().expose_secret(), "first");
    assert_eq!(cred.refresh_token().unwrap().expose_secret(), "first-refresh");
    assert!(cred.expires_at().is_some());
}

#[tokio::test]
async fn test_exchange_code_rejected() {
    let server = MockServer::start().await;
    let oauth =
        OAuthConfig::with_token_url(Url::parse(&format!("{}{TOKEN_PATH}", server.uri())).unwrap());

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad code"))
        .mount(&server)
        .await;

    let result = ivtpump_api::oauth::exchange_code(&reqwest::Client::new(), &oauth, "x").await;
    assert!(matches!(result, Err(Error::TokenRejected { status: 401, .. })));
}
