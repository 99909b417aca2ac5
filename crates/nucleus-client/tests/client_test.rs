// Integration tests against a mock hub
//
// These run the real client stack (transport, cache, registry) against a
// wiremock server standing in for Brain Nucleus.

use serde_json::{json, Map, Value};
use std::time::Duration;
use wiremock::matchers::{body_json, body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nucleus_client::contracts::{CapabilityEntry, CapabilityStatus, EventOptions, Severity};
use nucleus_client::{ClientConfig, ClientError, EventClient, ServiceClient, TransportError};
use nucleus_client::{capabilities, heartbeat};

const API_KEY: &str = "brn_test_key";
const SERVICE_SECRET: &str = "brn_svc_secret";

fn config(server: &MockServer) -> ClientConfig {
    ClientConfig::new(server.uri(), API_KEY)
}

fn client(server: &MockServer) -> EventClient {
    EventClient::new(&config(server)).unwrap()
}

fn payload(value: Value) -> Map<String, Value> {
    value.as_object().unwrap().clone()
}

// =============================================================================
// Event dispatch
// =============================================================================

#[tokio::test]
async fn test_send_posts_envelope_and_returns_ack() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/events"))
        .and(header("X-Brain-Key", API_KEY))
        .and(header("Content-Type", "application/json"))
        .and(body_partial_json(json!({
            "event_type": "order.completed",
            "payload": {"order_id": "ORD-1", "amount": 99.99},
            "severity": "info"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 42,
            "status": "accepted"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ack = client(&server)
        .send(
            "order.completed",
            payload(json!({"order_id": "ORD-1", "amount": 99.99})),
            Some(EventOptions::new().severity(Severity::Info)),
        )
        .await
        .unwrap();

    assert_eq!(ack.id, 42);
    assert_eq!(ack.status, "accepted");
}

#[tokio::test]
async fn test_send_omits_absent_optional_fields() {
    let server = MockServer::start().await;
    // Exact body match: any extra or null field would fail the matcher
    Mock::given(method("POST"))
        .and(path("/api/v1/events"))
        .and(body_json(json!({
            "event_type": "user.signup",
            "payload": {"email": "user@example.com"}
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"id": 1, "status": "accepted"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .send("user.signup", payload(json!({"email": "user@example.com"})), None)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_send_surfaces_http_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/events"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "db down"})))
        .mount(&server)
        .await;

    let err = client(&server)
        .send("order.completed", payload(json!({"order_id": "ORD-1"})), None)
        .await
        .unwrap_err();

    match err {
        ClientError::Transport(TransportError::HttpStatus { status, body }) => {
            assert_eq!(status, 500);
            assert!(body.contains("db down"));
        }
        other => panic!("expected HttpStatus error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_send_rejects_empty_event_type() {
    let server = MockServer::start().await;
    let err = client(&server)
        .send("", payload(json!({"k": "v"})), None)
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::InvalidInput(_)));
    // No request must have reached the server
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_send_maps_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/events"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"id": 1, "status": "accepted"}))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let err = client(&server)
        .with_timeout(Duration::from_millis(50))
        .send("slow.event", payload(json!({"k": "v"})), None)
        .await
        .unwrap_err();

    assert!(err.is_timeout());
}

// =============================================================================
// Hub config and schema caching
// =============================================================================

#[tokio::test]
async fn test_hub_config_is_cached_within_ttl() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/client/config"))
        .and(header("X-Brain-Key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data_types": [{"name": "seo_snapshot", "endpoint": "/api/v1/data/seo"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    for _ in 0..3 {
        let hub_config = client.get_config().await.unwrap();
        assert_eq!(
            hub_config.endpoint_for("seo_snapshot"),
            Some("/api/v1/data/seo")
        );
    }
}

#[tokio::test]
async fn test_hub_config_refetches_after_ttl() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/client/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data_types": []})))
        .expect(2)
        .mount(&server)
        .await;

    let client =
        EventClient::new(&config(&server).with_cache_ttl(Duration::from_millis(80))).unwrap();
    client.get_config().await.unwrap();
    tokio::time::sleep(Duration::from_millis(120)).await;
    client.get_config().await.unwrap();
}

#[tokio::test]
async fn test_failed_config_fetch_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/client/config"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(2)
        .mount(&server)
        .await;

    let client = client(&server);
    assert!(client.get_config().await.is_err());
    assert!(client.get_config().await.is_err());
}

#[tokio::test]
async fn test_concurrent_schema_fetches_collapse_to_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/data-types/seo_snapshot/schema"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "data_type": "seo_snapshot",
                    "required_fields": ["url"]
                }))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let (a, b) = tokio::join!(
        client.get_schema("seo_snapshot"),
        client.get_schema("seo_snapshot"),
    );

    assert_eq!(a.unwrap().required_fields, vec!["url"]);
    assert_eq!(b.unwrap().required_fields, vec!["url"]);
}

// =============================================================================
// Capability registration
// =============================================================================

#[tokio::test]
async fn test_registration_invalidates_config_cache_and_updates_registry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/client/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data_types": []})))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/client/capabilities"))
        .and(body_partial_json(json!({
            "capabilities": [{"data_type": "seo_snapshot", "version": "1.0", "status": "ready"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "registered": 1,
            "results": [{"data_type": "seo_snapshot", "version": "1.0", "status": "active"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    client.get_config().await.unwrap();

    let outcome = client
        .register_capabilities(vec![CapabilityEntry::new("seo_snapshot", "1.0")])
        .await
        .unwrap();
    assert_eq!(outcome.registered, 1);

    // Registration must force the next config call to refetch
    client.get_config().await.unwrap();

    // Hub reported the capability active, so the registry now has it
    assert!(client.registry().has_capability("seo_snapshot").await);
    assert_eq!(
        client
            .registry()
            .get_capability("seo_snapshot")
            .await
            .unwrap()
            .status,
        CapabilityStatus::Active
    );
}

// =============================================================================
// Typed data submission
// =============================================================================

#[tokio::test]
async fn test_send_data_resolves_endpoint_and_posts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/client/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data_types": [{"name": "seo_snapshot", "endpoint": "/api/v1/data/seo"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/data-types/seo_snapshot/schema"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data_type": "seo_snapshot",
            "required_fields": ["url"]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/data/seo"))
        .and(body_json(json!({"url": "https://a.io"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"stored": true})))
        .expect(1)
        .mount(&server)
        .await;

    let stored = client(&server)
        .send_data("seo_snapshot", payload(json!({"url": "https://a.io"})))
        .await
        .unwrap();
    assert_eq!(stored["stored"], true);
}

#[tokio::test]
async fn test_send_data_fails_for_unknown_data_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/client/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data_types": []})))
        .mount(&server)
        .await;

    let err = client(&server)
        .send_data("unknown_type", payload(json!({"k": "v"})))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::EndpointNotFound(name) if name == "unknown_type"));
}

#[tokio::test]
async fn test_validation_failure_does_not_block_send_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/client/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data_types": [{"name": "seo_snapshot", "endpoint": "/api/v1/data/seo"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/data-types/seo_snapshot/schema"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data_type": "seo_snapshot",
            "required_fields": ["url", "score"]
        })))
        .mount(&server)
        .await;
    // The data is missing a required field, yet the POST must still happen
    Mock::given(method("POST"))
        .and(path("/api/v1/data/seo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"stored": true})))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .send_data("seo_snapshot", payload(json!({"url": "https://a.io"})))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_validate_reports_schema_unknown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/data-types/ghost/schema"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let errors = client(&server).validate("ghost", &payload(json!({"k": 1}))).await;
    assert_eq!(errors.len(), 1);
    assert!(errors.contains_key(nucleus_client::SCHEMA_UNKNOWN_KEY));
}

// =============================================================================
// Service proxy
// =============================================================================

#[tokio::test]
async fn test_proxy_get_serializes_body_as_query_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/proxy/domain-monitor/api/health"))
        .and(header("X-Brain-Service-Secret", SERVICE_SECRET))
        .and(query_param("verbose", "true"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let response = ServiceClient::with_credentials(server.uri(), SERVICE_SECRET)
        // Leading slash on the path must be stripped
        .get("domain-monitor", "/api/health", payload(json!({"verbose": true, "limit": 5})))
        .await
        .unwrap();
    assert_eq!(response["status"], "ok");
}

#[tokio::test]
async fn test_proxy_post_sends_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/proxy/webforge/api/scaffolds"))
        .and(body_json(json!({"platform": "laravel"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "s-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let response = ServiceClient::with_credentials(server.uri(), SERVICE_SECRET)
        .post("webforge", "api/scaffolds", payload(json!({"platform": "laravel"})))
        .await
        .unwrap();
    assert_eq!(response["id"], "s-1");
}

#[tokio::test]
async fn test_proxy_requires_service_secret() {
    let server = MockServer::start().await;
    let err = ServiceClient::new(&config(&server)).unwrap_err();
    assert!(matches!(err, ClientError::ConfigurationMissing(_)));
}

// =============================================================================
// Maintenance operations
// =============================================================================

#[tokio::test]
async fn test_heartbeat_sends_ping_and_syncs_events_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/events"))
        .and(body_partial_json(json!({"event_type": "health.ping"})))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"id": 7, "status": "accepted"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/client/events/register"))
        .and(body_json(json!({
            "event_type": "cart.abandoned",
            "description": "Cart left behind"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "registered"})))
        .expect(2)
        .mount(&server)
        .await;

    let config = config(&server)
        .with_site_name("Acme Store")
        .with_event("cart.abandoned", "Cart left behind");
    let client = EventClient::new(&config).unwrap();

    let first = heartbeat::run(&client, &config, false).await;
    assert!(first.heartbeat_sent);
    assert_eq!(first.events_synced, 1);
    assert!(!first.sync_skipped);

    // Same config hash: the sync is skipped
    let second = heartbeat::run(&client, &config, false).await;
    assert!(second.sync_skipped);
    assert_eq!(second.events_synced, 0);

    // Forced sync bypasses the marker
    let forced = heartbeat::run(&client, &config, true).await;
    assert!(!forced.sync_skipped);
    assert_eq!(forced.events_synced, 1);
}

#[tokio::test]
async fn test_heartbeat_survives_hub_outage() {
    let server = MockServer::start().await;
    // No mocks mounted: every request 404s

    let config = config(&server).with_event("cart.abandoned", "Cart left behind");
    let client = EventClient::new(&config).unwrap();

    let report = heartbeat::run(&client, &config, false).await;
    assert!(!report.heartbeat_sent);
    assert_eq!(report.events_total, 1);
    assert_eq!(report.events_synced, 0);
}

#[tokio::test]
async fn test_capability_check_reports_missing_and_registers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/client/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data_types": [
                {"name": "seo_snapshot", "endpoint": "/api/v1/data/seo", "required": true}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/client/capabilities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "registered": 1,
            "results": [{"data_type": "seo_snapshot", "version": "1.0", "status": "active"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config(&server).with_capability(CapabilityEntry::new("seo_snapshot", "1.0"));
    let client = EventClient::new(&config).unwrap();

    let report = capabilities::check_and_register(&client, &config).await;
    assert_eq!(report.missing_required, vec!["seo_snapshot"]);
    assert_eq!(report.registered, 1);
    assert!(client.registry().has_capability("seo_snapshot").await);
}

#[tokio::test]
async fn test_capability_check_degrades_without_hub() {
    let server = MockServer::start().await;

    let config = config(&server).with_capability(CapabilityEntry::new("seo_snapshot", "1.0"));
    let client = EventClient::new(&config).unwrap();

    let report = capabilities::check_and_register(&client, &config).await;
    assert!(report.missing_required.is_empty());
    assert_eq!(report.registered, 0);
}

// =============================================================================
// Construction paths
// =============================================================================

#[tokio::test]
async fn test_new_fails_fast_when_unconfigured() {
    let err = EventClient::new(&ClientConfig::new("", "")).unwrap_err();
    assert!(matches!(err, ClientError::ConfigurationMissing(_)));
}

#[tokio::test]
async fn test_best_effort_client_skips_operations() {
    let client = EventClient::best_effort(&ClientConfig::new("", ""));
    let err = client
        .send("user.signup", payload(json!({"k": "v"})), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::ConfigurationMissing(_)));
}

#[tokio::test]
async fn test_standalone_variant_sends_events() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/events"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"id": 3, "status": "accepted"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = EventClient::standalone(server.uri(), API_KEY).unwrap();
    let ack = client
        .send("contact.submitted", payload(json!({"email": "user@example.com"})), None)
        .await
        .unwrap();
    assert_eq!(ack.id, 3);

    assert!(EventClient::standalone(server.uri(), "").is_err());
}

#[tokio::test]
async fn test_check_version_parses_hub_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/client/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "latest_version": "2.0.0",
            "current_version": "1.2.0",
            "update_required": false
        })))
        .mount(&server)
        .await;

    let info = client(&server).check_version().await.unwrap();
    assert_eq!(info.latest_version, "2.0.0");
    assert!(!info.update_required);
}
