use actix_web::{http::StatusCode, test};
use async_trait::async_trait;
use jscloak_api::api::{create_app, AppState};
use jscloak_api::models::{ErrorResponse, ObfuscateResponse};
use jscloak_api::settings::Settings;
use jscloak_core::{ObfuscatedOutput, ObfuscationConfig, Obfuscator, ObfuscatorError};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;

/// Answers every call with a canned result.
struct StubObfuscator {
    reply: Result<String, String>,
}

#[async_trait]
impl Obfuscator for StubObfuscator {
    async fn obfuscate(
        &self,
        _source: &str,
        _config: &ObfuscationConfig,
    ) -> Result<ObfuscatedOutput, ObfuscatorError> {
        match &self.reply {
            Ok(code) => Ok(ObfuscatedOutput::new(code.clone())),
            Err(message) => Err(ObfuscatorError::Rejected(message.clone())),
        }
    }
}

fn state_with(settings: &Settings, reply: Result<&str, &str>) -> AppState {
    let stub = StubObfuscator {
        reply: reply.map(str::to_string).map_err(str::to_string),
    };
    AppState::new(settings, Arc::new(stub)).unwrap()
}

fn succeeding() -> AppState {
    state_with(&Settings::default(), Ok("OBF"))
}

#[actix_web::test]
async fn test_obfuscate_returns_code_and_request_id() {
    let app = test::init_service(create_app(succeeding())).await;

    let req = test::TestRequest::post()
        .uri("/api/obfuscate")
        .set_json(&json!({
            "code": "function hi() { return 1; }",
            "securityLevel": "advanced",
            "domainLock": ["a.com"]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let header_id = resp
        .headers()
        .get("x-request-id")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let body: ObfuscateResponse = test::read_body_json(resp).await;
    assert_eq!(body.obfuscated_code, "OBF");
    assert!(body.source_map.is_none());
    assert_eq!(body.request_id, header_id);
}

#[actix_web::test]
async fn test_client_request_id_never_becomes_request_id() {
    let app = test::init_service(create_app(succeeding())).await;

    let mut ids = Vec::new();
    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/api/obfuscate")
            .insert_header(("x-request-id", "same"))
            .set_json(&json!({"code": "x=1"}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        let header_id = resp
            .headers()
            .get("x-request-id")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        let body: ObfuscateResponse = test::read_body_json(resp).await;
        assert_ne!(body.request_id, "same");
        assert_eq!(body.request_id, header_id);
        ids.push(body.request_id);
    }

    assert_ne!(ids[0], ids[1]);
}

#[actix_web::test]
async fn test_blank_code_is_rejected_with_400() {
    let app = test::init_service(create_app(succeeding())).await;

    let req = test::TestRequest::post()
        .uri("/api/obfuscate")
        .set_json(&json!({"code": "   "}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "code required");
    assert!(body.request_id.is_some());
}

#[actix_web::test]
async fn test_missing_code_field_is_rejected_with_400() {
    let app = test::init_service(create_app(succeeding())).await;

    let req = test::TestRequest::post()
        .uri("/api/obfuscate")
        .set_json(&json!({"securityLevel": "ultra"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "code required");
}

#[actix_web::test]
async fn test_bad_domain_is_named_in_400() {
    let app = test::init_service(create_app(succeeding())).await;

    let req = test::TestRequest::post()
        .uri("/api/obfuscate")
        .set_json(&json!({"code": "x=1", "domainLock": ["not a domain"]}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "invalid domain format: not a domain");
}

#[actix_web::test]
async fn test_malformed_json_is_400_with_request_id() {
    let app = test::init_service(create_app(succeeding())).await;

    let req = test::TestRequest::post()
        .uri("/api/obfuscate")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let header_id = resp
        .headers()
        .get("x-request-id")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.request_id.as_deref(), Some(header_id.as_str()));
}

#[actix_web::test]
async fn test_oversized_body_is_rejected() {
    let mut settings = Settings::default();
    settings.server.json_limit_bytes = 64;
    let app = test::init_service(create_app(state_with(&settings, Ok("OBF")))).await;

    let req = test::TestRequest::post()
        .uri("/api/obfuscate")
        .set_json(&json!({"code": "x".repeat(500)}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_transform_failure_maps_to_500() {
    let state = state_with(&Settings::default(), Err("Line 1: Unexpected token"));
    let app = test::init_service(create_app(state)).await;

    let req = test::TestRequest::post()
        .uri("/api/obfuscate")
        .set_json(&json!({"code": "function ("}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "obfuscation failed");
    assert_eq!(body.message.as_deref(), Some("Line 1: Unexpected token"));
    assert!(body.request_id.is_some());
}

#[actix_web::test]
async fn test_rate_limit_returns_429_with_retry_after() {
    let mut settings = Settings::default();
    settings.rate_limit.max_requests = 2;
    settings.rate_limit.window_secs = 60;
    let app = test::init_service(create_app(state_with(&settings, Ok("OBF")))).await;
    let peer: SocketAddr = "192.0.2.7:50000".parse().unwrap();

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/api/obfuscate")
            .peer_addr(peer)
            .set_json(&json!({"code": "x=1"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    let req = test::TestRequest::post()
        .uri("/api/obfuscate")
        .peer_addr(peer)
        .set_json(&json!({"code": "x=1"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = resp
        .headers()
        .get("retry-after")
        .unwrap()
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(retry_after >= 1 && retry_after <= 60);
    assert!(resp.headers().get("x-request-id").is_some());
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert!(body.request_id.is_some());

    // Another client is unaffected
    let req = test::TestRequest::post()
        .uri("/api/obfuscate")
        .peer_addr("192.0.2.8:50000".parse().unwrap())
        .set_json(&json!({"code": "x=1"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_rate_limit_does_not_cover_monitoring() {
    let mut settings = Settings::default();
    settings.rate_limit.max_requests = 1;
    let app = test::init_service(create_app(state_with(&settings, Ok("OBF")))).await;

    for _ in 0..3 {
        let req = test::TestRequest::get().uri("/monitoring/live").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }
}

#[actix_web::test]
async fn test_security_headers_on_every_response() {
    let app = test::init_service(create_app(succeeding())).await;

    let req = test::TestRequest::get().uri("/monitoring/health").to_request();
    let resp = test::call_service(&app, req).await;

    let headers = resp.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert_eq!(headers.get("referrer-policy").unwrap(), "no-referrer");
    assert_eq!(headers.get("x-xss-protection").unwrap(), "0");
    assert!(headers.get("x-request-id").is_some());
}

#[actix_web::test]
async fn test_static_client_and_fallback() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<html>jscloak</html>").unwrap();
    std::fs::write(dir.path().join("app.js"), "console.log('app');").unwrap();

    let mut settings = Settings::default();
    settings.server.static_dir = dir.path().to_path_buf();
    let app = test::init_service(create_app(state_with(&settings, Ok("OBF")))).await;

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(test::read_body(resp).await, "<html>jscloak</html>");

    let req = test::TestRequest::get().uri("/app.js").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("application/javascript"));
    assert_eq!(test::read_body(resp).await, "console.log('app');");

    let req = test::TestRequest::get().uri("/some/client/route").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(test::read_body(resp).await, "<html>jscloak</html>");
}

#[actix_web::test]
async fn test_metrics_count_obfuscations() {
    let app = test::init_service(create_app(succeeding())).await;

    let req = test::TestRequest::post()
        .uri("/api/obfuscate")
        .set_json(&json!({"code": "x=1", "securityLevel": "enterprise"}))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get().uri("/monitoring/metrics").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("jscloak_obfuscations_total"));
    assert!(body.contains(r#"level="enterprise""#));
    assert!(body.contains(r#"outcome="success""#));
}

#[actix_web::test]
async fn test_rejected_requests_skip_obfuscator_duration() {
    let app = test::init_service(create_app(succeeding())).await;

    let req = test::TestRequest::post()
        .uri("/api/obfuscate")
        .set_json(&json!({"code": "  "}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );

    let req = test::TestRequest::get().uri("/monitoring/metrics").to_request();
    let body = String::from_utf8(test::call_and_read_body(&app, req).await.to_vec()).unwrap();
    assert!(body.contains(r#"outcome="rejected""#));
    assert!(body.contains("jscloak_obfuscation_duration_seconds_count 0"));
}

#[actix_web::test]
async fn test_openapi_document_is_served() {
    let app = test::init_service(create_app(succeeding())).await;

    let req = test::TestRequest::get()
        .uri("/api-docs/openapi.json")
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["paths"]["/api/obfuscate"]["post"].is_object());
}
